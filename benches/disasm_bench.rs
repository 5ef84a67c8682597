// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Disassembly throughput benchmarks

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use n64rx::core::disasm::{DisasmSession, Syntax};

/// Repeated leaf function with stack traffic and an address pair
const TEMPLATE: [u32; 8] = [
    0x27BDFFE8, // addiu $sp, $sp, -0x18
    0xAFBF0014, // sw    $ra, 0x14($sp)
    0x3C088040, // lui   $t0, 0x8040
    0x25085678, // addiu $t0, $t0, 0x5678
    0x8D090000, // lw    $t1, 0($t0)
    0x8FBF0014, // lw    $ra, 0x14($sp)
    0x03E00008, // jr    $ra
    0x27BD0018, // addiu $sp, $sp, 0x18
];

fn sample_code(len_bytes: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len_bytes + TEMPLATE.len() * 4);
    while data.len() < len_bytes {
        for word in TEMPLATE {
            data.extend_from_slice(&word.to_be_bytes());
        }
    }
    data.truncate(len_bytes);
    data
}

fn bench_first_pass(c: &mut Criterion) {
    let data = sample_code(0x8000);
    let mut group = c.benchmark_group("first_pass");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("plain", |b| {
        b.iter(|| {
            let mut session = DisasmSession::new(Syntax::Gas, false);
            session
                .first_pass(black_box(&data), 0, data.len(), 0x80000000)
                .unwrap();
            session
        })
    });

    group.bench_function("merge_pseudo", |b| {
        b.iter(|| {
            let mut session = DisasmSession::new(Syntax::Gas, true);
            session
                .first_pass(black_box(&data), 0, data.len(), 0x80000000)
                .unwrap();
            session
        })
    });

    group.finish();
}

fn bench_full_listing(c: &mut Criterion) {
    let data = sample_code(0x8000);
    let mut group = c.benchmark_group("full_listing");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("gas", |b| {
        b.iter(|| {
            let mut session = DisasmSession::new(Syntax::Gas, true);
            session
                .first_pass(black_box(&data), 0, data.len(), 0x80000000)
                .unwrap();
            let mut out = Vec::with_capacity(data.len() * 16);
            session.second_pass(&mut out, 0).unwrap();
            out
        })
    });

    group.finish();
}

criterion_group!(benches, bench_first_pass, bench_full_listing);
criterion_main!(benches);
