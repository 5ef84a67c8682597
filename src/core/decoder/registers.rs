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

//! Register identifiers and name tables
//!
//! Names follow the o32 calling convention (`zero`, `at`, `v0`..`v1`,
//! `a0`..`a3`, `t0`..`t9`, `s0`..`s7`, `k0`..`k1`, `gp`, `sp`, `fp`, `ra`).
//! Coprocessor registers other than the FPU data registers are named by
//! number, matching common disassembler output (`$12` etc.).

/// General purpose register names indexed by register number
const GPR_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", // 0-7
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", // 8-15
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", // 16-23
    "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra", // 24-31
];

/// FPU data register names indexed by register number
const FPR_NAMES: [&str; 32] = [
    "f0", "f1", "f2", "f3", "f4", "f5", "f6", "f7", // 0-7
    "f8", "f9", "f10", "f11", "f12", "f13", "f14", "f15", // 8-15
    "f16", "f17", "f18", "f19", "f20", "f21", "f22", "f23", // 16-23
    "f24", "f25", "f26", "f27", "f28", "f29", "f30", "f31", // 24-31
];

/// Numeric names for coprocessor system/control registers
const NUM_NAMES: [&str; 32] = [
    "0", "1", "2", "3", "4", "5", "6", "7", // 0-7
    "8", "9", "10", "11", "12", "13", "14", "15", // 8-15
    "16", "17", "18", "19", "20", "21", "22", "23", // 16-23
    "24", "25", "26", "27", "28", "29", "30", "31", // 24-31
];

/// A register operand, tagged by register file
///
/// Equality is register-file aware: `Gpr(8)` never equals `Fpr(8)`, which is
/// what the backward register-tracking scans rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    /// General purpose register (`$zero`..`$ra`)
    Gpr(u8),
    /// FPU data register (`$f0`..`$f31`)
    Fpr(u8),
    /// System control coprocessor (COP0) register
    Cop0(u8),
    /// Coprocessor 2 data register
    Cop2(u8),
    /// FPU control register (`$0`/`$31`)
    Fcr(u8),
}

impl Reg {
    /// The hardwired zero register
    pub const ZERO: Reg = Reg::Gpr(0);
    /// The return address register
    pub const RA: Reg = Reg::Gpr(31);

    /// Register name without the `$` sigil
    pub fn name(self) -> &'static str {
        match self {
            Reg::Gpr(n) => GPR_NAMES[(n & 0x1F) as usize],
            Reg::Fpr(n) => FPR_NAMES[(n & 0x1F) as usize],
            Reg::Cop0(n) | Reg::Cop2(n) | Reg::Fcr(n) => NUM_NAMES[(n & 0x1F) as usize],
        }
    }

    /// Register number within its file
    pub fn number(self) -> u8 {
        match self {
            Reg::Gpr(n) | Reg::Fpr(n) | Reg::Cop0(n) | Reg::Cop2(n) | Reg::Fcr(n) => n & 0x1F,
        }
    }
}
