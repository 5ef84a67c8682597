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

/// Decode R-type instruction
///
/// R-type instructions are used for register-to-register operations.
///
/// Format: | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
///
/// # Arguments
///
/// * `instr` - The 32-bit instruction
///
/// # Returns
///
/// Tuple of (rs, rt, rd, shamt, funct)
#[inline(always)]
pub(super) fn decode_r_type(instr: u32) -> (u8, u8, u8, u8, u8) {
    let rs = ((instr >> 21) & 0x1F) as u8;
    let rt = ((instr >> 16) & 0x1F) as u8;
    let rd = ((instr >> 11) & 0x1F) as u8;
    let shamt = ((instr >> 6) & 0x1F) as u8;
    let funct = (instr & 0x3F) as u8;
    (rs, rt, rd, shamt, funct)
}

/// Decode I-type instruction
///
/// I-type instructions are used for immediate operations, loads, stores, and branches.
///
/// Format: | op (6) | rs (5) | rt (5) | immediate (16) |
///
/// # Arguments
///
/// * `instr` - The 32-bit instruction
///
/// # Returns
///
/// Tuple of (rs, rt, imm)
#[inline(always)]
pub(super) fn decode_i_type(instr: u32) -> (u8, u8, u16) {
    let rs = ((instr >> 21) & 0x1F) as u8;
    let rt = ((instr >> 16) & 0x1F) as u8;
    let imm = (instr & 0xFFFF) as u16;
    (rs, rt, imm)
}

/// Decode J-type instruction
///
/// J-type instructions are used for absolute jump operations.
///
/// Format: | op (6) | target (26) |
///
/// # Arguments
///
/// * `instr` - The 32-bit instruction
///
/// # Returns
///
/// The 26-bit word-address target
#[inline(always)]
pub(super) fn decode_j_type(instr: u32) -> u32 {
    instr & 0x03FF_FFFF
}

/// Decode FPU arithmetic fields
///
/// Format: | COP1 (6) | fmt (5) | ft (5) | fs (5) | fd (5) | funct (6) |
///
/// # Arguments
///
/// * `instr` - The 32-bit instruction
///
/// # Returns
///
/// Tuple of (fmt, ft, fs, fd, funct)
#[inline(always)]
pub(super) fn decode_cop1_type(instr: u32) -> (u8, u8, u8, u8, u8) {
    let fmt = ((instr >> 21) & 0x1F) as u8;
    let ft = ((instr >> 16) & 0x1F) as u8;
    let fs = ((instr >> 11) & 0x1F) as u8;
    let fd = ((instr >> 6) & 0x1F) as u8;
    let funct = (instr & 0x3F) as u8;
    (fmt, ft, fs, fd, funct)
}

/// Sign-extend a 16-bit immediate to i64
#[inline(always)]
pub(super) fn sign_extend16(imm: u16) -> i64 {
    imm as i16 as i64
}

/// Absolute target of a PC-relative branch
///
/// The offset is in words, relative to the delay slot (`vaddr + 4`).
#[inline(always)]
pub(super) fn branch_target(vaddr: u32, imm: u16) -> u32 {
    vaddr
        .wrapping_add(4)
        .wrapping_add(((imm as i16 as i32) << 2) as u32)
}

/// Absolute target of a J-type jump
///
/// The 26-bit word target replaces the low 28 bits of the delay slot's
/// address region.
#[inline(always)]
pub(super) fn jump_target(vaddr: u32, target: u32) -> u32 {
    (vaddr.wrapping_add(4) & 0xF000_0000) | (target << 2)
}
