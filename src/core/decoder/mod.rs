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

//! VR4300 (MIPS III) instruction decoder
//!
//! Converts raw big-endian instruction words into structured [`Insn`]s with
//! mnemonic text, canonical operand lists, and branch/jump classification.
//! The disassembly pipeline consumes this module only through the small
//! capability surface here ([`Decoder::decode`], [`Decoder::disassemble`],
//! [`Reg::name`], [`Insn::is_in_group`]), so a richer decoder can replace it
//! without touching the analysis passes.
//!
//! ## Coverage
//!
//! The full VR4300 base ISA: loads/stores including doubleword and
//! coprocessor variants, 32/64-bit ALU forms, branches including
//! branch-likely, REGIMM traps and branches, COP0 moves/TLB ops/`eret`,
//! COP1 transfers, branches, and arithmetic in all four formats, and COP2
//! transfers. Reserved encodings fail with [`DecodeError`]; the caller
//! decides how to represent the gap.
//!
//! ## Conventions
//!
//! Branch and jump operands carry absolute target addresses computed from
//! the instruction's virtual address. Print aliases (`nop`, `move`, `b`,
//! `beqz`, `bnez`, single-operand `jalr`) match common MIPS disassembler
//! output while ids stay canonical.

mod decode;
mod insn;
mod registers;

pub use insn::{Insn, InsnGroups, InsnId, Operand};
pub use registers::Reg;

pub(crate) use insn::render_operands;

use thiserror::Error;

use decode::{
    branch_target, decode_cop1_type, decode_i_type, decode_j_type, decode_r_type, jump_target,
    sign_extend16,
};

/// Failure signal for a single instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognized instruction word 0x{word:08X} at 0x{vaddr:08X}")]
pub struct DecodeError {
    /// The word that failed to decode
    pub word: u32,
    /// Virtual address of the word
    pub vaddr: u32,
}

/// Stateless VR4300 decoder
///
/// # Example
///
/// ```
/// use n64rx::core::decoder::Decoder;
///
/// let decoder = Decoder::new();
/// let insn = decoder.decode([0x27, 0xBD, 0xFF, 0xE8], 0x80000000).unwrap();
/// assert_eq!(insn.mnemonic, "addiu");
/// assert_eq!(insn.op_str, "$sp, $sp, -0x18");
/// ```
pub struct Decoder;

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Decoder
    }

    /// Decode one big-endian instruction word at `vaddr`
    pub fn decode(&self, bytes: [u8; 4], vaddr: u32) -> Result<Insn, DecodeError> {
        let word = u32::from_be_bytes(bytes);
        decode_word(word, bytes, vaddr).ok_or(DecodeError { word, vaddr })
    }

    /// Decode consecutive words from `data`, stopping at the first
    /// unrecognized encoding
    ///
    /// Returns the instructions decoded before the stop. A trailing partial
    /// word is ignored. An empty result means the first word already failed
    /// (or `data` holds fewer than 4 bytes).
    pub fn disassemble(&self, data: &[u8], vaddr: u32) -> Vec<Insn> {
        let mut decoded = Vec::with_capacity(data.len() / 4);
        for (i, chunk) in data.chunks_exact(4).enumerate() {
            let bytes = [chunk[0], chunk[1], chunk[2], chunk[3]];
            match self.decode(bytes, vaddr.wrapping_add(i as u32 * 4)) {
                Ok(insn) => decoded.push(insn),
                Err(_) => break,
            }
        }
        decoded
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn make(
    bytes: [u8; 4],
    id: InsnId,
    mnemonic: impl Into<String>,
    operands: Vec<Operand>,
    groups: InsnGroups,
) -> Insn {
    let op_str = render_operands(&operands);
    Insn {
        id,
        bytes,
        mnemonic: mnemonic.into(),
        op_str,
        operands,
        groups,
    }
}

fn gpr(n: u8) -> Operand {
    Operand::Reg(Reg::Gpr(n))
}

fn fpr(n: u8) -> Operand {
    Operand::Reg(Reg::Fpr(n))
}

fn mem(base: u8, imm: u16) -> Operand {
    Operand::Mem {
        base: Reg::Gpr(base),
        disp: sign_extend16(imm),
    }
}

fn decode_word(word: u32, bytes: [u8; 4], vaddr: u32) -> Option<Insn> {
    let op = (word >> 26) as u8;
    match op {
        0x00 => decode_special(word, bytes),
        0x01 => decode_regimm(word, bytes, vaddr),
        0x02 => {
            let target = jump_target(vaddr, decode_j_type(word));
            Some(make(
                bytes,
                InsnId::J,
                "j",
                vec![Operand::Imm(target as i64)],
                InsnGroups::JUMP,
            ))
        }
        0x03 => {
            let target = jump_target(vaddr, decode_j_type(word));
            Some(make(
                bytes,
                InsnId::Jal,
                "jal",
                vec![Operand::Imm(target as i64)],
                InsnGroups::CALL,
            ))
        }
        0x04 | 0x05 | 0x14 | 0x15 => decode_branch_eq(op, word, bytes, vaddr),
        0x06 | 0x07 | 0x16 | 0x17 => decode_branch_z(op, word, bytes, vaddr),
        0x08..=0x0B | 0x18 | 0x19 => {
            let (rs, rt, imm) = decode_i_type(word);
            let (id, mnemonic) = match op {
                0x08 => (InsnId::Addi, "addi"),
                0x09 => (InsnId::Addiu, "addiu"),
                0x0A => (InsnId::Slti, "slti"),
                0x0B => (InsnId::Sltiu, "sltiu"),
                0x18 => (InsnId::Daddi, "daddi"),
                _ => (InsnId::Daddiu, "daddiu"),
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rt), gpr(rs), Operand::Imm(sign_extend16(imm))],
                InsnGroups::empty(),
            ))
        }
        0x0C..=0x0E => {
            let (rs, rt, imm) = decode_i_type(word);
            let (id, mnemonic) = match op {
                0x0C => (InsnId::Andi, "andi"),
                0x0D => (InsnId::Ori, "ori"),
                _ => (InsnId::Xori, "xori"),
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rt), gpr(rs), Operand::Imm(imm as i64)],
                InsnGroups::empty(),
            ))
        }
        0x0F => {
            let (_, rt, imm) = decode_i_type(word);
            Some(make(
                bytes,
                InsnId::Lui,
                "lui",
                vec![gpr(rt), Operand::Imm(imm as i64)],
                InsnGroups::empty(),
            ))
        }
        0x10 => decode_cop0(word, bytes, vaddr),
        0x11 => decode_cop1(word, bytes, vaddr),
        0x12 => decode_cop2(word, bytes),
        0x1A | 0x1B => {
            let (rs, rt, imm) = decode_i_type(word);
            let (id, mnemonic) = if op == 0x1A {
                (InsnId::Ldl, "ldl")
            } else {
                (InsnId::Ldr, "ldr")
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rt), mem(rs, imm)],
                InsnGroups::empty(),
            ))
        }
        0x20..=0x2E => decode_load_store(op, word, bytes),
        0x2F => {
            let (rs, rt, imm) = decode_i_type(word);
            Some(make(
                bytes,
                InsnId::Cache,
                "cache",
                vec![Operand::Imm(rt as i64), mem(rs, imm)],
                InsnGroups::empty(),
            ))
        }
        0x30..=0x32 | 0x34..=0x3A | 0x3C..=0x3F => decode_load_store(op, word, bytes),
        _ => None,
    }
}

fn decode_special(word: u32, bytes: [u8; 4]) -> Option<Insn> {
    let (rs, rt, rd, shamt, funct) = decode_r_type(word);
    let none = InsnGroups::empty();
    match funct {
        0x00 => {
            if word == 0 {
                Some(make(bytes, InsnId::Nop, "nop", vec![], none))
            } else {
                Some(make(
                    bytes,
                    InsnId::Sll,
                    "sll",
                    vec![gpr(rd), gpr(rt), Operand::Imm(shamt as i64)],
                    none,
                ))
            }
        }
        0x02 | 0x03 | 0x38 | 0x3A | 0x3B | 0x3C | 0x3E | 0x3F => {
            let (id, mnemonic) = match funct {
                0x02 => (InsnId::Srl, "srl"),
                0x03 => (InsnId::Sra, "sra"),
                0x38 => (InsnId::Dsll, "dsll"),
                0x3A => (InsnId::Dsrl, "dsrl"),
                0x3B => (InsnId::Dsra, "dsra"),
                0x3C => (InsnId::Dsll32, "dsll32"),
                0x3E => (InsnId::Dsrl32, "dsrl32"),
                _ => (InsnId::Dsra32, "dsra32"),
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rd), gpr(rt), Operand::Imm(shamt as i64)],
                none,
            ))
        }
        0x04 | 0x06 | 0x07 | 0x14 | 0x16 | 0x17 => {
            let (id, mnemonic) = match funct {
                0x04 => (InsnId::Sllv, "sllv"),
                0x06 => (InsnId::Srlv, "srlv"),
                0x07 => (InsnId::Srav, "srav"),
                0x14 => (InsnId::Dsllv, "dsllv"),
                0x16 => (InsnId::Dsrlv, "dsrlv"),
                _ => (InsnId::Dsrav, "dsrav"),
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rd), gpr(rt), gpr(rs)],
                none,
            ))
        }
        0x08 => Some(make(
            bytes,
            InsnId::Jr,
            "jr",
            vec![gpr(rs)],
            InsnGroups::JUMP,
        )),
        0x09 => {
            let operands = if rd == 31 {
                vec![gpr(rs)]
            } else {
                vec![gpr(rd), gpr(rs)]
            };
            Some(make(
                bytes,
                InsnId::Jalr,
                "jalr",
                operands,
                InsnGroups::JUMP | InsnGroups::CALL,
            ))
        }
        0x0C => Some(make(bytes, InsnId::Syscall, "syscall", vec![], none)),
        0x0D => Some(make(bytes, InsnId::Break, "break", vec![], none)),
        0x0F => Some(make(bytes, InsnId::Sync, "sync", vec![], none)),
        0x10 => Some(make(bytes, InsnId::Mfhi, "mfhi", vec![gpr(rd)], none)),
        0x11 => Some(make(bytes, InsnId::Mthi, "mthi", vec![gpr(rs)], none)),
        0x12 => Some(make(bytes, InsnId::Mflo, "mflo", vec![gpr(rd)], none)),
        0x13 => Some(make(bytes, InsnId::Mtlo, "mtlo", vec![gpr(rs)], none)),
        0x18..=0x1F => {
            let (id, mnemonic) = match funct {
                0x18 => (InsnId::Mult, "mult"),
                0x19 => (InsnId::Multu, "multu"),
                0x1A => (InsnId::Div, "div"),
                0x1B => (InsnId::Divu, "divu"),
                0x1C => (InsnId::Dmult, "dmult"),
                0x1D => (InsnId::Dmultu, "dmultu"),
                0x1E => (InsnId::Ddiv, "ddiv"),
                _ => (InsnId::Ddivu, "ddivu"),
            };
            Some(make(bytes, id, mnemonic, vec![gpr(rs), gpr(rt)], none))
        }
        0x20..=0x27 | 0x2A..=0x2F => {
            let (id, mnemonic) = match funct {
                0x20 => (InsnId::Add, "add"),
                0x21 => (InsnId::Addu, "addu"),
                0x22 => (InsnId::Sub, "sub"),
                0x23 => (InsnId::Subu, "subu"),
                0x24 => (InsnId::And, "and"),
                0x25 => (InsnId::Or, "or"),
                0x26 => (InsnId::Xor, "xor"),
                0x27 => (InsnId::Nor, "nor"),
                0x2A => (InsnId::Slt, "slt"),
                0x2B => (InsnId::Sltu, "sltu"),
                0x2C => (InsnId::Dadd, "dadd"),
                0x2D => (InsnId::Daddu, "daddu"),
                0x2E => (InsnId::Dsub, "dsub"),
                _ => (InsnId::Dsubu, "dsubu"),
            };
            // `addu`/`or` with a zero third register is the canonical move
            if rt == 0 && matches!(id, InsnId::Addu | InsnId::Or | InsnId::Daddu) {
                return Some(make(bytes, id, "move", vec![gpr(rd), gpr(rs)], none));
            }
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rd), gpr(rs), gpr(rt)],
                none,
            ))
        }
        0x30..=0x34 | 0x36 => {
            let (id, mnemonic) = match funct {
                0x30 => (InsnId::Tge, "tge"),
                0x31 => (InsnId::Tgeu, "tgeu"),
                0x32 => (InsnId::Tlt, "tlt"),
                0x33 => (InsnId::Tltu, "tltu"),
                0x34 => (InsnId::Teq, "teq"),
                _ => (InsnId::Tne, "tne"),
            };
            Some(make(bytes, id, mnemonic, vec![gpr(rs), gpr(rt)], none))
        }
        _ => None,
    }
}

fn decode_regimm(word: u32, bytes: [u8; 4], vaddr: u32) -> Option<Insn> {
    let (rs, rt, imm) = decode_i_type(word);
    let target = Operand::Imm(branch_target(vaddr, imm) as i64);
    let branch = InsnGroups::BRANCH_RELATIVE;
    match rt {
        0x00 => Some(make(bytes, InsnId::Bltz, "bltz", vec![gpr(rs), target], branch)),
        0x01 => Some(make(bytes, InsnId::Bgez, "bgez", vec![gpr(rs), target], branch)),
        0x02 => Some(make(bytes, InsnId::Bltzl, "bltzl", vec![gpr(rs), target], branch)),
        0x03 => Some(make(bytes, InsnId::Bgezl, "bgezl", vec![gpr(rs), target], branch)),
        0x08..=0x0C | 0x0E => {
            let (id, mnemonic) = match rt {
                0x08 => (InsnId::Tgei, "tgei"),
                0x09 => (InsnId::Tgeiu, "tgeiu"),
                0x0A => (InsnId::Tlti, "tlti"),
                0x0B => (InsnId::Tltiu, "tltiu"),
                0x0C => (InsnId::Teqi, "teqi"),
                _ => (InsnId::Tnei, "tnei"),
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rs), Operand::Imm(sign_extend16(imm))],
                InsnGroups::empty(),
            ))
        }
        0x10 => Some(make(
            bytes,
            InsnId::Bltzal,
            "bltzal",
            vec![gpr(rs), target],
            branch | InsnGroups::CALL,
        )),
        0x11 => {
            // `bgezal $zero` always links: the canonical `bal`
            if rs == 0 {
                Some(make(
                    bytes,
                    InsnId::Bal,
                    "bal",
                    vec![target],
                    branch | InsnGroups::CALL,
                ))
            } else {
                Some(make(
                    bytes,
                    InsnId::Bgezal,
                    "bgezal",
                    vec![gpr(rs), target],
                    branch | InsnGroups::CALL,
                ))
            }
        }
        0x12 => Some(make(
            bytes,
            InsnId::Bltzall,
            "bltzall",
            vec![gpr(rs), target],
            branch | InsnGroups::CALL,
        )),
        0x13 => Some(make(
            bytes,
            InsnId::Bgezall,
            "bgezall",
            vec![gpr(rs), target],
            branch | InsnGroups::CALL,
        )),
        _ => None,
    }
}

fn decode_branch_eq(op: u8, word: u32, bytes: [u8; 4], vaddr: u32) -> Option<Insn> {
    let (rs, rt, imm) = decode_i_type(word);
    let target = Operand::Imm(branch_target(vaddr, imm) as i64);
    let branch = InsnGroups::BRANCH_RELATIVE;
    match op {
        0x04 => {
            if rs == 0 && rt == 0 {
                Some(make(bytes, InsnId::Beq, "b", vec![target], branch))
            } else if rt == 0 {
                Some(make(bytes, InsnId::Beq, "beqz", vec![gpr(rs), target], branch))
            } else {
                Some(make(
                    bytes,
                    InsnId::Beq,
                    "beq",
                    vec![gpr(rs), gpr(rt), target],
                    branch,
                ))
            }
        }
        0x05 => {
            if rt == 0 {
                Some(make(bytes, InsnId::Bne, "bnez", vec![gpr(rs), target], branch))
            } else {
                Some(make(
                    bytes,
                    InsnId::Bne,
                    "bne",
                    vec![gpr(rs), gpr(rt), target],
                    branch,
                ))
            }
        }
        0x14 => Some(make(
            bytes,
            InsnId::Beql,
            "beql",
            vec![gpr(rs), gpr(rt), target],
            branch,
        )),
        _ => Some(make(
            bytes,
            InsnId::Bnel,
            "bnel",
            vec![gpr(rs), gpr(rt), target],
            branch,
        )),
    }
}

fn decode_branch_z(op: u8, word: u32, bytes: [u8; 4], vaddr: u32) -> Option<Insn> {
    let (rs, rt, imm) = decode_i_type(word);
    // rt is hardwired zero in these encodings
    if rt != 0 {
        return None;
    }
    let target = Operand::Imm(branch_target(vaddr, imm) as i64);
    let branch = InsnGroups::BRANCH_RELATIVE;
    let (id, mnemonic) = match op {
        0x06 => (InsnId::Blez, "blez"),
        0x07 => (InsnId::Bgtz, "bgtz"),
        0x16 => (InsnId::Blezl, "blezl"),
        _ => (InsnId::Bgtzl, "bgtzl"),
    };
    Some(make(bytes, id, mnemonic, vec![gpr(rs), target], branch))
}

fn decode_cop0(word: u32, bytes: [u8; 4], vaddr: u32) -> Option<Insn> {
    let (rs, rt, rd, _, funct) = decode_r_type(word);
    let none = InsnGroups::empty();
    match rs {
        0x00 | 0x01 | 0x04 | 0x05 => {
            let (id, mnemonic) = match rs {
                0x00 => (InsnId::Mfc0, "mfc0"),
                0x01 => (InsnId::Dmfc0, "dmfc0"),
                0x04 => (InsnId::Mtc0, "mtc0"),
                _ => (InsnId::Dmtc0, "dmtc0"),
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rt), Operand::Reg(Reg::Cop0(rd))],
                none,
            ))
        }
        0x08 => {
            let imm = (word & 0xFFFF) as u16;
            let target = Operand::Imm(branch_target(vaddr, imm) as i64);
            let (id, mnemonic) = match rt {
                0x00 => (InsnId::Bc0f, "bc0f"),
                0x01 => (InsnId::Bc0t, "bc0t"),
                0x02 => (InsnId::Bc0fl, "bc0fl"),
                0x03 => (InsnId::Bc0tl, "bc0tl"),
                _ => return None,
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![target],
                InsnGroups::BRANCH_RELATIVE,
            ))
        }
        0x10..=0x1F => {
            let (id, mnemonic) = match funct {
                0x01 => (InsnId::Tlbr, "tlbr"),
                0x02 => (InsnId::Tlbwi, "tlbwi"),
                0x06 => (InsnId::Tlbwr, "tlbwr"),
                0x08 => (InsnId::Tlbp, "tlbp"),
                0x18 => (InsnId::Eret, "eret"),
                _ => return None,
            };
            Some(make(bytes, id, mnemonic, vec![], none))
        }
        _ => None,
    }
}

fn decode_cop1(word: u32, bytes: [u8; 4], vaddr: u32) -> Option<Insn> {
    let (fmt, ft, fs, fd, funct) = decode_cop1_type(word);
    let rt = ft;
    let none = InsnGroups::empty();
    match fmt {
        0x00 | 0x01 | 0x04 | 0x05 => {
            let (id, mnemonic) = match fmt {
                0x00 => (InsnId::Mfc1, "mfc1"),
                0x01 => (InsnId::Dmfc1, "dmfc1"),
                0x04 => (InsnId::Mtc1, "mtc1"),
                _ => (InsnId::Dmtc1, "dmtc1"),
            };
            Some(make(bytes, id, mnemonic, vec![gpr(rt), fpr(fs)], none))
        }
        0x02 | 0x06 => {
            let (id, mnemonic) = if fmt == 0x02 {
                (InsnId::Cfc1, "cfc1")
            } else {
                (InsnId::Ctc1, "ctc1")
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![gpr(rt), Operand::Reg(Reg::Fcr(fs))],
                none,
            ))
        }
        0x08 => {
            let imm = (word & 0xFFFF) as u16;
            let target = Operand::Imm(branch_target(vaddr, imm) as i64);
            let (id, mnemonic) = match rt {
                0x00 => (InsnId::Bc1f, "bc1f"),
                0x01 => (InsnId::Bc1t, "bc1t"),
                0x02 => (InsnId::Bc1fl, "bc1fl"),
                0x03 => (InsnId::Bc1tl, "bc1tl"),
                _ => return None,
            };
            Some(make(
                bytes,
                id,
                mnemonic,
                vec![target],
                InsnGroups::BRANCH_RELATIVE,
            ))
        }
        0x10 | 0x11 | 0x14 | 0x15 => decode_cop1_arith(fmt, ft, fs, fd, funct, bytes),
        _ => None,
    }
}

fn decode_cop1_arith(fmt: u8, ft: u8, fs: u8, fd: u8, funct: u8, bytes: [u8; 4]) -> Option<Insn> {
    let suffix = match fmt {
        0x10 => "s",
        0x11 => "d",
        0x14 => "w",
        _ => "l",
    };
    let none = InsnGroups::empty();
    match funct {
        0x00..=0x03 => {
            let (id, name) = match funct {
                0x00 => (InsnId::FAdd, "add"),
                0x01 => (InsnId::FSub, "sub"),
                0x02 => (InsnId::FMul, "mul"),
                _ => (InsnId::FDiv, "div"),
            };
            Some(make(
                bytes,
                id,
                format!("{}.{}", name, suffix),
                vec![fpr(fd), fpr(fs), fpr(ft)],
                none,
            ))
        }
        0x04..=0x0F => {
            let (id, name) = match funct {
                0x04 => (InsnId::FSqrt, "sqrt"),
                0x05 => (InsnId::FAbs, "abs"),
                0x06 => (InsnId::FMov, "mov"),
                0x07 => (InsnId::FNeg, "neg"),
                0x08 => (InsnId::FRoundL, "round.l"),
                0x09 => (InsnId::FTruncL, "trunc.l"),
                0x0A => (InsnId::FCeilL, "ceil.l"),
                0x0B => (InsnId::FFloorL, "floor.l"),
                0x0C => (InsnId::FRoundW, "round.w"),
                0x0D => (InsnId::FTruncW, "trunc.w"),
                0x0E => (InsnId::FCeilW, "ceil.w"),
                _ => (InsnId::FFloorW, "floor.w"),
            };
            Some(make(
                bytes,
                id,
                format!("{}.{}", name, suffix),
                vec![fpr(fd), fpr(fs)],
                none,
            ))
        }
        0x20 | 0x21 | 0x24 | 0x25 => {
            let (id, name) = match funct {
                0x20 => (InsnId::FCvtS, "cvt.s"),
                0x21 => (InsnId::FCvtD, "cvt.d"),
                0x24 => (InsnId::FCvtW, "cvt.w"),
                _ => (InsnId::FCvtL, "cvt.l"),
            };
            Some(make(
                bytes,
                id,
                format!("{}.{}", name, suffix),
                vec![fpr(fd), fpr(fs)],
                none,
            ))
        }
        0x30..=0x3F => {
            const CONDS: [&str; 16] = [
                "f", "un", "eq", "ueq", "olt", "ult", "ole", "ule", // 0x30-0x37
                "sf", "ngle", "seq", "ngl", "lt", "nge", "le", "ngt", // 0x38-0x3F
            ];
            let cond = CONDS[(funct & 0x0F) as usize];
            Some(make(
                bytes,
                InsnId::FCmp,
                format!("c.{}.{}", cond, suffix),
                vec![fpr(fs), fpr(ft)],
                none,
            ))
        }
        _ => None,
    }
}

fn decode_cop2(word: u32, bytes: [u8; 4]) -> Option<Insn> {
    let (rs, rt, rd, _, _) = decode_r_type(word);
    let (id, mnemonic) = match rs {
        0x00 => (InsnId::Mfc2, "mfc2"),
        0x01 => (InsnId::Dmfc2, "dmfc2"),
        0x02 => (InsnId::Cfc2, "cfc2"),
        0x04 => (InsnId::Mtc2, "mtc2"),
        0x05 => (InsnId::Dmtc2, "dmtc2"),
        0x06 => (InsnId::Ctc2, "ctc2"),
        _ => return None,
    };
    Some(make(
        bytes,
        id,
        mnemonic,
        vec![gpr(rt), Operand::Reg(Reg::Cop2(rd))],
        InsnGroups::empty(),
    ))
}

fn decode_load_store(op: u8, word: u32, bytes: [u8; 4]) -> Option<Insn> {
    let (rs, rt, imm) = decode_i_type(word);
    let none = InsnGroups::empty();
    let (id, mnemonic) = match op {
        0x20 => (InsnId::Lb, "lb"),
        0x21 => (InsnId::Lh, "lh"),
        0x22 => (InsnId::Lwl, "lwl"),
        0x23 => (InsnId::Lw, "lw"),
        0x24 => (InsnId::Lbu, "lbu"),
        0x25 => (InsnId::Lhu, "lhu"),
        0x26 => (InsnId::Lwr, "lwr"),
        0x27 => (InsnId::Lwu, "lwu"),
        0x28 => (InsnId::Sb, "sb"),
        0x29 => (InsnId::Sh, "sh"),
        0x2A => (InsnId::Swl, "swl"),
        0x2B => (InsnId::Sw, "sw"),
        0x2C => (InsnId::Sdl, "sdl"),
        0x2D => (InsnId::Sdr, "sdr"),
        0x2E => (InsnId::Swr, "swr"),
        0x30 => (InsnId::Ll, "ll"),
        0x34 => (InsnId::Lld, "lld"),
        0x37 => (InsnId::Ld, "ld"),
        0x38 => (InsnId::Sc, "sc"),
        0x3C => (InsnId::Scd, "scd"),
        0x3F => (InsnId::Sd, "sd"),
        // FPU and COP2 transfers take their register from the coprocessor file
        0x31 => {
            return Some(make(
                bytes,
                InsnId::Lwc1,
                "lwc1",
                vec![fpr(rt), mem(rs, imm)],
                none,
            ))
        }
        0x35 => {
            return Some(make(
                bytes,
                InsnId::Ldc1,
                "ldc1",
                vec![fpr(rt), mem(rs, imm)],
                none,
            ))
        }
        0x39 => {
            return Some(make(
                bytes,
                InsnId::Swc1,
                "swc1",
                vec![fpr(rt), mem(rs, imm)],
                none,
            ))
        }
        0x3D => {
            return Some(make(
                bytes,
                InsnId::Sdc1,
                "sdc1",
                vec![fpr(rt), mem(rs, imm)],
                none,
            ))
        }
        0x32 => {
            return Some(make(
                bytes,
                InsnId::Lwc2,
                "lwc2",
                vec![Operand::Reg(Reg::Cop2(rt)), mem(rs, imm)],
                none,
            ))
        }
        0x36 => {
            return Some(make(
                bytes,
                InsnId::Ldc2,
                "ldc2",
                vec![Operand::Reg(Reg::Cop2(rt)), mem(rs, imm)],
                none,
            ))
        }
        0x3A => {
            return Some(make(
                bytes,
                InsnId::Swc2,
                "swc2",
                vec![Operand::Reg(Reg::Cop2(rt)), mem(rs, imm)],
                none,
            ))
        }
        0x3E => {
            return Some(make(
                bytes,
                InsnId::Sdc2,
                "sdc2",
                vec![Operand::Reg(Reg::Cop2(rt)), mem(rs, imm)],
                none,
            ))
        }
        _ => return None,
    };
    Some(make(bytes, id, mnemonic, vec![gpr(rt), mem(rs, imm)], none))
}
