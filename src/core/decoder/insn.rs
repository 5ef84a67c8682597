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

//! Decoded instruction representation
//!
//! [`Insn`] is the unit the disassembler pipeline consumes: a stable
//! instruction id for dispatch, the raw big-endian bytes, pre-rendered
//! mnemonic/operand text, the structured operand list, and classification
//! flags. Print aliases (`nop`, `move`, `b`, `beqz`, `bnez`) only affect the
//! rendered text; `id` always names the underlying encoding so register
//! tracking stays exact.

use bitflags::bitflags;

use super::registers::Reg;

bitflags! {
    /// Instruction classification flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InsnGroups: u8 {
        /// PC-relative branch (conditional, likely, or coprocessor)
        const BRANCH_RELATIVE = 1 << 0;
        /// Absolute or register-indirect jump
        const JUMP = 1 << 1;
        /// Writes a return address (calls)
        const CALL = 1 << 2;
    }
}

/// One operand of a decoded instruction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// A register operand
    Reg(Reg),
    /// An immediate; branch and jump targets are stored as absolute addresses
    Imm(i64),
    /// A base-plus-displacement memory reference
    Mem {
        /// Base register
        base: Reg,
        /// Sign-extended 16-bit displacement
        disp: i64,
    },
}

impl Operand {
    /// The operand's register, if it is a plain register operand
    pub fn reg(&self) -> Option<Reg> {
        match self {
            Operand::Reg(r) => Some(*r),
            _ => None,
        }
    }

    /// The operand's immediate value, if it is an immediate
    pub fn imm(&self) -> Option<i64> {
        match self {
            Operand::Imm(v) => Some(*v),
            _ => None,
        }
    }
}

/// Instruction identifiers for the VR4300 (MIPS III) subset
///
/// One variant per distinct encoding the decoder produces, plus the
/// synthetic ids the pipeline introduces (`Li` for rewritten
/// load-immediates, `Byte` for raw data words).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsnId {
    // ---- SPECIAL (opcode 0x00) ----
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Jr,
    Jalr,
    Syscall,
    Break,
    Sync,
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Dsllv,
    Dsrlv,
    Dsrav,
    Mult,
    Multu,
    Div,
    Divu,
    Dmult,
    Dmultu,
    Ddiv,
    Ddivu,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Dadd,
    Daddu,
    Dsub,
    Dsubu,
    Tge,
    Tgeu,
    Tlt,
    Tltu,
    Teq,
    Tne,
    Dsll,
    Dsrl,
    Dsra,
    Dsll32,
    Dsrl32,
    Dsra32,
    // ---- REGIMM (opcode 0x01) ----
    Bltz,
    Bgez,
    Bltzl,
    Bgezl,
    Tgei,
    Tgeiu,
    Tlti,
    Tltiu,
    Teqi,
    Tnei,
    Bltzal,
    Bgezal,
    Bltzall,
    Bgezall,
    Bal,
    // ---- main opcode map ----
    J,
    Jal,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    Beql,
    Bnel,
    Blezl,
    Bgtzl,
    Daddi,
    Daddiu,
    Ldl,
    Ldr,
    Lb,
    Lh,
    Lwl,
    Lw,
    Lbu,
    Lhu,
    Lwr,
    Lwu,
    Sb,
    Sh,
    Swl,
    Sw,
    Sdl,
    Sdr,
    Swr,
    Cache,
    Ll,
    Lwc1,
    Lwc2,
    Lld,
    Ldc1,
    Ldc2,
    Ld,
    Sc,
    Swc1,
    Swc2,
    Scd,
    Sdc1,
    Sdc2,
    Sd,
    // ---- COP0 ----
    Mfc0,
    Dmfc0,
    Mtc0,
    Dmtc0,
    Bc0f,
    Bc0t,
    Bc0fl,
    Bc0tl,
    Tlbr,
    Tlbwi,
    Tlbwr,
    Tlbp,
    Eret,
    // ---- COP1 transfers and branches ----
    Mfc1,
    Dmfc1,
    Cfc1,
    Mtc1,
    Dmtc1,
    Ctc1,
    Bc1f,
    Bc1t,
    Bc1fl,
    Bc1tl,
    // ---- COP2 transfers ----
    Mfc2,
    Dmfc2,
    Cfc2,
    Mtc2,
    Dmtc2,
    Ctc2,
    // ---- FPU arithmetic (format carried in the mnemonic suffix) ----
    FAdd,
    FSub,
    FMul,
    FDiv,
    FSqrt,
    FAbs,
    FMov,
    FNeg,
    FRoundL,
    FTruncL,
    FCeilL,
    FFloorL,
    FRoundW,
    FTruncW,
    FCeilW,
    FFloorW,
    FCvtS,
    FCvtD,
    FCvtW,
    FCvtL,
    FCmp,
    // ---- synthetic ----
    /// `sll $zero, $zero, 0` rendered as `nop`
    Nop,
    /// Load-immediate pseudo-op introduced by the resolver
    Li,
    /// Raw data word standing in for an undecodable encoding
    Byte,
}

/// One decoded MIPS instruction
#[derive(Debug, Clone)]
pub struct Insn {
    /// Stable identifier for dispatch
    pub id: InsnId,
    /// Raw big-endian instruction bytes
    pub bytes: [u8; 4],
    /// Mnemonic text (may be a print alias of `id`)
    pub mnemonic: String,
    /// Rendered operand text
    pub op_str: String,
    /// Structured operands in display order
    pub operands: Vec<Operand>,
    /// Classification flags
    pub groups: InsnGroups,
}

impl Insn {
    /// Group membership test, mirroring the decoder capability contract
    pub fn is_in_group(&self, group: InsnGroups) -> bool {
        self.groups.intersects(group)
    }

    /// The instruction word in host order
    pub fn word(&self) -> u32 {
        u32::from_be_bytes(self.bytes)
    }
}

/// Render an immediate the way the operand text does: decimal for small
/// magnitudes, hex beyond that.
pub(super) fn imm_text(value: i64) -> String {
    if value > 9 {
        format!("0x{:x}", value)
    } else if value >= -9 {
        value.to_string()
    } else {
        format!("-0x{:x}", -value)
    }
}

/// Join operands into canonical display text
pub(crate) fn render_operands(operands: &[Operand]) -> String {
    let mut text = String::new();
    for (i, op) in operands.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        match op {
            Operand::Reg(r) => {
                text.push('$');
                text.push_str(r.name());
            }
            Operand::Imm(v) => text.push_str(&imm_text(*v)),
            Operand::Mem { base, disp } => {
                text.push_str(&imm_text(*disp));
                text.push_str("($");
                text.push_str(base.name());
                text.push(')');
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Immediate Rendering Tests ==========

    #[test]
    fn test_imm_text_small_values_decimal() {
        assert_eq!(imm_text(0), "0");
        assert_eq!(imm_text(4), "4");
        assert_eq!(imm_text(9), "9");
        assert_eq!(imm_text(-1), "-1");
        assert_eq!(imm_text(-9), "-9");
    }

    #[test]
    fn test_imm_text_large_values_hex() {
        assert_eq!(imm_text(10), "0xa");
        assert_eq!(imm_text(0x14), "0x14");
        assert_eq!(imm_text(0x8000_1234), "0x80001234");
        assert_eq!(imm_text(-0x18), "-0x18");
    }

    // ========== Operand Rendering Tests ==========

    #[test]
    fn test_render_register_operands() {
        let ops = [
            Operand::Reg(Reg::Gpr(4)),
            Operand::Reg(Reg::Gpr(5)),
            Operand::Imm(0x10),
        ];
        assert_eq!(render_operands(&ops), "$a0, $a1, 0x10");
    }

    #[test]
    fn test_render_memory_operand() {
        let ops = [
            Operand::Reg(Reg::Gpr(31)),
            Operand::Mem {
                base: Reg::Gpr(29),
                disp: 0x14,
            },
        ];
        assert_eq!(render_operands(&ops), "$ra, 0x14($sp)");
    }

    #[test]
    fn test_render_negative_displacement() {
        let ops = [
            Operand::Reg(Reg::Gpr(2)),
            Operand::Mem {
                base: Reg::Gpr(29),
                disp: -0x20,
            },
        ];
        assert_eq!(render_operands(&ops), "$v0, -0x20($sp)");
    }

    #[test]
    fn test_render_zero_displacement() {
        let ops = [
            Operand::Reg(Reg::Gpr(2)),
            Operand::Mem {
                base: Reg::Gpr(16),
                disp: 0,
            },
        ];
        assert_eq!(render_operands(&ops), "$v0, 0($s0)");
    }

    #[test]
    fn test_render_empty_operands() {
        assert_eq!(render_operands(&[]), "");
    }

    // ========== Group Tests ==========

    #[test]
    fn test_group_membership() {
        let insn = Insn {
            id: InsnId::Beq,
            bytes: [0x10, 0x00, 0x00, 0x01],
            mnemonic: "beq".to_string(),
            op_str: String::new(),
            operands: Vec::new(),
            groups: InsnGroups::BRANCH_RELATIVE,
        };
        assert!(insn.is_in_group(InsnGroups::BRANCH_RELATIVE));
        assert!(!insn.is_in_group(InsnGroups::JUMP));
        assert!(insn.is_in_group(InsnGroups::BRANCH_RELATIVE | InsnGroups::JUMP));
    }

    #[test]
    fn test_word_round_trip() {
        let insn = Insn {
            id: InsnId::Jr,
            bytes: [0x03, 0xE0, 0x00, 0x08],
            mnemonic: "jr".to_string(),
            op_str: "$ra".to_string(),
            operands: vec![Operand::Reg(Reg::RA)],
            groups: InsnGroups::JUMP,
        };
        assert_eq!(insn.word(), 0x03E00008);
    }

    #[test]
    fn test_operand_accessors() {
        let reg = Operand::Reg(Reg::Gpr(8));
        let imm = Operand::Imm(0x1234);
        assert_eq!(reg.reg(), Some(Reg::Gpr(8)));
        assert_eq!(reg.imm(), None);
        assert_eq!(imm.imm(), Some(0x1234));
        assert_eq!(imm.reg(), None);
    }
}
