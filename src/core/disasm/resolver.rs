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

//! Label discovery and pseudoinstruction merging
//!
//! One forward sweep per block. Call targets (`jal`, `bal`, `j`) become
//! session-global `func_*` labels so calls resolve across ranges; every
//! other branch target becomes a label local to the block, already carrying
//! the dialect prefix the emitter will print.
//!
//! With pseudoinstruction merging enabled the sweep also pairs `lui` with
//! the instruction consuming its upper half:
//!
//! - `lui` + typed load/store or `addiu`/`ori` building an address yields a
//!   `D_*` data label (except through `ori`, which marks a raw constant)
//! - `lui` feeding `mtc1` is a single-precision constant load and is
//!   rewritten to `li`
//! - `addiu`/`ori` from `$zero` is rewritten to `li` on the spot
//!
//! Backward scans stop when the tracked register is redefined or at a
//! `jr $ra` function boundary, and address pairs only look back a bounded
//! window.

use crate::core::decoder::{InsnId, Operand, Reg};

use super::labels::LabelTable;
use super::{Block, Link, LinkedValue, Syntax};

/// How far an address pair may look back for its `lui`, in instructions
const MAX_LOOKBACK: usize = 128;

/// Loads and stores whose displacement can be the low half of an address
const MEM_TRIGGERS: [InsnId; 23] = [
    InsnId::Sd,
    InsnId::Sw,
    InsnId::Sh,
    InsnId::Sb,
    InsnId::Sdl,
    InsnId::Sdr,
    InsnId::Swc1,
    InsnId::Swc2,
    InsnId::Sdc1,
    InsnId::Sdc2,
    InsnId::Lb,
    InsnId::Lbu,
    InsnId::Ld,
    InsnId::Ldl,
    InsnId::Ldr,
    InsnId::Lh,
    InsnId::Lhu,
    InsnId::Lw,
    InsnId::Lwu,
    InsnId::Lwc1,
    InsnId::Lwc2,
    InsnId::Ldc1,
    InsnId::Ldc2,
];

/// Writers that end an address-pair scan when they touch the tracked register
const HILO_REDEFINES: [InsnId; 7] = [
    InsnId::Lw,
    InsnId::Ld,
    InsnId::Addiu,
    InsnId::Addu,
    InsnId::Add,
    InsnId::Sub,
    InsnId::Subu,
];

/// Writers that end a float-constant scan when they touch the tracked register
const FLOAT_REDEFINES: [InsnId; 10] = [
    InsnId::Lw,
    InsnId::Ld,
    InsnId::Lh,
    InsnId::Lhu,
    InsnId::Lb,
    InsnId::Lbu,
    InsnId::Addiu,
    InsnId::Add,
    InsnId::Sub,
    InsnId::Subu,
];

/// Analyze a freshly decoded block
///
/// Populates `block.locals` and the session `globals`, sets delay-slot
/// spacing flags, and (optionally) merges pseudoinstruction pairs in place.
pub(super) fn resolve(
    block: &mut Block,
    globals: &mut LabelTable,
    syntax: Syntax,
    merge_pseudo: bool,
) {
    for i in 0..block.instructions.len() {
        if block.instructions[i].is_jump {
            mark_gap_after_return(block, i);
            collect_targets(block, globals, syntax, i);
        }
        if merge_pseudo {
            merge_at(block, globals, i);
        }
    }
}

/// Request a blank line two slots after a return or unconditional jump
///
/// The slot after the transfer is its delay slot; the one after that starts
/// a new piece of straight-line code.
fn mark_gap_after_return(block: &mut Block, i: usize) {
    let insn = &block.instructions[i].insn;
    let ends_flow = match insn.id {
        InsnId::Jr | InsnId::Jalr => insn.operands.first().and_then(|o| o.reg()) == Some(Reg::RA),
        InsnId::J => true,
        _ => false,
    };
    if ends_flow && i + 2 < block.instructions.len() {
        block.instructions[i + 2].newline = true;
    }
}

/// Turn the targets of instruction `i` into labels
fn collect_targets(block: &mut Block, globals: &mut LabelTable, syntax: Syntax, i: usize) {
    let insn = &block.instructions[i].insn;
    if matches!(insn.id, InsnId::Jal | InsnId::Bal | InsnId::J) {
        if let Some(target) = insn.operands.first().and_then(|o| o.imm()) {
            let target = target as u32;
            if globals.find(target).is_none() {
                globals.add(Some(&format!("func_{:08X}", target)), target);
            }
        }
    } else {
        let targets: Vec<u32> = insn
            .operands
            .iter()
            .filter_map(|o| o.imm())
            .map(|v| v as u32)
            .collect();
        for target in targets {
            if block.locals.find(target).is_none() {
                block.locals.add(Some(&syntax.local_label(target)), target);
            }
        }
    }
}

/// Apply pseudoinstruction merging for instruction `i`
fn merge_at(block: &mut Block, globals: &mut LabelTable, i: usize) {
    let id = block.instructions[i].insn.id;
    match id {
        InsnId::Mtc1 => {
            let rt = block.instructions[i].insn.operands.first().and_then(|o| o.reg());
            if let Some(rt) = rt {
                link_float_load(block, i, rt);
            }
        }
        _ if MEM_TRIGGERS.contains(&id) => {
            let mem = match block.instructions[i].insn.operands.get(1) {
                Some(Operand::Mem { base, disp }) => Some((*base, *disp as u32)),
                _ => None,
            };
            if let Some((base, disp)) = mem {
                link_with_lui(block, globals, i, base, disp);
            }
        }
        InsnId::Addiu | InsnId::Ori => {
            let rd = block.instructions[i].insn.operands.first().and_then(|o| o.reg());
            let rs = block.instructions[i].insn.operands.get(1).and_then(|o| o.reg());
            let imm = block.instructions[i].insn.operands.get(2).and_then(|o| o.imm());
            if let (Some(rd), Some(rs), Some(imm)) = (rd, rs, imm) {
                if rs == Reg::ZERO {
                    let insn = &mut block.instructions[i].insn;
                    insn.id = InsnId::Li;
                    insn.mnemonic = "li".to_string();
                    insn.op_str = format!("${}, {}", rd.name(), imm);
                } else if rd == rs {
                    link_with_lui(block, globals, i, rd, imm as u32);
                }
            }
        }
        _ => {}
    }
}

/// Pair instruction `offset` with the `lui` that built the upper address half
///
/// Both halves get linked to the shared full address. Address material
/// reached through anything but `ori` earns a `D_*` data label; `ori` pairs
/// are plain 32-bit constants. A zero low half is left alone since plain
/// dereferences of a register are not address arithmetic.
fn link_with_lui(block: &mut Block, globals: &mut LabelTable, offset: usize, reg: Reg, mem_imm: u32) {
    if mem_imm == 0 {
        return;
    }
    let floor = offset.saturating_sub(MAX_LOOKBACK);
    for search in (floor..offset).rev() {
        let id = block.instructions[search].insn.id;
        let op0 = block.instructions[search]
            .insn
            .operands
            .first()
            .and_then(|o| o.reg());

        if id == InsnId::Lui && op0 == Some(reg) {
            let lui_imm = block.instructions[search]
                .insn
                .operands
                .get(1)
                .and_then(|o| o.imm())
                .unwrap_or(0) as u32;
            let addr = (lui_imm << 16).wrapping_add(mem_imm);
            block.instructions[search].linked = Some(Link {
                partner: offset,
                value: LinkedValue::Address(addr),
            });
            block.instructions[offset].linked = Some(Link {
                partner: search,
                value: LinkedValue::Address(addr),
            });
            if block.instructions[offset].insn.id != InsnId::Ori && globals.find(addr).is_none() {
                globals.add(Some(&format!("D_{:08X}", addr)), addr);
            }
            return;
        }
        if HILO_REDEFINES.contains(&id) && op0 == Some(reg) {
            return;
        }
        if id == InsnId::Jr && op0 == Some(Reg::RA) {
            return;
        }
    }
}

/// Pair a `mtc1` with the `lui` staging a single-precision constant
///
/// Only the `lui` side is rewritten and linked; the `mtc1` itself still
/// reads naturally. The constant is the upper half shifted into place,
/// which is how compilers materialize float literals whose mantissa fits
/// sixteen bits.
fn link_float_load(block: &mut Block, offset: usize, reg: Reg) {
    for search in (0..offset).rev() {
        let id = block.instructions[search].insn.id;
        let op0 = block.instructions[search]
            .insn
            .operands
            .first()
            .and_then(|o| o.reg());

        if id == InsnId::Lui && op0 == Some(reg) {
            let lui_imm = block.instructions[search]
                .insn
                .operands
                .get(1)
                .and_then(|o| o.imm())
                .unwrap_or(0) as u32;
            let target = &mut block.instructions[search];
            target.linked = Some(Link {
                partner: offset,
                value: LinkedValue::Float(f32::from_bits(lui_imm << 16)),
            });
            target.insn.id = InsnId::Li;
            target.insn.mnemonic = "li".to_string();
            return;
        }
        if FLOAT_REDEFINES.contains(&id) && op0 == Some(reg) {
            return;
        }
        if id == InsnId::Jr && op0 == Some(Reg::RA) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::block;
    use super::super::labels::Label;
    use super::*;
    use crate::core::decoder::Decoder;
    use proptest::prelude::*;

    /// Helper to decode and resolve a word list as one block
    fn analyzed(ws: &[u32], syntax: Syntax, merge: bool) -> (Block, LabelTable) {
        let decoder = Decoder::new();
        let data: Vec<u8> = ws.iter().flat_map(|w| w.to_be_bytes()).collect();
        let instructions = block::decode_range(&decoder, &data, 0x80000000);
        let mut blk = Block {
            offset: 0,
            length: data.len(),
            vaddr: 0x80000000,
            instructions,
            locals: LabelTable::new(),
        };
        let mut globals = LabelTable::new();
        resolve(&mut blk, &mut globals, syntax, merge);
        (blk, globals)
    }

    // ========== Label Discovery Tests ==========

    #[test]
    fn test_resolve_creates_function_labels() {
        let (blk, globals) = analyzed(
            &[0x0C000007, 0x00000000, 0x0C000007, 0x00000000],
            Syntax::Gas,
            false,
        );
        // one label for two calls to the same target
        assert_eq!(globals.len(), 1);
        let label = globals.find(0x8000001C).unwrap();
        assert_eq!(label.name, "func_8000001C");
        assert!(blk.locals.is_empty());
    }

    #[test]
    fn test_resolve_keeps_existing_global_name() {
        let decoder = Decoder::new();
        let data: Vec<u8> = [0x0C000007u32, 0x00000000]
            .iter()
            .flat_map(|w| w.to_be_bytes())
            .collect();
        let instructions = block::decode_range(&decoder, &data, 0x80000000);
        let mut blk = Block {
            offset: 0,
            length: data.len(),
            vaddr: 0x80000000,
            instructions,
            locals: LabelTable::new(),
        };
        let mut globals = LabelTable::new();
        globals.add(Some("guMtxIdent"), 0x8000001C);
        resolve(&mut blk, &mut globals, Syntax::Gas, false);

        assert_eq!(globals.len(), 1);
        assert_eq!(globals.find(0x8000001C).unwrap().name, "guMtxIdent");
    }

    #[test]
    fn test_resolve_creates_local_branch_labels() {
        let program = [0x2442FFFF, 0x1440FFFE, 0x00000000]; // addiu / bnez back / nop
        let (blk, globals) = analyzed(&program, Syntax::Gas, false);
        assert!(globals.is_empty());
        assert_eq!(blk.locals.find(0x80000000).unwrap().name, ".L80000000");

        let (blk, _) = analyzed(&program, Syntax::Armips, false);
        assert_eq!(blk.locals.find(0x80000000).unwrap().name, "@L80000000");
    }

    #[test]
    fn test_resolve_marks_gap_after_return() {
        let (blk, _) = analyzed(
            &[0x03E00008, 0x00000000, 0x00000000, 0x00000000],
            Syntax::Gas,
            false,
        );
        let newlines: Vec<bool> = blk.instructions.iter().map(|i| i.newline).collect();
        assert_eq!(newlines, vec![false, false, true, false]);
    }

    #[test]
    fn test_resolve_gap_flag_needs_following_code() {
        // return in the last slot pair has nothing to separate
        let (blk, _) = analyzed(&[0x03E00008, 0x00000000], Syntax::Gas, false);
        assert!(blk.instructions.iter().all(|i| !i.newline));
    }

    // ========== Idempotence Tests ==========

    #[test]
    fn test_resolve_twice_adds_no_duplicate_labels() {
        let decoder = Decoder::new();
        let program = [
            0x0C000007u32, // jal
            0x00000000,
            0x1440FFFE, // bnez backward
            0x00000000,
            0x3C088040, // lui $t0
            0x25085678, // addiu $t0, $t0
        ];
        let data: Vec<u8> = program.iter().flat_map(|w| w.to_be_bytes()).collect();
        let instructions = block::decode_range(&decoder, &data, 0x80000000);
        let mut blk = Block {
            offset: 0,
            length: data.len(),
            vaddr: 0x80000000,
            instructions,
            locals: LabelTable::new(),
        };
        let mut globals = LabelTable::new();

        resolve(&mut blk, &mut globals, Syntax::Gas, true);
        let globals_once: Vec<Label> = globals.iter().cloned().collect();
        let locals_once: Vec<Label> = blk.locals.iter().cloned().collect();
        assert_eq!(globals_once.len(), 2); // func_8000001C and D_80405678
        assert_eq!(locals_once.len(), 1);

        resolve(&mut blk, &mut globals, Syntax::Gas, true);
        assert_eq!(globals.iter().cloned().collect::<Vec<Label>>(), globals_once);
        assert_eq!(blk.locals.iter().cloned().collect::<Vec<Label>>(), locals_once);
    }

    // ========== Address Pair Tests ==========

    #[test]
    fn test_resolve_links_hi_lo_address_pair() {
        let (blk, globals) = analyzed(&[0x3C088040, 0x25085678], Syntax::Gas, true);

        let hi = blk.instructions[0].linked.unwrap();
        let lo = blk.instructions[1].linked.unwrap();
        assert_eq!(hi.partner, 1);
        assert_eq!(lo.partner, 0);
        assert_eq!(hi.value, LinkedValue::Address(0x80405678));
        assert_eq!(lo.value, LinkedValue::Address(0x80405678));
        assert_eq!(globals.find(0x80405678).unwrap().name, "D_80405678");
    }

    #[test]
    fn test_resolve_negative_low_half_wraps() {
        // addiu $t0, $t0, -0x70 reaches down from the upper half
        let (blk, globals) = analyzed(&[0x3C088040, 0x2508FF90], Syntax::Gas, true);
        let link = blk.instructions[1].linked.unwrap();
        assert_eq!(link.value, LinkedValue::Address(0x803FFF90));
        assert!(globals.find(0x803FFF90).is_some());
    }

    #[test]
    fn test_resolve_ori_pair_skips_data_label() {
        let (blk, globals) = analyzed(&[0x3C088040, 0x35085678], Syntax::Gas, true);
        assert_eq!(
            blk.instructions[0].linked.unwrap().value,
            LinkedValue::Address(0x80405678)
        );
        assert!(globals.is_empty());
    }

    #[test]
    fn test_resolve_load_store_pair() {
        // lui $t0 / lw $a0, 0x1234($t0)
        let (blk, globals) = analyzed(&[0x3C088040, 0x8D041234], Syntax::Gas, true);
        assert_eq!(
            blk.instructions[1].linked.unwrap().value,
            LinkedValue::Address(0x80401234)
        );
        assert_eq!(globals.find(0x80401234).unwrap().name, "D_80401234");
    }

    #[test]
    fn test_resolve_zero_displacement_never_links() {
        // lw $a0, 0($t0) dereferences a finished pointer
        let (blk, globals) = analyzed(&[0x3C088040, 0x8D040000], Syntax::Gas, true);
        assert!(blk.instructions[0].linked.is_none());
        assert!(blk.instructions[1].linked.is_none());
        assert!(globals.is_empty());
    }

    #[test]
    fn test_resolve_redefinition_blocks_address_pair() {
        // addu overwrites $t0 between the halves
        let (blk, globals) = analyzed(
            &[0x3C088040, 0x00434021, 0x8D041234], // lui / addu $t0,$v0,$v1 / lw
            Syntax::Gas,
            true,
        );
        assert!(blk.instructions[0].linked.is_none());
        assert!(blk.instructions[2].linked.is_none());
        assert!(globals.is_empty());
    }

    #[test]
    fn test_resolve_function_boundary_blocks_address_pair() {
        let (blk, _) = analyzed(
            &[0x3C088040, 0x03E00008, 0x00000000, 0x25085678],
            Syntax::Gas,
            true,
        );
        assert!(blk.instructions[0].linked.is_none());
        assert!(blk.instructions[3].linked.is_none());
    }

    #[test]
    fn test_resolve_lookback_window_bounds_the_scan() {
        let mut near = vec![0x3C088040u32];
        near.extend(std::iter::repeat(0x00000000).take(MAX_LOOKBACK - 1));
        near.push(0x25085678);
        let (blk, _) = analyzed(&near, Syntax::Gas, true);
        assert!(blk.instructions[0].linked.is_some());

        let mut far = vec![0x3C088040u32];
        far.extend(std::iter::repeat(0x00000000).take(MAX_LOOKBACK));
        far.push(0x25085678);
        let (blk, _) = analyzed(&far, Syntax::Gas, true);
        assert!(blk.instructions[0].linked.is_none());
    }

    #[test]
    fn test_resolve_unrelated_lui_does_not_end_scan() {
        // a lui for another register sits between the halves
        let (blk, globals) = analyzed(
            &[0x3C088040, 0x3C098080, 0x25085678], // lui $t0 / lui $t1 / addiu $t0
            Syntax::Gas,
            true,
        );
        assert_eq!(blk.instructions[2].linked.unwrap().partner, 0);
        assert!(globals.find(0x80405678).is_some());
    }

    // ========== Load Immediate Tests ==========

    #[test]
    fn test_resolve_rewrites_load_immediate() {
        let (blk, _) = analyzed(&[0x24040005, 0x2402FFFF, 0x34025678], Syntax::Gas, true);

        assert_eq!(blk.instructions[0].insn.id, InsnId::Li);
        assert_eq!(blk.instructions[0].insn.mnemonic, "li");
        assert_eq!(blk.instructions[0].insn.op_str, "$a0, 5");

        // addiu keeps its sign, ori stays zero-extended
        assert_eq!(blk.instructions[1].insn.op_str, "$v0, -1");
        assert_eq!(blk.instructions[2].insn.op_str, "$v0, 22136");
    }

    #[test]
    fn test_resolve_merge_disabled_leaves_instructions_alone() {
        let (blk, globals) = analyzed(&[0x24040005, 0x3C088040, 0x25085678], Syntax::Gas, false);
        assert_eq!(blk.instructions[0].insn.id, InsnId::Addiu);
        assert!(blk.instructions.iter().all(|i| i.linked.is_none()));
        assert!(globals.is_empty());
    }

    // ========== Float Constant Tests ==========

    #[test]
    fn test_resolve_float_constant_rewrites_lui() {
        let (blk, globals) = analyzed(&[0x3C014049, 0x44816000], Syntax::Gas, true);

        let hi = &blk.instructions[0];
        assert_eq!(hi.insn.id, InsnId::Li);
        assert_eq!(hi.insn.mnemonic, "li");
        assert_eq!(
            hi.linked.unwrap().value,
            LinkedValue::Float(3.140625)
        );
        assert_eq!(hi.linked.unwrap().partner, 1);

        // the transfer itself stays unlinked
        assert!(blk.instructions[1].linked.is_none());
        assert!(globals.is_empty());
    }

    #[test]
    fn test_resolve_float_scan_stops_at_redefinition() {
        // lb overwrites $at before the transfer
        let (blk, _) = analyzed(
            &[0x3C014049, 0x80410004, 0x44816000], // lui $at / lb $at, 4($v0) / mtc1 $at
            Syntax::Gas,
            true,
        );
        assert_eq!(blk.instructions[0].insn.id, InsnId::Lui);
        assert!(blk.instructions[0].linked.is_none());
    }

    #[test]
    fn test_resolve_float_scan_ignores_addu() {
        // addu ends address scans but not float scans
        let (blk, _) = analyzed(
            &[0x3C014049, 0x00430821, 0x44816000], // lui $at / addu $at,$v0,$v1 / mtc1 $at
            Syntax::Gas,
            true,
        );
        assert_eq!(blk.instructions[0].insn.id, InsnId::Li);
        assert!(blk.instructions[0].linked.is_some());
    }

    proptest! {
        #[test]
        fn test_resolve_lookback_terminates(
            gap in 0usize..192,
            ret_at in proptest::option::of(0usize..192),
        ) {
            // lui $t0 / `gap` fillers (one may be a return) / addiu $t0, $t0
            let mut ws = vec![0x3C088040u32];
            let mut crossed_return = false;
            for i in 0..gap {
                if ret_at == Some(i) {
                    ws.push(0x03E00008);
                    crossed_return = true;
                } else {
                    ws.push(0x00000000);
                }
            }
            ws.push(0x25085678);

            let (blk, _) = analyzed(&ws, Syntax::Gas, true);
            let in_window = gap < MAX_LOOKBACK;
            prop_assert_eq!(
                blk.instructions[0].linked.is_some(),
                in_window && !crossed_return
            );
        }
    }
}
