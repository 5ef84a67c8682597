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

//! Range decoding
//!
//! Turns one byte range into the instruction list the resolver and emitter
//! work on. Decoding walks the range in chunks so large ROM segments keep
//! reporting progress, and the instruction count is capped so a range that
//! is really data cannot balloon the session.
//!
//! Words the decoder rejects become `.byte` placeholder entries; every slot
//! stays exactly four bytes wide so virtual addresses and file offsets run
//! in lockstep with the instruction index.
//!
//! The instruction buffer starts small, doubles on demand up to a hard
//! ceiling, and on a denied reservation truncates the incoming batch to the
//! space that is left instead of aborting. A full buffer ends decoding for
//! the range.

use crate::core::decoder::{render_operands, Decoder, Insn, InsnGroups, InsnId, Operand, Reg};

use super::Instruction;

/// Upper bound on decoded instructions per range
const MAX_INSTRUCTIONS: usize = 0x40000;
/// Outer progress-reporting granularity in bytes
const CHUNK_SIZE: usize = 0x8000;
/// Inner decode batch size in bytes
const SUB_CHUNK_SIZE: usize = 0x400;

/// Decode `data` into instruction slots rendered at `vaddr`
///
/// Never fails: undecodable words turn into `.byte` entries and a trailing
/// fragment shorter than one word is dropped. Output length is capped at
/// [`MAX_INSTRUCTIONS`]; a denied reservation on the way there keeps the
/// instructions that already fit.
pub(super) fn decode_range(decoder: &Decoder, data: &[u8], vaddr: u32) -> Vec<Instruction> {
    let mut capacity = usize::min(data.len() / 4 + 256, 4096);
    let mut instructions: Vec<Instruction> = Vec::with_capacity(capacity);

    log::debug!(
        "Processing {} bytes in chunks of {} bytes",
        data.len(),
        CHUNK_SIZE
    );

    let mut processed = 0usize;
    'decode: while processed < data.len() {
        let chunk_size = usize::min(CHUNK_SIZE, data.len() - processed);
        let mut chunk_processed = 0usize;

        while chunk_processed < chunk_size {
            let pos = processed + chunk_processed;
            let sub_size = usize::min(SUB_CHUNK_SIZE, chunk_size - chunk_processed);
            if sub_size < 4 {
                break;
            }

            let sub_vaddr = vaddr.wrapping_add(pos as u32);
            let batch = decoder.disassemble(&data[pos..pos + sub_size], sub_vaddr);
            if batch.is_empty() {
                if reserve(&mut instructions, &mut capacity, 1) == 0 {
                    break 'decode;
                }
                // undecodable word; keep the stream aligned
                let bytes = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
                admit(&mut instructions, raw_word(bytes));
                chunk_processed += 4;
            } else {
                let accepted = reserve(&mut instructions, &mut capacity, batch.len());
                if accepted == 0 {
                    break 'decode;
                }
                for insn in batch.into_iter().take(accepted) {
                    admit(&mut instructions, insn);
                }
                chunk_processed += accepted * 4;
            }
        }

        processed += chunk_size;
        if data.len() > 0x10000 && processed % 0x10000 == 0 {
            log::info!(
                "  Processed {}/{} bytes ({:.2}%)",
                processed,
                data.len(),
                100.0 * processed as f64 / data.len() as f64
            );
        }
    }

    instructions
}

/// Make room for up to `incoming` more entries
///
/// The tracked capacity doubles as needed, capped at [`MAX_INSTRUCTIONS`].
/// Returns how many of the incoming entries fit; fewer than `incoming` means
/// the batch was truncated, and zero means the buffer is full and the caller
/// should stop feeding it.
fn reserve(instructions: &mut Vec<Instruction>, capacity: &mut usize, incoming: usize) -> usize {
    if instructions.len() + incoming <= *capacity {
        return incoming;
    }

    let target = usize::min(*capacity * 2, MAX_INSTRUCTIONS);
    if target == *capacity {
        let available = *capacity - instructions.len();
        if available == 0 {
            log::info!(
                "Hit instruction limit, stopping at instruction {}",
                instructions.len()
            );
        }
        return usize::min(incoming, available);
    }

    match instructions.try_reserve_exact(target - instructions.len()) {
        Ok(()) => {
            *capacity = target;
            usize::min(incoming, *capacity - instructions.len())
        }
        Err(_) => {
            log::error!("Failed to reserve memory for {} instructions", target);
            let available = *capacity - instructions.len();
            if available == 0 {
                log::info!(
                    "No space left for instructions, stopping at instruction {}",
                    instructions.len()
                );
            }
            usize::min(incoming, available)
        }
    }
}

/// Placeholder entry for a word the decoder rejected
fn raw_word(bytes: [u8; 4]) -> Insn {
    Insn {
        id: InsnId::Byte,
        bytes,
        mnemonic: ".byte".to_string(),
        op_str: format!(
            "0x{:02x}, 0x{:02x}, 0x{:02x}, 0x{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3]
        ),
        operands: Vec::new(),
        groups: InsnGroups::empty(),
    }
}

fn admit(instructions: &mut Vec<Instruction>, mut insn: Insn) {
    fix_cop0_move(&mut insn);
    let mut instr = Instruction::new(insn);
    instr.is_jump = is_jump(&instr.insn);
    instructions.push(instr);
}

fn is_jump(insn: &Insn) -> bool {
    insn.is_in_group(InsnGroups::BRANCH_RELATIVE | InsnGroups::JUMP)
        || insn.id == InsnId::Jal
        || insn.id == InsnId::Bal
}

/// Rebuild the selector operand of COP0 moves from the raw word
///
/// The selector is the `rd` field of the encoding, not a general-purpose
/// register; normalizing here keeps the rest of the pipeline independent of
/// how a decoder backend modeled it.
fn fix_cop0_move(insn: &mut Insn) {
    if insn.id != InsnId::Mfc0 && insn.id != InsnId::Mtc0 {
        return;
    }
    let rd = (insn.bytes[2] & 0xF8) >> 3;
    if insn.operands.len() == 2 {
        insn.operands[1] = Operand::Reg(Reg::Cop0(rd));
        insn.op_str = render_operands(&insn.operands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[u32]) -> Vec<u8> {
        ws.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    // ========== Range Decoding Tests ==========

    #[test]
    fn test_decode_range_wraps_each_word() {
        let decoder = Decoder::new();
        let data = words(&[0x27BDFFE8, 0x03E00008, 0x00000000]);
        let instructions = decode_range(&decoder, &data, 0x80000000);

        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[0].insn.id, InsnId::Addiu);
        assert_eq!(instructions[1].insn.id, InsnId::Jr);
        assert_eq!(instructions[2].insn.id, InsnId::Nop);
        assert!(instructions.iter().all(|i| i.linked.is_none()));
        assert!(instructions.iter().all(|i| !i.newline));
    }

    #[test]
    fn test_decode_range_empty_input() {
        let decoder = Decoder::new();
        assert!(decode_range(&decoder, &[], 0x80000000).is_empty());
    }

    #[test]
    fn test_decode_range_drops_trailing_fragment() {
        let decoder = Decoder::new();
        let mut data = words(&[0x00000000]);
        data.extend_from_slice(&[0x03, 0xE0]);
        let instructions = decode_range(&decoder, &data, 0x80000000);

        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].insn.id, InsnId::Nop);
    }

    #[test]
    fn test_decode_range_marks_jumps() {
        let decoder = Decoder::new();
        let data = words(&[
            0x0C000400, // jal
            0x1443FFFE, // bne
            0x03E00008, // jr
            0x24040005, // addiu
            0x04110004, // bal
        ]);
        let instructions = decode_range(&decoder, &data, 0x80000000);

        let flags: Vec<bool> = instructions.iter().map(|i| i.is_jump).collect();
        assert_eq!(flags, vec![true, true, true, false, true]);
    }

    // ========== Decode Gap Tests ==========

    #[test]
    fn test_decode_range_fills_gaps_with_raw_bytes() {
        let decoder = Decoder::new();
        let data = words(&[0x4C000000, 0x03E00008]);
        let instructions = decode_range(&decoder, &data, 0x80000000);

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].insn.id, InsnId::Byte);
        assert_eq!(instructions[0].insn.mnemonic, ".byte");
        assert_eq!(instructions[0].insn.op_str, "0x4c, 0x00, 0x00, 0x00");
        assert!(!instructions[0].is_jump);
        assert_eq!(instructions[1].insn.id, InsnId::Jr);
    }

    #[test]
    fn test_decode_range_keeps_vaddr_alignment_after_gap() {
        let decoder = Decoder::new();
        // branch following a gap still resolves relative to its own address
        let data = words(&[0x4C000000, 0x10000001]);
        let instructions = decode_range(&decoder, &data, 0x80000000);

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[1].insn.id, InsnId::Beq);
        assert_eq!(instructions[1].insn.operands[0].imm(), Some(0x8000000C));
    }

    // ========== COP0 Selector Tests ==========

    #[test]
    fn test_decode_range_rewrites_cop0_selector() {
        let decoder = Decoder::new();
        let data = words(&[0x40086000, 0x40886000]); // mfc0 / mtc0 $t0, Status
        let instructions = decode_range(&decoder, &data, 0x80000000);

        for instr in &instructions {
            assert_eq!(instr.insn.operands[1], Operand::Reg(Reg::Cop0(12)));
            assert_eq!(instr.insn.op_str, "$t0, $12");
        }
    }

    // ========== Instruction Limit Tests ==========

    #[test]
    fn test_decode_range_caps_instruction_count() {
        let decoder = Decoder::new();
        let data = vec![0u8; MAX_INSTRUCTIONS * 4 + 4];
        let instructions = decode_range(&decoder, &data, 0x80000000);

        assert_eq!(instructions.len(), MAX_INSTRUCTIONS);
    }

    #[test]
    fn test_decode_range_bounded_on_data_heavy_input() {
        let decoder = Decoder::new();
        // 64 MiB of words no decode table accepts
        let data = vec![0x4C_u8; 64 * 1024 * 1024];
        let instructions = decode_range(&decoder, &data, 0x80000000);

        assert_eq!(instructions.len(), MAX_INSTRUCTIONS);
        assert!(instructions.iter().all(|i| i.insn.id == InsnId::Byte));
    }

    #[test]
    fn test_reserve_doubles_capacity_on_overflow() {
        let mut instructions: Vec<Instruction> = Vec::new();
        let mut capacity = 256;
        for _ in 0..256 {
            assert_eq!(reserve(&mut instructions, &mut capacity, 1), 1);
            instructions.push(Instruction::new(raw_word([0; 4])));
        }
        assert_eq!(capacity, 256);

        assert_eq!(reserve(&mut instructions, &mut capacity, 1), 1);
        assert_eq!(capacity, 512);
    }

    #[test]
    fn test_reserve_truncates_batch_when_full() {
        let mut instructions: Vec<Instruction> = (0..MAX_INSTRUCTIONS - 2)
            .map(|_| Instruction::new(raw_word([0; 4])))
            .collect();
        let mut capacity = MAX_INSTRUCTIONS;

        // two slots left: the batch is cut down, then the buffer reports full
        assert_eq!(reserve(&mut instructions, &mut capacity, 8), 2);
        instructions.push(Instruction::new(raw_word([0; 4])));
        instructions.push(Instruction::new(raw_word([0; 4])));
        assert_eq!(reserve(&mut instructions, &mut capacity, 8), 0);
        assert_eq!(capacity, MAX_INSTRUCTIONS);
    }
}
