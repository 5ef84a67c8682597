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

//! Listing output
//!
//! Renders analyzed blocks as assembler source. Every line carries a byte
//! comment (`/* offset vaddr word */`) so the listing can be diffed against
//! a hexdump, and delay slots are indented one extra column.
//!
//! Rendering never mutates the session, so a block can be emitted any
//! number of times with identical results. Mnemonics the target assemblers
//! cannot ingest are demoted to `.byte` directives that keep the encoded
//! word intact.

use std::io::{self, Write};
use std::path::Path;

use crate::core::decoder::{Insn, InsnId, Operand};

use super::labels::LabelTable;
use super::{Block, Link, LinkedValue, Syntax};

/// Mnemonic prefixes neither gas nor armips accept for this target
const INVALID_MNEMONICS: [&str; 9] = [
    "bc0", "bc1", "dmtc", "sync", "lsa", "ext", "paus", "fmul", "shrav",
];

fn is_unsupported(mnemonic: &str) -> bool {
    INVALID_MNEMONICS.iter().any(|p| mnemonic.starts_with(p))
}

/// Advance a label cursor past every label below `vaddr`
fn advance_past(table: &LabelTable, mut idx: usize, vaddr: u32) -> usize {
    while let Some(label) = table.get(idx) {
        if label.vaddr >= vaddr {
            break;
        }
        idx += 1;
    }
    idx
}

/// Label name for an address Pass 1 linked
///
/// Linking always records a label for the resolved address, so a miss here
/// is an analysis defect. Printing a bare number instead would bury it in
/// the listing, so fail where the defect is visible.
fn linked_label_text(globals: &LabelTable, addr: u32) -> &str {
    match globals.find(addr) {
        Some(label) => label.name.as_str(),
        None => panic!("no label recorded for linked address 0x{:08X}", addr),
    }
}

/// Float literal text; whole small constants keep an explicit decimal point
fn float_text(value: f32) -> String {
    if value == 0.0 {
        "0.0".to_string()
    } else if value == 1.0 {
        "1.0".to_string()
    } else {
        format!("{}", value)
    }
}

/// Render one analyzed block
///
/// Both label tables must already be sorted; the cursors only move forward.
pub(super) fn emit_block<W: Write>(
    out: &mut W,
    block: &Block,
    globals: &LabelTable,
    syntax: Syntax,
) -> io::Result<()> {
    let mut vaddr = block.vaddr;
    let mut offset = block.offset;
    let mut global_idx = advance_past(globals, 0, vaddr);
    let mut local_idx = advance_past(&block.locals, 0, vaddr);
    let mut indent = false;

    for instr in &block.instructions {
        if instr.newline {
            writeln!(out)?;
        }

        global_idx = advance_past(globals, global_idx, vaddr);
        while let Some(label) = globals.get(global_idx) {
            if label.vaddr != vaddr {
                break;
            }
            writeln!(out, "{}:", label.name)?;
            global_idx += 1;
        }
        local_idx = advance_past(&block.locals, local_idx, vaddr);
        while let Some(label) = block.locals.get(local_idx) {
            if label.vaddr != vaddr {
                break;
            }
            writeln!(out, "{}:", label.name)?;
            local_idx += 1;
        }

        let insn = &instr.insn;
        write!(
            out,
            "/* {:06X} {:08X} {:02X}{:02X}{:02X}{:02X} */  ",
            offset, vaddr, insn.bytes[0], insn.bytes[1], insn.bytes[2], insn.bytes[3]
        )?;
        if indent {
            write!(out, " ")?;
            indent = false;
        }

        if is_unsupported(&insn.mnemonic) {
            writeln!(
                out,
                ".byte 0x{:02X},0x{:02X},0x{:02X},0x{:02X} /* Because of invalid n64 opcode {} */",
                insn.bytes[0], insn.bytes[1], insn.bytes[2], insn.bytes[3], insn.mnemonic
            )?;
        } else if instr.is_jump {
            write!(out, "{:<5} ", insn.mnemonic)?;
            emit_transfer_target(out, block, globals, insn)?;
            writeln!(out)?;
            indent = true;
        } else if insn.id == InsnId::Mfc0 || insn.id == InsnId::Mtc0 {
            emit_cop0_move(out, insn)?;
        } else if let Some(link) = instr.linked {
            emit_linked(out, block, globals, syntax, insn, link)?;
        } else {
            writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str)?;
        }

        vaddr = vaddr.wrapping_add(4);
        offset += 4;
    }
    Ok(())
}

/// Print the destination of a control transfer symbolically
fn emit_transfer_target<W: Write>(
    out: &mut W,
    block: &Block,
    globals: &LabelTable,
    insn: &Insn,
) -> io::Result<()> {
    if matches!(insn.id, InsnId::Jal | InsnId::Bal | InsnId::J) {
        let target = insn.operands.first().and_then(|o| o.imm()).unwrap_or(0) as u32;
        match globals.find(target) {
            Some(label) => write!(out, "{}", label.name)?,
            None => write!(out, "0x{:08X}", target)?,
        }
    } else {
        let mut first = true;
        for op in &insn.operands {
            match op {
                Operand::Reg(r) => {
                    if !first {
                        write!(out, ", ")?;
                    }
                    write!(out, "${}", r.name())?;
                    first = false;
                }
                Operand::Imm(v) => {
                    if !first {
                        write!(out, ", ")?;
                    }
                    let target = *v as u32;
                    match block.locals.find(target) {
                        Some(label) => write!(out, "{}", label.name)?,
                        None => write!(out, "0x{:08X}", target)?,
                    }
                    first = false;
                }
                Operand::Mem { .. } => {}
            }
        }
    }
    Ok(())
}

/// COP0 moves print their selector as a bare register number
fn emit_cop0_move<W: Write>(out: &mut W, insn: &Insn) -> io::Result<()> {
    match (
        insn.operands.first().and_then(|o| o.reg()),
        insn.operands.get(1).and_then(|o| o.reg()),
    ) {
        (Some(gpr), Some(sel)) => writeln!(
            out,
            "{:<5} ${}, ${}",
            insn.mnemonic,
            gpr.name(),
            sel.number()
        ),
        _ => writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    }
}

fn emit_linked<W: Write>(
    out: &mut W,
    block: &Block,
    globals: &LabelTable,
    syntax: Syntax,
    insn: &Insn,
    link: Link,
) -> io::Result<()> {
    match insn.id {
        InsnId::Li => emit_float_constant(out, syntax, insn, link),
        InsnId::Lui => emit_upper_half(out, block, globals, syntax, insn, link),
        InsnId::Addiu | InsnId::Ori => emit_lower_half(out, globals, syntax, insn, link),
        _ => emit_lower_mem(out, globals, syntax, insn, link),
    }
}

/// `lui` rewritten into a float load; the raw bits ride along as a comment
fn emit_float_constant<W: Write>(
    out: &mut W,
    syntax: Syntax,
    insn: &Insn,
    link: Link,
) -> io::Result<()> {
    let value = match link.value {
        LinkedValue::Float(f) => f,
        LinkedValue::Address(_) => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    let reg = match insn.operands.first().and_then(|o| o.reg()) {
        Some(r) => r,
        None => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    match syntax {
        Syntax::Gas => writeln!(
            out,
            "{:<5} ${}, {} # 0x{:08X}",
            insn.mnemonic,
            reg.name(),
            float_text(value),
            value.to_bits()
        ),
        Syntax::Armips => writeln!(
            out,
            "{:<5} ${}, {} // 0x{:08X}",
            insn.mnemonic,
            reg.name(),
            float_text(value),
            value.to_bits()
        ),
    }
}

/// The `lui` side of an address pair; rendering depends on the partner
fn emit_upper_half<W: Write>(
    out: &mut W,
    block: &Block,
    globals: &LabelTable,
    syntax: Syntax,
    insn: &Insn,
    link: Link,
) -> io::Result<()> {
    let addr = match link.value {
        LinkedValue::Address(a) => a,
        LinkedValue::Float(_) => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    let reg = match insn.operands.first().and_then(|o| o.reg()) {
        Some(r) => r,
        None => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    let partner_id = block.instructions.get(link.partner).map(|p| p.insn.id);

    match partner_id {
        // the pair builds a raw constant, not an address
        Some(InsnId::Ori) => match syntax {
            Syntax::Gas => writeln!(
                out,
                "{:<5} ${}, (0x{:08X} >> 16) # {} {}",
                insn.mnemonic,
                reg.name(),
                addr,
                insn.mnemonic,
                insn.op_str
            ),
            Syntax::Armips => writeln!(
                out,
                "li.u  ${}, 0x{:08X} // {} {}",
                reg.name(),
                addr,
                insn.mnemonic,
                insn.op_str
            ),
        },
        Some(InsnId::Addiu) => match syntax {
            Syntax::Gas => writeln!(
                out,
                "{:<5} ${}, %hi({}) # {}",
                insn.mnemonic,
                reg.name(),
                linked_label_text(globals, addr),
                insn.op_str
            ),
            Syntax::Armips => writeln!(
                out,
                "la.u  ${}, {} // {} {}",
                reg.name(),
                linked_label_text(globals, addr),
                insn.mnemonic,
                insn.op_str
            ),
        },
        _ => match syntax {
            Syntax::Gas => writeln!(
                out,
                "{:<5} ${}, %hi({}) # {}",
                insn.mnemonic,
                reg.name(),
                linked_label_text(globals, addr),
                insn.op_str
            ),
            Syntax::Armips => writeln!(
                out,
                "lui   ${}, hi({}) // {}",
                reg.name(),
                linked_label_text(globals, addr),
                insn.op_str
            ),
        },
    }
}

/// `addiu`/`ori` completing an address or constant pair
fn emit_lower_half<W: Write>(
    out: &mut W,
    globals: &LabelTable,
    syntax: Syntax,
    insn: &Insn,
    link: Link,
) -> io::Result<()> {
    let addr = match link.value {
        LinkedValue::Address(a) => a,
        LinkedValue::Float(_) => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    let reg = match insn.operands.first().and_then(|o| o.reg()) {
        Some(r) => r,
        None => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    if insn.id == InsnId::Ori {
        match syntax {
            Syntax::Gas => writeln!(
                out,
                "{:<5} ${}, (0x{:08X} & 0xFFFF) # {} {}",
                insn.mnemonic,
                reg.name(),
                addr,
                insn.mnemonic,
                insn.op_str
            ),
            Syntax::Armips => writeln!(
                out,
                "li.l  ${}, 0x{:08X} // {} {}",
                reg.name(),
                addr,
                insn.mnemonic,
                insn.op_str
            ),
        }
    } else {
        match syntax {
            Syntax::Gas => writeln!(
                out,
                "{:<5} ${}, %lo({}) # {} {}",
                insn.mnemonic,
                reg.name(),
                linked_label_text(globals, addr),
                insn.mnemonic,
                insn.op_str
            ),
            Syntax::Armips => writeln!(
                out,
                "la.l  ${}, {} // {} {}",
                reg.name(),
                linked_label_text(globals, addr),
                insn.mnemonic,
                insn.op_str
            ),
        }
    }
}

/// Load or store whose displacement is the low half of a linked address
fn emit_lower_mem<W: Write>(
    out: &mut W,
    globals: &LabelTable,
    syntax: Syntax,
    insn: &Insn,
    link: Link,
) -> io::Result<()> {
    let addr = match link.value {
        LinkedValue::Address(a) => a,
        LinkedValue::Float(_) => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    let (reg, base) = match (insn.operands.first(), insn.operands.get(1)) {
        (Some(Operand::Reg(r)), Some(Operand::Mem { base, .. })) => (*r, *base),
        _ => return writeln!(out, "{:<5} {}", insn.mnemonic, insn.op_str),
    };
    let pct = match syntax {
        Syntax::Gas => "%",
        Syntax::Armips => "",
    };
    writeln!(
        out,
        "{:<5} ${}, {}lo({})(${})",
        insn.mnemonic,
        reg.name(),
        pct,
        linked_label_text(globals, addr),
        base.name()
    )
}

/// Assembler prologue
pub(super) fn write_header<W: Write>(
    out: &mut W,
    syntax: Syntax,
    output_path: Option<&Path>,
) -> io::Result<()> {
    match syntax {
        Syntax::Gas => {
            writeln!(out, ".set noat      # allow manual use of $at")?;
            writeln!(out, ".set noreorder # don't insert nops after branches")?;
            writeln!(out)?;
        }
        Syntax::Armips => {
            let bin = output_path
                .and_then(|p| p.file_stem())
                .map(|stem| format!("{}.bin", stem.to_string_lossy()))
                .unwrap_or_else(|| "test.bin".to_string());
            writeln!(out, ".n64")?;
            writeln!(out, ".create \"{}\", 0x00000000", bin)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Definitions for globals the assembler will otherwise never see
pub(super) fn write_label_defines<W: Write>(
    out: &mut W,
    globals: &LabelTable,
    blocks: &[Block],
    syntax: Syntax,
) -> io::Result<()> {
    if syntax == Syntax::Armips {
        for label in globals.iter() {
            let covered = blocks.iter().any(|b| {
                label.vaddr >= b.vaddr && label.vaddr < b.vaddr.wrapping_add(b.length as u32)
            });
            if !covered {
                writeln!(out, ".definelabel {}, 0x{:08X}", label.name, label.vaddr)?;
            }
        }
    }
    writeln!(out)?;
    Ok(())
}

/// Assembler epilogue
pub(super) fn write_footer<W: Write>(out: &mut W, syntax: Syntax) -> io::Result<()> {
    if syntax == Syntax::Armips {
        write!(out, "\n.close\n")?;
    }
    Ok(())
}
