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

//! Two-pass symbolic disassembly pipeline
//!
//! A [`DisasmSession`] accumulates analysis over any number of byte ranges
//! and then renders them as assembler source:
//!
//! 1. **First pass** ([`DisasmSession::first_pass`]): decode a range into a
//!    block, discover call targets (session-global `func_*` labels), branch
//!    targets (block-local labels), and optionally merge hi/lo immediate
//!    pairs into symbolic references (`D_*` data labels, float constants).
//! 2. **Second pass** ([`DisasmSession::second_pass`]): render one analyzed
//!    block as text in the selected dialect.
//!
//! All first passes must run before any second pass; calls can land in
//! ranges that have not been analyzed yet, and their labels only exist once
//! the owning range's first pass has run.
//!
//! ## Modules
//!
//! - [`block`]: chunked range decoding with bounded instruction growth
//! - [`resolver`]: label discovery and hi/lo pseudoinstruction merging
//! - [`emitter`]: dialect-aware text output
//! - [`labels`]: label table shared by both scopes

mod block;
mod emitter;
mod labels;
mod resolver;

pub use labels::{Label, LabelTable};

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::decoder::{Decoder, Insn};
use super::error::{DisasmError, Result};

/// Assembler dialect for the rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// GNU assembler
    #[default]
    Gas,
    /// armips assembler
    Armips,
}

impl Syntax {
    /// Local label name for a branch target, carrying the dialect prefix
    fn local_label(self, vaddr: u32) -> String {
        match self {
            Syntax::Gas => format!(".L{:08X}", vaddr),
            Syntax::Armips => format!("@L{:08X}", vaddr),
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::Gas => write!(f, "gas"),
            Syntax::Armips => write!(f, "armips"),
        }
    }
}

impl FromStr for Syntax {
    type Err = DisasmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gas" => Ok(Syntax::Gas),
            "armips" => Ok(Syntax::Armips),
            other => Err(DisasmError::UnknownSyntax(other.to_string())),
        }
    }
}

/// Value shared by two instructions merged into a pseudoinstruction pair
#[derive(Debug, Clone, Copy, PartialEq)]
enum LinkedValue {
    /// Full 32-bit address assembled from a hi/lo immediate pair
    Address(u32),
    /// Single-precision constant loaded through an integer register
    Float(f32),
}

/// Connection between the two halves of a merged pair
#[derive(Debug, Clone, Copy, PartialEq)]
struct Link {
    /// Index of the partner instruction within the block
    partner: usize,
    /// The merged value both halves refer to
    value: LinkedValue,
}

/// One analyzed instruction slot within a block
#[derive(Debug, Clone)]
struct Instruction {
    /// Decoded form, possibly rewritten by the resolver
    insn: Insn,
    /// Set when this instruction is half of a merged pair
    linked: Option<Link>,
    /// Emit a blank line before this instruction
    newline: bool,
    /// Control transfer; the following line is indented as a delay slot
    is_jump: bool,
}

impl Instruction {
    fn new(insn: Insn) -> Self {
        Instruction {
            insn,
            linked: None,
            newline: false,
            is_jump: false,
        }
    }
}

/// One analyzed byte range
struct Block {
    /// Start offset within the input image
    offset: usize,
    /// Range length in bytes
    length: usize,
    /// Virtual address of the first byte
    vaddr: u32,
    /// Decoded instructions, one per word
    instructions: Vec<Instruction>,
    /// Branch targets local to this block, sorted after the first pass
    locals: LabelTable,
}

/// Accumulated disassembly state across ranges
///
/// # Example
///
/// ```
/// use n64rx::core::disasm::{DisasmSession, Syntax};
///
/// // jr $ra / nop
/// let data = [0x03, 0xE0, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00];
/// let mut session = DisasmSession::new(Syntax::Gas, false);
/// session.first_pass(&data, 0, data.len(), 0x80000000)?;
///
/// let mut out = Vec::new();
/// session.second_pass(&mut out, 0)?;
/// assert!(String::from_utf8(out).unwrap().contains("jr    $ra"));
/// # Ok::<(), n64rx::DisasmError>(())
/// ```
pub struct DisasmSession {
    decoder: Decoder,
    blocks: Vec<Block>,
    globals: LabelTable,
    /// Global label order is only guaranteed once the output stage starts
    globals_sorted: bool,
    syntax: Syntax,
    merge_pseudo: bool,
}

impl DisasmSession {
    /// Create a session for the given dialect
    ///
    /// # Arguments
    ///
    /// * `syntax` - Assembler dialect used for local label names and output
    /// * `merge_pseudo` - Merge hi/lo immediate pairs and float loads into
    ///   symbolic pseudoinstructions
    pub fn new(syntax: Syntax, merge_pseudo: bool) -> Self {
        DisasmSession {
            decoder: Decoder::new(),
            blocks: Vec::with_capacity(128),
            globals: LabelTable::new(),
            globals_sorted: false,
            syntax,
            merge_pseudo,
        }
    }

    /// The dialect this session renders
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Register a known symbol before or between passes
    ///
    /// Named symbols replace generated `func_*`/`D_*` names wherever the
    /// address matches. Passing `None` generates an `L<vaddr>` name.
    pub fn add_label(&mut self, name: Option<&str>, vaddr: u32) {
        self.globals.add(name, vaddr);
        self.globals_sorted = false;
    }

    /// First session-global label registered at `vaddr`, if any
    pub fn global_label_at(&self, vaddr: u32) -> Option<&str> {
        self.globals.find(vaddr).map(|l| l.name.as_str())
    }

    /// Decode and analyze one range of the input image
    ///
    /// Creates a block for `[offset, offset + length)` rendered at `vaddr`,
    /// collecting global and local labels as a side effect. Ranges may be
    /// analyzed in any order; run every first pass before the first
    /// [`DisasmSession::second_pass`] so cross-range call targets resolve.
    ///
    /// # Errors
    ///
    /// [`DisasmError::RangeOutOfBounds`] when the range does not fit in
    /// `data`. A range that decodes to zero instructions is not an error;
    /// the block stays empty and the session continues.
    pub fn first_pass(
        &mut self,
        data: &[u8],
        offset: usize,
        length: usize,
        vaddr: u32,
    ) -> Result<()> {
        let end = match offset.checked_add(length) {
            Some(end) if end <= data.len() => end,
            _ => {
                return Err(DisasmError::RangeOutOfBounds {
                    offset,
                    length,
                    file_len: data.len(),
                })
            }
        };

        let instructions = block::decode_range(&self.decoder, &data[offset..end], vaddr);
        let mut block = Block {
            offset,
            length,
            vaddr,
            instructions,
            locals: LabelTable::new(),
        };

        if block.instructions.is_empty() {
            if length > 0 {
                log::error!(
                    "Failed to disassemble 0x{:X} bytes of code at 0x{:08X}",
                    length, vaddr
                );
            }
        } else {
            resolver::resolve(&mut block, &mut self.globals, self.syntax, self.merge_pseudo);
        }

        block.locals.sort();
        self.globals_sorted = false;
        self.blocks.push(block);
        Ok(())
    }

    /// Render the block previously analyzed at `offset`
    ///
    /// # Errors
    ///
    /// [`DisasmError::BlockNotFound`] when no first pass ran for `offset`;
    /// I/O errors from the writer are passed through.
    pub fn second_pass<W: Write>(&mut self, out: &mut W, offset: usize) -> Result<()> {
        self.ensure_globals_sorted();
        let block = self
            .blocks
            .iter()
            .find(|b| b.offset == offset)
            .ok_or(DisasmError::BlockNotFound { offset })?;

        if self.syntax == Syntax::Armips {
            writeln!(out, ".headersize 0x{:08X}", block.vaddr)?;
            writeln!(out)?;
        }
        emitter::emit_block(out, block, &self.globals, self.syntax)?;
        Ok(())
    }

    /// Write the assembler prologue for this dialect
    ///
    /// For armips output the created binary is named after `output_path`
    /// with a `.bin` extension, or `test.bin` when writing to stdout.
    pub fn write_header<W: Write>(&self, out: &mut W, output_path: Option<&Path>) -> Result<()> {
        emitter::write_header(out, self.syntax, output_path)?;
        Ok(())
    }

    /// Write symbol definitions for globals that fall outside every block
    ///
    /// armips needs `.definelabel` directives for addresses the assembler
    /// will not see; other dialects only get the separating blank line.
    pub fn write_label_defines<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.ensure_globals_sorted();
        emitter::write_label_defines(out, &self.globals, &self.blocks, self.syntax)?;
        Ok(())
    }

    /// Write the assembler epilogue for this dialect
    pub fn write_footer<W: Write>(&self, out: &mut W) -> Result<()> {
        emitter::write_footer(out, self.syntax)?;
        Ok(())
    }

    fn ensure_globals_sorted(&mut self) {
        if !self.globals_sorted {
            self.globals.sort();
            self.globals_sorted = true;
        }
    }
}
