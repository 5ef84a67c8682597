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

//! Error types for the disassembler
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `Result<T, DisasmError>`. Recoverable conditions (decode gaps, truncated
//! instruction buffers, empty blocks) are logged and absorbed inside the
//! session; only caller-visible failures surface here.

use thiserror::Error;

/// Errors reported by the disassembler
#[derive(Debug, Error)]
pub enum DisasmError {
    /// I/O failure while reading input or writing a listing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested range does not fit inside the input buffer
    #[error("range at offset 0x{offset:X} (+0x{length:X} bytes) exceeds input size 0x{file_len:X}")]
    RangeOutOfBounds {
        /// File offset of the range start
        offset: usize,
        /// Requested byte length
        length: usize,
        /// Actual input length
        file_len: usize,
    },

    /// Pass 2 was asked to emit a block that Pass 1 never produced
    #[error("no disassembled block at file offset 0x{offset:X}")]
    BlockNotFound {
        /// File offset the caller requested
        offset: usize,
    },

    /// A range argument could not be parsed
    #[error("invalid range '{0}' (expected VADDR, VADDR:START-END or VADDR:START+LENGTH)")]
    InvalidRange(String),

    /// An unrecognized assembler dialect name was given
    #[error("unknown assembler syntax '{0}', expected 'gas' or 'armips'")]
    UnknownSyntax(String),

    /// A disassembly config file could not be parsed
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, DisasmError>;
