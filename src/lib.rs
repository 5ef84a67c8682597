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

//! n64rx: A symbolic disassembler for N64 ROM images
//!
//! This crate turns raw VR4300 machine code into annotated assembler source
//! for either GNU as or armips.
//!
//! # Architecture
//!
//! Disassembly runs in two passes over any number of byte ranges:
//!
//! 1. Every range is decoded and analyzed first, collecting function labels,
//!    branch targets, and merged pseudoinstruction pairs into a session.
//! 2. Each range is then rendered as text, with all labels from every range
//!    already known so forward calls resolve symbolically.
//!
//! # Example
//!
//! ```
//! use n64rx::core::disasm::{DisasmSession, Syntax};
//!
//! // jr $ra / nop
//! let data = [0x03, 0xE0, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00];
//!
//! let mut session = DisasmSession::new(Syntax::Gas, true);
//! session.first_pass(&data, 0, data.len(), 0x80000000)?;
//!
//! let mut listing = Vec::new();
//! session.second_pass(&mut listing, 0)?;
//! # Ok::<(), n64rx::DisasmError>(())
//! ```
//!
//! # Modules
//!
//! - [`core::decoder`]: VR4300 instruction decoding
//! - [`core::disasm`]: two-pass analysis and listing output
//! - [`core::config`]: disassembly job descriptions in TOML
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`] which is an
//! alias for `Result<T, DisasmError>`.

pub mod core;

// Re-export commonly used types
pub use core::error::{DisasmError, Result};
