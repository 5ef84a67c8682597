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

//! Disassembly job descriptions
//!
//! A job names the ranges to disassemble and how to render them. Ranges
//! arrive either as command line arguments in the compact
//! `VADDR[:START[-END|+LENGTH]]` form or as `[[range]]` tables in a TOML
//! file; both forms produce the same [`Range`] values.

use std::str::FromStr;

use serde::Deserialize;

use super::disasm::Syntax;
use super::error::{DisasmError, Result};

/// One byte range of the input image and the address it runs at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Range {
    /// Virtual address of the first byte
    pub vaddr: u32,
    /// File offset the range starts at
    #[serde(default)]
    pub start: u32,
    /// Length in bytes; zero means "the rest of the file"
    #[serde(default)]
    pub length: u32,
}

impl FromStr for Range {
    type Err = DisasmError;

    /// Parse `VADDR`, `VADDR:START`, `VADDR:START-END` or `VADDR:START+LENGTH`
    ///
    /// Numbers are decimal, or hexadecimal with a `0x` prefix. A range
    /// without a length covers the rest of the file.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DisasmError::InvalidRange(s.to_string());
        let number = |text: &str| parse_u32(text).ok_or_else(invalid);

        let (vaddr_text, rest) = match s.split_once(':') {
            Some((vaddr_text, rest)) => (vaddr_text, Some(rest)),
            None => (s, None),
        };
        let vaddr = number(vaddr_text)?;

        let (start, length) = match rest {
            None => (0, 0),
            Some(rest) => {
                if let Some((start_text, end_text)) = rest.split_once('-') {
                    let start = number(start_text)?;
                    let end = number(end_text)?;
                    let length = end.checked_sub(start).ok_or_else(invalid)?;
                    (start, length)
                } else if let Some((start_text, length_text)) = rest.split_once('+') {
                    (number(start_text)?, number(length_text)?)
                } else {
                    (number(rest)?, 0)
                }
            }
        };

        Ok(Range {
            vaddr,
            start,
            length,
        })
    }
}

fn parse_u32(text: &str) -> Option<u32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// A disassembly job loaded from TOML
///
/// ```toml
/// syntax = "armips"
/// pseudo = true
///
/// [[range]]
/// vaddr = 0x80000450
/// start = 0x1050
/// length = 0x2000
/// ```
///
/// Every field is optional; an empty file describes a job that renders the
/// whole input as gas source at virtual address zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisasmConfig {
    /// Output dialect
    pub syntax: Syntax,
    /// Merge hi/lo pairs into symbolic pseudoinstructions
    pub pseudo: bool,
    /// Ranges to disassemble, in output order
    #[serde(rename = "range")]
    pub ranges: Vec<Range>,
}

impl DisasmConfig {
    /// Load a job description from a TOML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
