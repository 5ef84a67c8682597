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

//! n64rx entry point
//!
//! Disassembles ranges of an N64 ROM image into assembler source. All
//! ranges are analyzed before any output is written so calls between
//! ranges resolve to function labels.

use std::fs;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Parser};

use n64rx::core::config::{DisasmConfig, Range};
use n64rx::core::disasm::{DisasmSession, Syntax};

#[derive(Parser, Debug)]
#[command(name = "n64rx", version, about = "Symbolic disassembler for N64 ROM images")]
struct Cli {
    /// Input binary image
    file: PathBuf,

    /// Ranges to disassemble as VADDR[:START[-END|+LENGTH]]
    #[arg(value_parser = Range::from_str)]
    ranges: Vec<Range>,

    /// Write the listing to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Job description file supplying syntax, pseudo and ranges
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Merge hi/lo immediate pairs into pseudoinstructions
    #[arg(short, long)]
    pseudo: bool,

    /// Assembler dialect for the output
    #[arg(short, long, value_name = "SYNTAX", value_parser = Syntax::from_str)]
    syntax: Option<Syntax>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    // Merge the command line over the job description, if one was given
    let job = match &cli.config {
        Some(path) => DisasmConfig::load(path)?,
        None => DisasmConfig::default(),
    };
    let syntax = cli.syntax.unwrap_or(job.syntax);
    let pseudo = cli.pseudo || job.pseudo;
    let mut ranges = if cli.ranges.is_empty() {
        job.ranges
    } else {
        cli.ranges
    };

    log::info!(
        "Disassembling {} as {} source...",
        cli.file.display(),
        syntax
    );

    let data = fs::read(&cli.file)?;

    // No usable range means the whole file
    if ranges.is_empty() {
        ranges.push(Range {
            vaddr: 0,
            start: 0,
            length: data.len() as u32,
        });
    } else if ranges.len() == 1 && ranges[0].length == 0 {
        ranges[0].start = 0;
        ranges[0].length = data.len() as u32;
    }

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let mut session = DisasmSession::new(syntax, pseudo);
    session.write_header(&mut out, cli.output.as_deref())?;

    for range in &ranges {
        log::info!(
            "Disassembling range 0x{:X}-0x{:X} at 0x{:08X}",
            range.start,
            range.start.wrapping_add(range.length),
            range.vaddr
        );
        session.first_pass(&data, range.start as usize, range.length as usize, range.vaddr)?;
    }

    session.write_label_defines(&mut out)?;

    for range in &ranges {
        session.second_pass(&mut out, range.start as usize)?;
    }

    session.write_footer(&mut out)?;
    out.flush()?;

    Ok(())
}
