//! Control store emission: the text and binary images of an assembled
//! program, plus the human readable listing behind `--dump`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use color_print::cprintln;
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::program::Program;
use mic1::cbit::B_FIELD;
use mic1::{word, CBit};

/// The full control store, one packed 36-bit word per address. Slots
/// without a fully determined instruction stay zero. If two instructions
/// land on the same address, which one survives is undefined.
pub fn store_words(program: &Program, words: usize) -> Vec<u64> {
    let mut store = vec![0u64; words];
    for instruction in &program.instructions {
        if let (Some(address), Some(word)) = (instruction.address, instruction.word()) {
            if (address as usize) < words {
                store[address as usize] = word;
            }
        }
    }
    store
}

/// One 36-digit binary line per control store word.
pub fn text_lines(program: &Program, words: usize) -> Vec<String> {
    store_words(program, words)
        .into_iter()
        .map(word::render)
        .collect()
}

pub fn write_text(program: &Program, words: usize, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in text_lines(program, words) {
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}

pub fn write_binary(
    program: &Program,
    words: usize,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let bytes = word::to_bytes(&store_words(program, words));
    std::fs::write(path, bytes)
}

/// Prints every occupied control store word with its label and active
/// control signals.
pub fn print_dump(program: &Program) {
    let rows = program
        .instructions
        .iter()
        .filter(|i| i.word().is_some())
        .sorted_by_key(|i| i.address)
        .collect::<Vec<_>>();

    for instruction in rows {
        let address = instruction.address.unwrap();
        let next = instruction.next_address.unwrap();
        let label = instruction.label.as_deref().unwrap_or("");
        cprintln!(
            "[{:03X}] {} | <green>{:>12}</> | next {:03X} {}",
            address,
            word::render(word::pack(next, instruction.control)),
            label,
            next,
            signal_names(instruction.control),
        );
    }
}

fn signal_names(control: u32) -> String {
    let flags = CBit::iter()
        .filter(|bit| bit.mask() & B_FIELD == 0)
        .filter(|bit| control & bit.mask() != 0)
        .map(|bit| bit.name())
        .join(" ");
    format!("B={:04b} {}", control & B_FIELD, flags)
}
