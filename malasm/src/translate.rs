//! The translation walk: one left to right pass over the parse tree that
//! encodes every instruction, assigns addresses after placement labels,
//! and records the layout work left for the allocator.

use crate::ast;
use crate::encode;
use crate::error::TranslateError;
use crate::program::{Instruction, Program};

/// Placement state carried across the walk. The two active modes are
/// mutually exclusive.
///
/// `Contiguous` runs from a placement label to the next control transfer;
/// every instruction in between gets its address from `cursor` and the
/// covered region becomes a reclaim promise. `Annotating` runs from any
/// other label (or from instruction 0) to the next control transfer and
/// only records the block start and size; placement is deferred.
enum Mode {
    Idle,
    Contiguous { pin: u16, cursor: u16 },
    Annotating { start: usize, size: usize },
}

pub fn translate(source: &ast::Source) -> Result<Program, TranslateError> {
    let mut program = Program::default();
    let mut mode = if source.instructions.is_empty() {
        Mode::Idle
    } else {
        // The entry point is an implicit block at instruction 0
        Mode::Annotating { start: 0, size: 0 }
    };

    for (index, parsed) in source.instructions.iter().enumerate() {
        let mut instruction = Instruction::default();

        if let Some(label) = &parsed.label {
            if program.address_for_label.contains_key(&label.name)
                || program.count_for_label.contains_key(&label.name)
            {
                return Err(TranslateError::DuplicateLabel(label.name.clone()));
            }

            // A pinned run cut short by the next label still owns the
            // words it covered; an annotated run cut short by a pin is
            // dropped and becomes unreachable.
            if let Mode::Contiguous { pin, cursor } = mode {
                if cursor > pin {
                    program.reclaim_promises.push((pin, cursor - 1));
                }
            }
            mode = match label.address {
                Some(pin) => Mode::Contiguous { pin, cursor: pin },
                None => Mode::Annotating {
                    start: index,
                    size: 0,
                },
            };

            instruction.label = Some(label.name.clone());
            program
                .address_for_label
                .insert(label.name.clone(), label.address);
            program.count_for_label.insert(label.name.clone(), index);
        }

        if let Mode::Contiguous { cursor, .. } = mode {
            instruction.address = Some(cursor);
        }

        let encoded = encode::encode(&parsed.stmt);
        instruction.control = encoded.control;
        instruction.next_address = encoded.next_address;
        instruction.target_label = encoded.target_label;
        instruction.is_halt = encoded.is_halt;
        if let Some((if_target, else_target)) = encoded.if_else {
            program.add_if_else_target(&if_target, &else_target)?;
        }

        let closes = parsed.stmt.closes_block();
        mode = match mode {
            Mode::Contiguous { pin, cursor } => {
                if closes {
                    program.reclaim_promises.push((pin, cursor));
                    Mode::Idle
                } else {
                    instruction.next_address = Some(cursor + 1);
                    Mode::Contiguous {
                        pin,
                        cursor: cursor + 1,
                    }
                }
            }
            Mode::Annotating { start, size } => {
                if closes {
                    program.block_annotations.insert(start, size + 1);
                    Mode::Idle
                } else {
                    Mode::Annotating {
                        start,
                        size: size + 1,
                    }
                }
            }
            Mode::Idle => Mode::Idle,
        };

        program.instructions.push(instruction);
    }

    // End of input commits whatever is still open
    match mode {
        Mode::Contiguous { pin, cursor } => {
            if cursor > pin {
                program.reclaim_promises.push((pin, cursor - 1));
            }
        }
        Mode::Annotating { start, size } => {
            if size > 0 {
                program.block_annotations.insert(start, size);
            }
        }
        Mode::Idle => {}
    }

    Ok(program)
}
