//! Address allocation: honours the translator's reclaim promises, packs
//! the floating blocks into the remaining free space (coupling if/else
//! targets at the sequencer displacement), then resolves symbolic next
//! addresses.

use indexmap::IndexSet;

use crate::chunk::FreeChunkChain;
use crate::error::AllocateError;
use crate::program::Program;

pub fn allocate(
    program: &mut Program,
    words: usize,
    displacement: u16,
) -> Result<(), AllocateError> {
    let mut chunks = FreeChunkChain::new(words);

    // The translator cannot keep a chunk chain of its own because it does
    // not know the store size; its promises are applied here instead.
    for &(start, end) in &program.reclaim_promises {
        chunks.reclaim(start as usize, end as usize)?;
    }

    place_blocks(program, &mut chunks, displacement)?;
    verify_pinned_pairs(program, displacement)?;
    resolve_next_addresses(program);
    Ok(())
}

fn place_blocks(
    program: &mut Program,
    chunks: &mut FreeChunkChain,
    displacement: u16,
) -> Result<(), AllocateError> {
    let annotations: Vec<(usize, usize)> = program
        .block_annotations
        .iter()
        .map(|(&start, &size)| (start, size))
        .collect();
    // Pair partners placed together with their counterpart; their own
    // annotations are skipped when reached.
    let mut placed: IndexSet<String> = IndexSet::new();

    for (start, size) in annotations {
        if size == 0 {
            continue;
        }
        let label = program.instructions[start].label.clone();

        let is_pair_member = matches!(&label, Some(name) if program.has_if_else_target(name));
        if !is_pair_member {
            let first = chunks.first_chunk_ge(size).ok_or(AllocateError::NoRoom {
                label: label.unwrap_or_default(),
                size,
            })?;
            place_block(program, chunks, start, first)?;
            continue;
        }

        let name = label.unwrap();
        if placed.contains(name.as_str()) {
            continue;
        }

        let partner = program.paired_target(&name).unwrap().to_string();
        let partner_annotation = program
            .count_for_label
            .get(&partner)
            .and_then(|&count| program.block_annotations.get(&count).map(|&k| (count, k)));

        match partner_annotation {
            Some((partner_start, partner_size)) => {
                let block_is_if = program.is_if_target(&name);
                let (if_start, if_size, else_start, else_size) = if block_is_if {
                    (start, size, partner_start, partner_size)
                } else {
                    (partner_start, partner_size, start, size)
                };

                let (else_first, if_first) = chunks
                    .displaced_pair(else_size, if_size, displacement as usize)
                    .ok_or_else(|| pair_error(program, &name, &partner, displacement))?;
                place_block(program, chunks, else_start, else_first)?;
                place_block(program, chunks, if_start, if_first)?;
                placed.insert(partner);
            }
            None => {
                // The partner has no floating block of its own; it must
                // already sit at a pinned address for the coupling to hold.
                let partner_address = program
                    .address_of(&partner)
                    .ok_or_else(|| AllocateError::UnplacedPairTarget(name.clone(), partner.clone()))?;
                let first = if program.is_if_target(&name) {
                    partner_address.checked_add(displacement)
                } else {
                    partner_address.checked_sub(displacement)
                }
                .ok_or_else(|| pair_error(program, &name, &partner, displacement))?;
                place_block(program, chunks, start, first as usize)?;
            }
        }
    }
    Ok(())
}

/// Reclaims `size` words from `first` on and fills in the addresses of
/// the block starting at instruction `start`. The last instruction's next
/// address stays open for the resolution pass.
fn place_block(
    program: &mut Program,
    chunks: &mut FreeChunkChain,
    start: usize,
    first: usize,
) -> Result<(), AllocateError> {
    let size = program.block_annotations[&start];
    chunks.reclaim(first, first + size - 1)?;

    if let Some(name) = program.instructions[start].label.clone() {
        program.address_for_label.insert(name, Some(first as u16));
    }
    for offset in 0..size {
        let instruction = &mut program.instructions[start + offset];
        instruction.address = Some((first + offset) as u16);
        if offset + 1 < size {
            instruction.next_address = Some((first + offset + 1) as u16);
        }
    }
    Ok(())
}

/// Pairs whose members were both pinned never went through placement;
/// the displacement constraint still has to hold for them.
fn verify_pinned_pairs(program: &Program, displacement: u16) -> Result<(), AllocateError> {
    for (if_label, else_label) in program.if_else_pairs() {
        if let (Some(if_address), Some(else_address)) =
            (program.address_of(if_label), program.address_of(else_label))
        {
            if if_address != else_address + displacement {
                return Err(AllocateError::PinnedPairMismatch {
                    if_label: if_label.to_string(),
                    else_label: else_label.to_string(),
                    if_address,
                    else_address,
                    displacement,
                });
            }
        }
    }
    Ok(())
}

/// Fills the next address of every goto with a placed target and closes
/// halt self loops. Instructions left open here are unreachable and emit
/// as zero words.
fn resolve_next_addresses(program: &mut Program) {
    let labels = &program.address_for_label;
    for instruction in &mut program.instructions {
        if instruction.next_address.is_some() {
            continue;
        }
        if let Some(target) = &instruction.target_label {
            if let Some(Some(address)) = labels.get(target) {
                instruction.next_address = Some(*address);
                continue;
            }
        }
        if instruction.is_halt {
            instruction.next_address = instruction.address;
        }
    }
}

fn pair_error(
    program: &Program,
    name: &str,
    partner: &str,
    displacement: u16,
) -> AllocateError {
    let (if_label, else_label) = if program.is_if_target(name) {
        (name.to_string(), partner.to_string())
    } else {
        (partner.to_string(), name.to_string())
    };
    let size_of = |label: &str| {
        program
            .count_for_label
            .get(label)
            .and_then(|count| program.block_annotations.get(count))
            .copied()
            .unwrap_or(0)
    };
    AllocateError::NoPairRoom {
        if_size: size_of(&if_label),
        else_size: size_of(&else_label),
        if_label,
        else_label,
        displacement,
    }
}
