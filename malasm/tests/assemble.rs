use malasm::error::{AllocateError, Error};
use malasm::symbols::SymbolMap;
use malasm::{assemble, assemble_sized, output};
use mic1::{word, CBit, STORE_WORDS};

fn control(bits: &[CBit]) -> u32 {
    bits.iter().fold(0, |acc, bit| acc | bit.mask())
}

#[test]
fn pinned_straight_line() {
    // S1
    let program = assemble("main = 0x000: MDR = MDR + 1; wr").unwrap();
    let inst = &program.instructions[0];
    assert_eq!(inst.address, Some(0));
    assert_eq!(inst.next_address, Some(1));
    // B selector is 0000 for MDR, so only the flag bits remain
    assert_eq!(
        inst.control,
        control(&[
            CBit::Write,
            CBit::CMdr,
            CBit::F0,
            CBit::F1,
            CBit::EnB,
            CBit::Inc
        ])
    );

    let words = output::store_words(&program, STORE_WORDS);
    assert_eq!(words[0], word::pack(1, inst.control));
    assert!(words[1..].iter().all(|&w| w == 0));
}

#[test]
fn goto_forward_reference() {
    // S2
    let program = assemble("main = 0x000: goto loop\nloop: H = H + 1; goto loop").unwrap();
    assert_eq!(program.instructions[0].address, Some(0));
    assert_eq!(program.address_of("loop"), Some(1));
    assert_eq!(program.instructions[0].next_address, Some(1));
    assert_eq!(program.instructions[1].address, Some(1));
    assert_eq!(program.instructions[1].next_address, Some(1));
}

#[test]
fn if_else_coupling() {
    // S3
    let code = "\
start = 0x000: Z = TOS; if (Z) goto isz; else goto nnz
nnz: H = H; goto start
isz: MDR = 0; goto start";
    let program = assemble(code).unwrap();

    let nnz = program.address_of("nnz").unwrap();
    let isz = program.address_of("isz").unwrap();
    assert_eq!(isz, nnz + 256);
    assert_eq!(isz % 256, nnz % 256);
    assert_eq!(nnz, 1);

    let branch = &program.instructions[0];
    assert!(branch.control & CBit::Jamz.mask() != 0);
    assert!(branch.control & CBit::Jamn.mask() == 0);
    // The encoded fall through is the else target
    assert_eq!(branch.next_address, Some(nnz));

    assert_eq!(program.instructions[1].next_address, Some(0));
    assert_eq!(program.instructions[2].next_address, Some(0));
}

#[test]
fn halt_self_loop() {
    // S4
    let program = assemble("main = 0x000: halt").unwrap();
    let inst = &program.instructions[0];
    assert_eq!(inst.address, Some(0));
    assert_eq!(inst.next_address, Some(0));
    assert_eq!(inst.control, 0x0000009);

    let words = output::store_words(&program, STORE_WORDS);
    assert_eq!(words[0], 0x9);
}

#[test]
fn overlapping_pins_are_infeasible() {
    // S5
    let code = "\
a = 0x010: PC = PC + 1
goto a
b = 0x011: H = H + 1
goto b";
    match assemble(code) {
        Err(Error::Allocate(AllocateError::RegionConflict(start, end))) => {
            assert_eq!((start, end), (0x11, 0x11));
        }
        other => panic!("expected a region conflict, got {other:?}"),
    }
}

#[test]
fn floating_blocks_pack_into_free_chunks() {
    // S6
    let code = "\
main = 0x010: PC = PC + 1
H = H + 1
goto two
two: H = H + 1
H = H + 1; goto four
four: H = H + 1
H = H + 1
H = H + 1
H = H + 1; goto two";
    let program = assemble(code).unwrap();

    assert_eq!(program.address_of("two"), Some(0));
    assert_eq!(program.address_of("four"), Some(2));

    // Within a block every word chains to its neighbour
    for index in [0, 1, 3, 5, 6, 7] {
        let inst = &program.instructions[index];
        assert_eq!(
            inst.next_address,
            Some(inst.address.unwrap() + 1),
            "instruction {index}"
        );
    }
    // Block terminators chain to their goto targets
    assert_eq!(program.instructions[2].next_address, Some(0));
    assert_eq!(program.instructions[4].next_address, Some(2));
    assert_eq!(program.instructions[8].next_address, Some(0));

    // Every placed instruction lies inside the store
    for inst in &program.instructions {
        let address = inst.address.unwrap();
        let next = inst.next_address.unwrap();
        assert!((address as usize) < STORE_WORDS);
        assert!((next as usize) < STORE_WORDS);
    }
}

#[test]
fn goto_mbr_encodes_jmpc_and_low_byte() {
    let program = assemble("main = 0x000: PC = PC + 1; rd; goto (MBR OR 0x40)").unwrap();
    let inst = &program.instructions[0];
    assert_eq!(inst.next_address, Some(0x40));
    assert_eq!(
        inst.control,
        control(&[
            CBit::Jmpc,
            CBit::Read,
            CBit::CPc,
            CBit::F0,
            CBit::F1,
            CBit::EnB,
            CBit::Inc,
            CBit::B0
        ])
    );

    let program = assemble("main = 0x000: goto (MBR)").unwrap();
    assert_eq!(program.instructions[0].next_address, Some(0));
}

#[test]
fn shifts_and_multiple_destinations() {
    let program = assemble("main = 0x000: H = OPC = MBR << 8; goto main").unwrap();
    let inst = &program.instructions[0];
    let expected = control(&[CBit::CH, CBit::COpc, CBit::Sll8, CBit::F1, CBit::EnB, CBit::B1]);
    assert_eq!(inst.control, expected);
}

#[test]
fn mixed_pinned_and_floating_pair() {
    let code = "\
start = 0x000: Z = TOS; if (Z) goto yes; else goto no
no = 0x020: H = H; goto start
yes: MDR = 0; goto start";
    let program = assemble(code).unwrap();
    assert_eq!(program.address_of("no"), Some(0x020));
    assert_eq!(program.address_of("yes"), Some(0x120));
}

#[test]
fn pinned_pair_displacement_is_verified() {
    let good = "\
start = 0x000: N = TOS; if (N) goto yes; else goto no
no = 0x010: H = H; goto start
yes = 0x110: MDR = 0; goto start";
    assert!(assemble(good).is_ok());

    let bad = "\
start = 0x000: N = TOS; if (N) goto yes; else goto no
no = 0x010: H = H; goto start
yes = 0x111: MDR = 0; goto start";
    assert!(matches!(
        assemble(bad),
        Err(Error::Allocate(AllocateError::PinnedPairMismatch { .. }))
    ));
}

#[test]
fn orphan_instructions_emit_as_zero_words() {
    let program = assemble("main = 0x000: goto main\nH = H + 1").unwrap();
    assert_eq!(program.instructions[1].address, None);
    assert_eq!(program.instructions[1].next_address, None);

    let words = output::store_words(&program, STORE_WORDS);
    assert!(words[1..].iter().all(|&w| w == 0));
}

#[test]
fn goto_to_an_unknown_label_leaves_a_zero_word() {
    let program = assemble("main = 0x000: goto nowhere").unwrap();
    assert_eq!(program.instructions[0].address, Some(0));
    assert_eq!(program.instructions[0].next_address, None);
    let words = output::store_words(&program, STORE_WORDS);
    assert!(words.iter().all(|&w| w == 0));
}

#[test]
fn block_too_large_for_free_space_is_infeasible() {
    let code = "\
main = 0x000: PC = PC + 1
H = H
goto main
big: H = H
H = H
H = H; goto big";
    assert!(matches!(
        assemble_sized(code, 4, 2),
        Err(Error::Allocate(AllocateError::NoRoom { .. }))
    ));
}

#[test]
fn pair_without_partner_block_is_infeasible() {
    let code = "\
start = 0x000: Z = TOS; if (Z) goto yes; else goto no
no: H = H; goto start";
    assert!(matches!(
        assemble(code),
        Err(Error::Allocate(AllocateError::UnplacedPairTarget(..)))
    ));
}

#[test]
fn text_image_round_trips() {
    let code = "\
start = 0x000: Z = TOS; if (Z) goto isz; else goto nnz
nnz: H = H; goto start
isz: MDR = 0; goto start";
    let program = assemble(code).unwrap();

    let lines = output::text_lines(&program, STORE_WORDS);
    assert_eq!(lines.len(), STORE_WORDS);
    assert!(lines.iter().all(|line| line.len() == 36));

    let parsed: Vec<u64> = lines
        .iter()
        .map(|line| u64::from_str_radix(line, 2).unwrap())
        .collect();
    assert_eq!(parsed, output::store_words(&program, STORE_WORDS));
}

#[test]
fn binary_image_is_exactly_packed() {
    let program = assemble("main = 0x000: halt").unwrap();
    let bytes = word::to_bytes(&output::store_words(&program, STORE_WORDS));
    // 512 words of 36 bits pack to 2304 bytes with no padding
    assert_eq!(bytes.len(), 2304);
    // The halt word sits in the first 36 bits: all zero except control
    // bits 3 and 0, which land in byte 4 as 0b00001001
    assert_eq!(&bytes[..5], &[0, 0, 0, 0, 0x90]);
    assert!(bytes[5..].iter().all(|&b| b == 0));
}

#[test]
fn symbol_map_lists_placed_labels() {
    let code = "\
start = 0x000: Z = TOS; if (Z) goto isz; else goto nnz
nnz: H = H; goto start
isz: MDR = 0; goto start";
    let program = assemble(code).unwrap();
    let map = SymbolMap::generate(&program);
    assert_eq!(map.labels["start"].address, 0);
    assert_eq!(map.labels["nnz"].address, 1);
    assert_eq!(map.labels["isz"].address, 257);
    assert_eq!(map.labels["isz"].instruction, 2);

    let json = map.to_json().unwrap();
    assert!(json.contains("\"nnz\""));
}

#[test]
fn empty_source_assembles_to_an_empty_store() {
    let program = assemble("# nothing here\n").unwrap();
    assert!(program.instructions.is_empty());
    let words = output::store_words(&program, STORE_WORDS);
    assert!(words.iter().all(|&w| w == 0));
}
