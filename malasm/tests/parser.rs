use malasm::ast::{Cond, Control, Memory, Operation, Shift, Stmt, Target, WordMem};
use malasm::error::ParseError;
use malasm::lexer::Lexer;
use malasm::parser::Parser;
use mic1::{BReg, CReg};

fn parse(code: &str) -> malasm::ast::Source {
    let tokens = Lexer::new(code).tokenize();
    match Parser::new(tokens).parse() {
        Ok(source) => source,
        Err(e) => panic!("{code:?}: {e}"),
    }
}

fn parse_err(code: &str) -> ParseError {
    let tokens = Lexer::new(code).tokenize();
    Parser::new(tokens).parse().unwrap_err()
}

#[test]
fn labels() {
    let source = parse("main = 0x0A3: halt\nloop: empty\nempty");
    let labels: Vec<_> = source.instructions.iter().map(|i| i.label.clone()).collect();
    assert_eq!(labels[0].as_ref().unwrap().name, "main");
    assert_eq!(labels[0].as_ref().unwrap().address, Some(0x0A3));
    assert_eq!(labels[1].as_ref().unwrap().name, "loop");
    assert_eq!(labels[1].as_ref().unwrap().address, None);
    assert_eq!(labels[2], None);
}

#[test]
fn comments_and_blank_lines_yield_no_instructions() {
    let source = parse("# header\n\nhalt # trailing\n");
    assert_eq!(source.instructions.len(), 1);
    assert_eq!(source.instructions[0].stmt, Stmt::Halt);
    assert_eq!(source.instructions[0].line, 2);
}

#[test]
fn assignment_chain_with_shift() {
    let source = parse("MAR = SP = SP + 1; rd");
    let Stmt::Micro { assign, memory, control } = &source.instructions[0].stmt else {
        panic!("not a micro statement");
    };
    let assign = assign.as_ref().unwrap();
    assert_eq!(
        assign.targets,
        vec![Target::Reg(CReg::MAR), Target::Reg(CReg::SP)]
    );
    assert_eq!(assign.op, Operation::BInc(BReg::SP));
    assert_eq!(assign.shift, None);
    assert_eq!(
        memory,
        &Some(Memory {
            word: Some(WordMem::Read),
            fetch: false
        })
    );
    assert_eq!(control, &None);

    let source = parse("H = MBR << 8");
    let Stmt::Micro { assign, .. } = &source.instructions[0].stmt else {
        panic!("not a micro statement");
    };
    let assign = assign.as_ref().unwrap();
    assert_eq!(assign.op, Operation::B(BReg::MBR));
    assert_eq!(assign.shift, Some(Shift::Sll8));
}

#[test]
fn operations() {
    let cases = [
        ("H = H AND MDR", Operation::And(BReg::MDR)),
        ("H = MDR AND H", Operation::And(BReg::MDR)),
        ("H = H OR SP", Operation::Or(BReg::SP)),
        ("H = NOT H", Operation::NotA),
        ("H = NOT LV", Operation::NotB(BReg::LV)),
        ("H = H + CPP", Operation::Sum(BReg::CPP)),
        ("H = H + 1", Operation::AInc),
        ("H = TOS + 1", Operation::BInc(BReg::TOS)),
        ("H = TOS - H", Operation::BSubA(BReg::TOS)),
        ("H = -H", Operation::ANeg),
        ("H = OPC - 1", Operation::BDec(BReg::OPC)),
        ("H = H + OPC + 1", Operation::SumInc(BReg::OPC)),
        ("H = MBRU + H + 1", Operation::SumInc(BReg::MBRU)),
        ("OPC = H", Operation::A),
        ("OPC = PC", Operation::B(BReg::PC)),
        ("H = -1", Operation::NegOne),
        ("H = 0", Operation::Zero),
        ("H = 1", Operation::One),
    ];
    for (code, expect) in cases {
        let source = parse(code);
        let Stmt::Micro { assign, .. } = &source.instructions[0].stmt else {
            panic!("{code}: not a micro statement");
        };
        assert_eq!(assign.as_ref().unwrap().op, expect, "{code}");
    }
}

#[test]
fn flag_destinations() {
    let source = parse("Z = TOS; if (Z) goto a; else goto b");
    let Stmt::Micro { assign, control, .. } = &source.instructions[0].stmt else {
        panic!("not a micro statement");
    };
    assert_eq!(assign.as_ref().unwrap().targets, vec![Target::Flag(Cond::Z)]);
    assert_eq!(
        control,
        &Some(Control::If {
            cond: Cond::Z,
            if_target: format!("a"),
            else_target: format!("b"),
        })
    );
}

#[test]
fn memory_statements() {
    let source = parse("rd\nwr\nfetch\nrd; fetch\nwr fetch");
    let memories: Vec<_> = source
        .instructions
        .iter()
        .map(|i| match &i.stmt {
            Stmt::Micro { memory, .. } => memory.unwrap(),
            _ => panic!("not a micro statement"),
        })
        .collect();
    assert_eq!(memories[0], Memory { word: Some(WordMem::Read), fetch: false });
    assert_eq!(memories[1], Memory { word: Some(WordMem::Write), fetch: false });
    assert_eq!(memories[2], Memory { word: None, fetch: true });
    assert_eq!(memories[3], Memory { word: Some(WordMem::Read), fetch: true });
    assert_eq!(memories[4], Memory { word: Some(WordMem::Write), fetch: true });
}

#[test]
fn control_statements() {
    let source = parse("goto main\ngoto (MBR)\ngoto (MBR OR 0x100)");
    let controls: Vec<_> = source
        .instructions
        .iter()
        .map(|i| match &i.stmt {
            Stmt::Micro { control, .. } => control.clone().unwrap(),
            _ => panic!("not a micro statement"),
        })
        .collect();
    assert_eq!(controls[0], Control::Goto(format!("main")));
    assert_eq!(controls[1], Control::GotoMbr(None));
    assert_eq!(controls[2], Control::GotoMbr(Some(0x100)));
}

#[test]
fn rejected_lines() {
    assert!(matches!(
        parse_err("H = H & 1"),
        ParseError::InvalidToken(..)
    ));
    assert!(matches!(
        parse_err("H = SP AND LV"),
        ParseError::InvalidOperation(..)
    ));
    assert!(matches!(
        parse_err("H = H - 1"),
        ParseError::InvalidOperation(..)
    ));
    assert!(matches!(
        parse_err("FOO = 1"),
        ParseError::UnknownRegister(..)
    ));
    assert!(matches!(
        parse_err("MBR = 1"),
        ParseError::UnknownRegister(..)
    ));
    assert!(matches!(
        parse_err("x = 0x200: halt"),
        ParseError::AddressOutOfRange(..)
    ));
    assert!(matches!(
        parse_err("goto main extra"),
        ParseError::UnexpectedToken(..)
    ));
    assert!(matches!(parse_err("goto"), ParseError::UnexpectedEol(..)));
    assert!(matches!(
        parse_err("if (Z) goto a"),
        ParseError::UnexpectedEol(..)
    ));
    assert!(matches!(
        parse_err("loop:"),
        ParseError::UnexpectedEol(..)
    ));
}
