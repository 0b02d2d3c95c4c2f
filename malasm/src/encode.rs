//! Statement encoding: a pure mapping from one parsed statement to its 27
//! control bits plus the bookkeeping the translator carries forward.

use crate::ast::{Assign, Cond, Control, Memory, Operation, Shift, Stmt, Target, WordMem};
use mic1::cbit::{B_FIELD, NO_B_SOURCE};
use mic1::CBit;

#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub control: u32,
    pub next_address: Option<u16>,
    pub target_label: Option<String>,
    pub is_halt: bool,
    /// (if target, else target) of a conditional branch.
    pub if_else: Option<(String, String)>,
}

impl Default for Encoded {
    fn default() -> Self {
        Encoded {
            control: NO_B_SOURCE,
            next_address: None,
            target_label: None,
            is_halt: false,
            if_else: None,
        }
    }
}

pub fn encode(stmt: &Stmt) -> Encoded {
    let mut enc = Encoded::default();
    match stmt {
        Stmt::Empty => {}
        Stmt::Halt => enc.is_halt = true,
        Stmt::Micro {
            assign,
            memory,
            control,
        } => {
            if let Some(assign) = assign {
                encode_assign(&mut enc, assign);
            }
            if let Some(memory) = memory {
                encode_memory(&mut enc, memory);
            }
            if let Some(control) = control {
                encode_control(&mut enc, control);
            }
        }
    }
    enc
}

fn encode_assign(enc: &mut Encoded, assign: &Assign) {
    for target in &assign.targets {
        if let Target::Reg(reg) = target {
            enc.control |= reg.enable().mask();
        }
    }

    use CBit::{EnA, EnB, Inc, InvA, F0, F1};
    enc.control |= match assign.op {
        Operation::And(_) => EnA.mask() | EnB.mask(),
        Operation::Or(_) => F1.mask() | EnA.mask() | EnB.mask(),
        Operation::NotA => F1.mask() | EnA.mask() | InvA.mask(),
        Operation::NotB(_) => F0.mask() | EnA.mask() | EnB.mask(),
        Operation::Sum(_) => F0.mask() | F1.mask() | EnA.mask() | EnB.mask(),
        Operation::AInc => F0.mask() | F1.mask() | EnA.mask() | Inc.mask(),
        Operation::BInc(_) => F0.mask() | F1.mask() | EnB.mask() | Inc.mask(),
        Operation::BSubA(_) => {
            F0.mask() | F1.mask() | EnA.mask() | EnB.mask() | InvA.mask() | Inc.mask()
        }
        Operation::ANeg => F0.mask() | F1.mask() | EnA.mask() | InvA.mask() | Inc.mask(),
        Operation::BDec(_) => F0.mask() | F1.mask() | EnB.mask() | InvA.mask(),
        Operation::SumInc(_) => F0.mask() | F1.mask() | EnA.mask() | EnB.mask() | Inc.mask(),
        Operation::A => F1.mask() | EnA.mask(),
        Operation::B(_) => F1.mask() | EnB.mask(),
        Operation::NegOne => F0.mask() | F1.mask() | InvA.mask(),
        Operation::Zero => F1.mask(),
        Operation::One => F0.mask() | F1.mask() | Inc.mask(),
    };

    if let Some(b) = b_source(&assign.op) {
        enc.control = enc.control & !B_FIELD | b.selector();
    }

    match assign.shift {
        Some(Shift::Sll8) => enc.control |= CBit::Sll8.mask(),
        Some(Shift::Sra1) => enc.control |= CBit::Sra1.mask(),
        None => {}
    }
}

fn b_source(op: &Operation) -> Option<mic1::BReg> {
    match op {
        Operation::And(b)
        | Operation::Or(b)
        | Operation::NotB(b)
        | Operation::Sum(b)
        | Operation::BInc(b)
        | Operation::BSubA(b)
        | Operation::BDec(b)
        | Operation::SumInc(b)
        | Operation::B(b) => Some(*b),
        _ => None,
    }
}

fn encode_memory(enc: &mut Encoded, memory: &Memory) {
    match memory.word {
        Some(WordMem::Read) => enc.control |= CBit::Read.mask(),
        Some(WordMem::Write) => enc.control |= CBit::Write.mask(),
        None => {}
    }
    if memory.fetch {
        enc.control |= CBit::Fetch.mask();
    }
}

fn encode_control(enc: &mut Encoded, control: &Control) {
    match control {
        Control::Goto(target) => enc.target_label = Some(target.clone()),
        Control::GotoMbr(address) => {
            enc.control |= CBit::Jmpc.mask();
            enc.next_address = Some(address.unwrap_or(0));
        }
        Control::If {
            cond,
            if_target,
            else_target,
        } => {
            enc.control |= match cond {
                Cond::N => CBit::Jamn.mask(),
                Cond::Z => CBit::Jamz.mask(),
            };
            enc.target_label = Some(else_target.clone());
            enc.if_else = Some((if_target.clone(), else_target.clone()));
        }
    }
}
