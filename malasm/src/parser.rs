use crate::ast::{
    Assign, Cond, Control, Instruction, Label, Memory, Operation, Shift, Source, Stmt, Target,
    WordMem,
};
use crate::error::ParseError;
use crate::token::{Token, TokenKind};
use mic1::{BReg, CReg, STORE_WORDS};

macro_rules! check {
    ($parser:expr, $n:expr, $kind:pat) => {
        matches!($parser.peek_kind($n), Some($kind))
    };
}

macro_rules! expect {
    ($parser:expr, $kind:pat) => {
        $parser.expect_tobe(|kind| matches!(kind, $kind))
    };
}

pub struct Parser {
    tokens: Vec<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens }
    }

    /// Parses the token stream line by line; every line holds at most one
    /// instruction.
    pub fn parse(self) -> Result<Source, ParseError> {
        let mut rows: Vec<Vec<Token>> = Vec::new();
        for token in self.tokens {
            match rows.last_mut() {
                Some(row) if row[0].pos.line == token.pos.line => row.push(token),
                _ => rows.push(vec![token]),
            }
        }

        let mut instructions = Vec::new();
        for row in rows {
            if let Some(instruction) = RowParser::new(row).parse()? {
                instructions.push(instruction);
            }
        }
        Ok(Source { instructions })
    }
}

struct RowParser {
    tokens: Vec<Token>,
    index: usize,
    line: usize,
}

impl RowParser {
    fn new(mut tokens: Vec<Token>) -> Self {
        let line = tokens[0].pos.line;
        tokens.retain(|t| !matches!(t.kind, TokenKind::Comment(_)));
        RowParser {
            tokens,
            index: 0,
            line,
        }
    }

    fn peek_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.index + n).map(|t| &t.kind)
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    fn expect_tobe<F: Fn(&TokenKind) -> bool>(&mut self, cond: F) -> Result<Token, ParseError> {
        match self.tokens.get(self.index) {
            Some(token) if cond(&token.kind) => {
                self.index += 1;
                Ok(self.tokens[self.index - 1].clone())
            }
            Some(token) => Err(ParseError::UnexpectedToken(
                describe(&token.kind),
                self.line + 1,
            )),
            None => Err(ParseError::UnexpectedEol(self.line + 1)),
        }
    }

    fn parse(mut self) -> Result<Option<Instruction>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }
        if let Some(t) = self
            .tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Error(_)))
        {
            let TokenKind::Error(lexeme) = &t.kind else {
                unreachable!()
            };
            return Err(ParseError::InvalidToken(lexeme.clone(), self.line + 1));
        }

        let label = self.parse_label()?;
        let stmt = self.parse_statement()?;
        if let Some(kind) = self.peek_kind(0) {
            return Err(ParseError::UnexpectedToken(describe(kind), self.line + 1));
        }
        Ok(Some(Instruction {
            label,
            stmt,
            line: self.line,
        }))
    }

    // label : NAME ('=' ADDRESS)? ':'
    fn parse_label(&mut self) -> Result<Option<Label>, ParseError> {
        if check!(self, 0, TokenKind::Ident(_)) && check!(self, 1, TokenKind::Colon) {
            let name = self.ident()?;
            self.advance();
            return Ok(Some(Label {
                name,
                address: None,
            }));
        }
        if check!(self, 0, TokenKind::Ident(_))
            && check!(self, 1, TokenKind::Equal)
            && check!(self, 2, TokenKind::Number(..))
            && check!(self, 3, TokenKind::Colon)
        {
            let name = self.ident()?;
            self.advance();
            let address = self.address()?;
            self.advance();
            return Ok(Some(Label {
                name,
                address: Some(address),
            }));
        }
        Ok(None)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind(0) {
            Some(TokenKind::KwEmpty) => {
                self.advance();
                Ok(Stmt::Empty)
            }
            Some(TokenKind::KwHalt) => {
                self.advance();
                Ok(Stmt::Halt)
            }
            Some(TokenKind::KwGoto | TokenKind::KwIf) => Ok(Stmt::Micro {
                assign: None,
                memory: None,
                control: Some(self.parse_control()?),
            }),
            Some(TokenKind::KwRd | TokenKind::KwWr | TokenKind::KwFetch) => {
                let memory = self.parse_memory()?;
                let control = self.parse_control_tail()?;
                Ok(Stmt::Micro {
                    assign: None,
                    memory: Some(memory),
                    control,
                })
            }
            Some(_) => {
                let assign = self.parse_assign()?;
                let memory = self.parse_memory_tail()?;
                let control = self.parse_control_tail()?;
                Ok(Stmt::Micro {
                    assign: Some(assign),
                    memory,
                    control,
                })
            }
            None => Err(ParseError::UnexpectedEol(self.line + 1)),
        }
    }

    // ';' memory, if the separator is followed by a memory keyword
    fn parse_memory_tail(&mut self) -> Result<Option<Memory>, ParseError> {
        if check!(self, 0, TokenKind::Semicolon)
            && check!(
                self,
                1,
                TokenKind::KwRd | TokenKind::KwWr | TokenKind::KwFetch
            )
        {
            self.advance();
            return Ok(Some(self.parse_memory()?));
        }
        Ok(None)
    }

    // ';' control, if the separator is followed by a control keyword
    fn parse_control_tail(&mut self) -> Result<Option<Control>, ParseError> {
        if check!(self, 0, TokenKind::Semicolon)
            && check!(self, 1, TokenKind::KwGoto | TokenKind::KwIf)
        {
            self.advance();
            return Ok(Some(self.parse_control()?));
        }
        Ok(None)
    }

    // memory : ('rd' | 'wr')? ';'? 'fetch'?
    fn parse_memory(&mut self) -> Result<Memory, ParseError> {
        let word = match self.peek_kind(0) {
            Some(TokenKind::KwRd) => {
                self.advance();
                Some(WordMem::Read)
            }
            Some(TokenKind::KwWr) => {
                self.advance();
                Some(WordMem::Write)
            }
            _ => None,
        };
        let mut fetch = false;
        if word.is_some()
            && check!(self, 0, TokenKind::Semicolon)
            && check!(self, 1, TokenKind::KwFetch)
        {
            self.advance();
            self.advance();
            fetch = true;
        } else if check!(self, 0, TokenKind::KwFetch) {
            self.advance();
            fetch = true;
        }
        Ok(Memory { word, fetch })
    }

    fn parse_control(&mut self) -> Result<Control, ParseError> {
        match self.peek_kind(0) {
            Some(TokenKind::KwGoto) => {
                self.advance();
                if check!(self, 0, TokenKind::LParen) {
                    // goto '(' 'MBR' ('OR' ADDRESS)? ')'
                    self.advance();
                    let name = self.ident()?;
                    if name != "MBR" {
                        return Err(ParseError::UnexpectedToken(name, self.line + 1));
                    }
                    let address = if check!(self, 0, TokenKind::KwOr) {
                        self.advance();
                        Some(self.address()?)
                    } else {
                        None
                    };
                    expect!(self, TokenKind::RParen)?;
                    Ok(Control::GotoMbr(address))
                } else {
                    Ok(Control::Goto(self.ident()?))
                }
            }
            Some(TokenKind::KwIf) => {
                self.advance();
                expect!(self, TokenKind::LParen)?;
                let cond = self.cond()?;
                expect!(self, TokenKind::RParen)?;
                expect!(self, TokenKind::KwGoto)?;
                let if_target = self.ident()?;
                expect!(self, TokenKind::Semicolon)?;
                expect!(self, TokenKind::KwElse)?;
                expect!(self, TokenKind::KwGoto)?;
                let else_target = self.ident()?;
                Ok(Control::If {
                    cond,
                    if_target,
                    else_target,
                })
            }
            Some(kind) => Err(ParseError::UnexpectedToken(describe(kind), self.line + 1)),
            None => Err(ParseError::UnexpectedEol(self.line + 1)),
        }
    }

    // assignment : destination '=' (assignment | operation shift?)
    fn parse_assign(&mut self) -> Result<Assign, ParseError> {
        let mut targets = Vec::new();
        while check!(self, 0, TokenKind::Ident(_)) && check!(self, 1, TokenKind::Equal) {
            let name = self.ident()?;
            self.advance();
            targets.push(self.target(&name)?);
        }
        if targets.is_empty() {
            let kind = self.peek_kind(0).ok_or(ParseError::UnexpectedEol(self.line + 1))?;
            return Err(ParseError::UnexpectedToken(describe(kind), self.line + 1));
        }
        let op = self.parse_operation()?;
        let shift = self.parse_shift()?;
        Ok(Assign { targets, op, shift })
    }

    fn parse_shift(&mut self) -> Result<Option<Shift>, ParseError> {
        match self.peek_kind(0) {
            Some(TokenKind::LAngleLAngle) => {
                self.advance();
                expect!(self, TokenKind::Number(_, 8))?;
                Ok(Some(Shift::Sll8))
            }
            Some(TokenKind::RAngleRAngle) => {
                self.advance();
                expect!(self, TokenKind::Number(_, 1))?;
                Ok(Some(Shift::Sra1))
            }
            _ => Ok(None),
        }
    }

    fn parse_operation(&mut self) -> Result<Operation, ParseError> {
        match self.peek_kind(0).cloned() {
            Some(TokenKind::Minus) => {
                self.advance();
                match self.peek_kind(0).cloned() {
                    Some(TokenKind::Ident(name)) if name == "H" => {
                        self.advance();
                        Ok(Operation::ANeg)
                    }
                    Some(TokenKind::Number(_, 1)) => {
                        self.advance();
                        Ok(Operation::NegOne)
                    }
                    _ => self.invalid_operation("-"),
                }
            }
            Some(TokenKind::KwNot) => {
                self.advance();
                let name = self.ident()?;
                if name == "H" {
                    Ok(Operation::NotA)
                } else {
                    Ok(Operation::NotB(self.breg(&name)?))
                }
            }
            Some(TokenKind::Number(lexeme, value)) => {
                self.advance();
                match value {
                    0 => Ok(Operation::Zero),
                    1 => Ok(Operation::One),
                    _ => self.invalid_operation(&lexeme),
                }
            }
            Some(TokenKind::Ident(first)) => {
                self.advance();
                self.parse_operation_rest(first)
            }
            Some(kind) => Err(ParseError::UnexpectedToken(describe(&kind), self.line + 1)),
            None => Err(ParseError::UnexpectedEol(self.line + 1)),
        }
    }

    // The part after a leading register operand.
    fn parse_operation_rest(&mut self, first: String) -> Result<Operation, ParseError> {
        match self.peek_kind(0) {
            Some(TokenKind::KwAnd) => {
                self.advance();
                let second = self.ident()?;
                Ok(Operation::And(self.ab_pair(&first, &second)?))
            }
            Some(TokenKind::KwOr) => {
                self.advance();
                let second = self.ident()?;
                Ok(Operation::Or(self.ab_pair(&first, &second)?))
            }
            Some(TokenKind::Plus) => {
                self.advance();
                if check!(self, 0, TokenKind::Number(_, 1)) {
                    self.advance();
                    return if first == "H" {
                        Ok(Operation::AInc)
                    } else {
                        Ok(Operation::BInc(self.breg(&first)?))
                    };
                }
                let second = self.ident()?;
                let b = self.ab_pair(&first, &second)?;
                if check!(self, 0, TokenKind::Plus) && check!(self, 1, TokenKind::Number(_, 1)) {
                    self.advance();
                    self.advance();
                    Ok(Operation::SumInc(b))
                } else {
                    Ok(Operation::Sum(b))
                }
            }
            Some(TokenKind::Minus) => {
                self.advance();
                if first == "H" {
                    return self.invalid_operation("H -");
                }
                let b = self.breg(&first)?;
                if check!(self, 0, TokenKind::Number(_, 1)) {
                    self.advance();
                    Ok(Operation::BDec(b))
                } else {
                    let second = self.ident()?;
                    if second != "H" {
                        return self.invalid_operation(&format!("{first} - {second}"));
                    }
                    Ok(Operation::BSubA(b))
                }
            }
            _ => {
                if first == "H" {
                    Ok(Operation::A)
                } else {
                    Ok(Operation::B(self.breg(&first)?))
                }
            }
        }
    }

    /// Exactly one side of a two operand expression must be H; returns
    /// the B bus side.
    fn ab_pair(&self, first: &str, second: &str) -> Result<BReg, ParseError> {
        match (first == "H", second == "H") {
            (true, false) => self.breg(second),
            (false, true) => self.breg(first),
            _ => Err(ParseError::InvalidOperation(
                format!("{first}, {second}"),
                self.line + 1,
            )),
        }
    }

    fn invalid_operation(&self, what: &str) -> Result<Operation, ParseError> {
        Err(ParseError::InvalidOperation(
            what.to_string(),
            self.line + 1,
        ))
    }

    fn target(&self, name: &str) -> Result<Target, ParseError> {
        match name {
            "N" => Ok(Target::Flag(Cond::N)),
            "Z" => Ok(Target::Flag(Cond::Z)),
            _ => CReg::parse(name)
                .map(Target::Reg)
                .ok_or_else(|| ParseError::UnknownRegister(name.to_string(), self.line + 1)),
        }
    }

    fn cond(&mut self) -> Result<Cond, ParseError> {
        let name = self.ident()?;
        match name.as_str() {
            "N" => Ok(Cond::N),
            "Z" => Ok(Cond::Z),
            _ => Err(ParseError::UnexpectedToken(name, self.line + 1)),
        }
    }

    fn breg(&self, name: &str) -> Result<BReg, ParseError> {
        BReg::parse(name).ok_or_else(|| ParseError::UnknownRegister(name.to_string(), self.line + 1))
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        let token = expect!(self, TokenKind::Ident(_))?;
        let TokenKind::Ident(name) = token.kind else {
            unreachable!()
        };
        Ok(name)
    }

    fn address(&mut self) -> Result<u16, ParseError> {
        let token = expect!(self, TokenKind::Number(..))?;
        let TokenKind::Number(lexeme, value) = token.kind else {
            unreachable!()
        };
        if !lexeme.starts_with("0x") && !lexeme.starts_with("0X") {
            return Err(ParseError::UnexpectedToken(lexeme, self.line + 1));
        }
        if value as usize >= STORE_WORDS {
            return Err(ParseError::AddressOutOfRange(lexeme, self.line + 1));
        }
        Ok(value)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::LAngleLAngle => "<<".to_string(),
        TokenKind::RAngleRAngle => ">>".to_string(),
        TokenKind::Equal => "=".to_string(),
        TokenKind::Plus => "+".to_string(),
        TokenKind::Minus => "-".to_string(),
        TokenKind::Colon => ":".to_string(),
        TokenKind::Semicolon => ";".to_string(),
        TokenKind::LParen => "(".to_string(),
        TokenKind::RParen => ")".to_string(),
        TokenKind::KwEmpty => "empty".to_string(),
        TokenKind::KwHalt => "halt".to_string(),
        TokenKind::KwGoto => "goto".to_string(),
        TokenKind::KwIf => "if".to_string(),
        TokenKind::KwElse => "else".to_string(),
        TokenKind::KwRd => "rd".to_string(),
        TokenKind::KwWr => "wr".to_string(),
        TokenKind::KwFetch => "fetch".to_string(),
        TokenKind::KwAnd => "AND".to_string(),
        TokenKind::KwOr => "OR".to_string(),
        TokenKind::KwNot => "NOT".to_string(),
        TokenKind::Ident(name) => name.clone(),
        TokenKind::Number(lexeme, _) => lexeme.clone(),
        TokenKind::Comment(_) => "comment".to_string(),
        TokenKind::Error(lexeme) => lexeme.clone(),
    }
}
