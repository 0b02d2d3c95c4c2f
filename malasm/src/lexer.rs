use crate::token::{Pos, Token, TokenKind};
use std::iter::Peekable;
use std::str::CharIndices;

pub struct Lexer<'a> {
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self { code }
    }

    pub fn tokenize(self) -> Vec<Token> {
        let mut tokens = Vec::new();
        for (line, text) in self.code.lines().enumerate() {
            tokens.extend(LineLexer::new(text, line).tokenize());
        }
        tokens
    }
}

pub struct LineLexer<'a> {
    iter: Peekable<CharIndices<'a>>,
    line: usize,
}

impl<'a> LineLexer<'a> {
    pub fn new(text: &'a str, line: usize) -> Self {
        Self {
            iter: text.char_indices().peekable(),
            line,
        }
    }

    fn peek_nth(&self, n: usize) -> Option<(usize, char)> {
        self.iter.clone().nth(n)
    }

    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some((idx, ch0)) = self.peek_nth(0) {
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            let pos = Pos {
                line: self.line,
                col: idx,
            };

            // Comment runs to the end of the line
            if ch0 == '#' {
                self.consume();
                let comment = self.iter.map(|(_, ch)| ch).collect::<String>();
                tokens.push(Token::new(TokenKind::Comment(comment), pos));
                break;
            }

            if let Some((_, ch1)) = self.peek_nth(1) {
                if let Some(kind) = double_char_token(ch0, ch1) {
                    self.consume();
                    self.consume();
                    tokens.push(Token::new(kind, pos));
                    continue;
                }
            }

            if let Some(kind) = single_char_token(ch0) {
                self.consume();
                tokens.push(Token::new(kind, pos));
                continue;
            }

            if ch0.is_ascii_digit() {
                tokens.push(Token::new(self.number(), pos));
                continue;
            }

            if ch0.is_ascii_alphabetic() || ch0 == '_' {
                tokens.push(Token::new(self.word(), pos));
                continue;
            }

            self.consume();
            tokens.push(Token::new(TokenKind::Error(format!("{ch0}")), pos));
        }
        tokens
    }

    fn word(&mut self) -> TokenKind {
        let mut lexeme = String::new();
        while let Some((_, ch)) = self
            .iter
            .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9' | 'a'..='z' | 'A'..='Z'))
        {
            lexeme.push(ch);
        }
        match keyword(&lexeme) {
            Some(kind) => kind,
            None => TokenKind::Ident(lexeme),
        }
    }

    fn number(&mut self) -> TokenKind {
        let (_, ch0) = self.consume().unwrap();
        if ch0 == '0' {
            if let Some(&(_, ch1)) = self.iter.peek() {
                if ch1 == 'x' || ch1 == 'X' {
                    self.consume();
                    return self.number_hex(ch0, ch1);
                }
            }
        }
        self.number_dec(ch0)
    }

    fn number_hex(&mut self, ch0: char, ch1: char) -> TokenKind {
        let mut lexeme = String::from_iter([ch0, ch1]);
        while let Some((_, ch)) = self
            .iter
            .next_if(|(_, ch)| matches!(ch, '0'..='9' | 'a'..='f' | 'A'..='F'))
        {
            lexeme.push(ch);
        }
        match u16::from_str_radix(&lexeme[2..], 16) {
            Ok(num) => TokenKind::Number(lexeme, num),
            Err(_) => TokenKind::Error(lexeme),
        }
    }

    fn number_dec(&mut self, ch0: char) -> TokenKind {
        let mut lexeme = String::from(ch0);
        while let Some((_, ch)) = self.iter.next_if(|(_, ch)| ch.is_ascii_digit()) {
            lexeme.push(ch);
        }
        match lexeme.parse::<u16>() {
            Ok(num) => TokenKind::Number(lexeme, num),
            Err(_) => TokenKind::Error(lexeme),
        }
    }
}

fn double_char_token(ch0: char, ch1: char) -> Option<TokenKind> {
    match (ch0, ch1) {
        ('<', '<') => Some(TokenKind::LAngleLAngle),
        ('>', '>') => Some(TokenKind::RAngleRAngle),
        _ => None,
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        '=' => Some(TokenKind::Equal),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        ':' => Some(TokenKind::Colon),
        ';' => Some(TokenKind::Semicolon),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        _ => None,
    }
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "empty" => Some(TokenKind::KwEmpty),
        "halt" => Some(TokenKind::KwHalt),
        "goto" => Some(TokenKind::KwGoto),
        "if" => Some(TokenKind::KwIf),
        "else" => Some(TokenKind::KwElse),
        "rd" => Some(TokenKind::KwRd),
        "wr" => Some(TokenKind::KwWr),
        "fetch" => Some(TokenKind::KwFetch),
        "AND" => Some(TokenKind::KwAnd),
        "OR" => Some(TokenKind::KwOr),
        "NOT" => Some(TokenKind::KwNot),
        _ => None,
    }
}
