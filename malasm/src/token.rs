#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos) -> Self {
        Token { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Double character tokens
    LAngleLAngle, // '<<'
    RAngleRAngle, // '>>'

    // Single character tokens
    Equal,     // '='
    Plus,      // '+'
    Minus,     // '-'
    Colon,     // ':'
    Semicolon, // ';'
    LParen,    // '('
    RParen,    // ')'

    // Keywords
    KwEmpty, // "empty"
    KwHalt,  // "halt"
    KwGoto,  // "goto"
    KwIf,    // "if"
    KwElse,  // "else"
    KwRd,    // "rd"
    KwWr,    // "wr"
    KwFetch, // "fetch"
    KwAnd,   // "AND"
    KwOr,    // "OR"
    KwNot,   // "NOT"

    // Identifier (register names, labels, conditions)
    Ident(String),

    // Literal with its lexeme; addresses keep their 0x prefix
    Number(String, u16),

    // Special
    Comment(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}
