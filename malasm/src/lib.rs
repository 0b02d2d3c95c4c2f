pub mod allocate;
pub mod ast;
pub mod chunk;
pub mod encode;
pub mod error;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod program;
pub mod symbols;
pub mod token;
pub mod translate;

pub use error::Error;
pub use program::{Instruction, Program};

use mic1::{IF_ELSE_DISPLACEMENT, STORE_WORDS};

/// Assembles MAL source into a fully allocated program for the MIC-1
/// control store.
pub fn assemble(source: &str) -> Result<Program, Error> {
    assemble_sized(source, STORE_WORDS, IF_ELSE_DISPLACEMENT)
}

/// Assembly against an explicit store geometry; the tests use small
/// stores to provoke layout failures.
pub fn assemble_sized(
    source: &str,
    words: usize,
    displacement: u16,
) -> Result<Program, Error> {
    let tokens = lexer::Lexer::new(source).tokenize();
    let tree = parser::Parser::new(tokens).parse()?;
    let mut program = translate::translate(&tree)?;
    allocate::allocate(&mut program, words, displacement)?;
    Ok(program)
}
