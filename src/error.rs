use std::io;
use thiserror::Error;

/// Everything that can go wrong while reading a formula.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no 'p cnf <vars> <clauses>' problem line found")]
    MissingHeader,

    #[error("line {line}: malformed problem line '{text}'")]
    InvalidHeader { line: usize, text: String },

    #[error("line {line}: clause data before the problem line")]
    ClauseBeforeHeader { line: usize },

    #[error("line {line}: '{token}' is not a literal")]
    InvalidLiteral { line: usize, token: String },

    #[error("line {line}: literal {lit} refers to a variable outside 1..={num_vars}")]
    VariableOutOfRange { line: usize, lit: i64, num_vars: usize },
}

pub type Result<T> = ::std::result::Result<T, Error>;
