use std::path::PathBuf;
use thiserror::Error;

/// Error type for loading variable definition files.
#[derive(Error, Debug)]
pub enum ParseVariablesError {
    #[error("variable definition lexing error")]
    LexerError { offset: usize, row: u32, col: usize },
    #[error("the file was not found during resolution")]
    IOError(PathBuf, std::io::Error),
}
