use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid phase: expected {expected}, round is in {actual}")]
    InvalidPhase {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Shoe exhausted: no cards left to draw")]
    ExhaustedShoe,
}

pub type Result<T> = std::result::Result<T, Error>;
