use blackjack::Money;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("{0}")]
    Engine(#[from] blackjack::Error),

    #[error("No bettor in seat {0}")]
    UnknownSeat(usize),

    #[error("Insufficient funds in seat {seat}: wager ${wager} exceeds balance ${balance}")]
    InsufficientFunds {
        seat: usize,
        wager: Money,
        balance: Money,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TableError {
    /// Shoe exhaustion is the only failure a game loop cannot re-prompt past.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TableError::Engine(blackjack::Error::ExhaustedShoe))
    }
}
