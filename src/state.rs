use blackjack::rules::{MAX_DECKS, MIN_DECKS};
use blackjack::Shoe;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub num_decks: u8,
    /// Fixed shuffle seed; `None` draws entropy from the OS.
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            num_decks: MIN_DECKS,
            seed: None,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), TableError> {
        if !(MIN_DECKS..=MAX_DECKS).contains(&self.num_decks) {
            return Err(blackjack::Error::Configuration(format!(
                "Number of decks must be between {MIN_DECKS} and {MAX_DECKS}, got {}",
                self.num_decks
            ))
            .into());
        }
        Ok(())
    }

    pub fn build_shoe(&self) -> Result<Shoe, TableError> {
        self.validate()?;
        let shoe = match self.seed {
            Some(seed) => Shoe::with_seed(self.num_decks, seed)?,
            None => Shoe::new(self.num_decks)?,
        };
        Ok(shoe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_deck_count_out_of_range() {
        for num_decks in [0, 9] {
            let config = TableConfig {
                num_decks,
                seed: None,
            };
            assert!(matches!(
                config.validate(),
                Err(TableError::Engine(blackjack::Error::Configuration(_)))
            ));
        }
    }

    #[test]
    fn test_seeded_shoes_match() {
        let config = TableConfig {
            num_decks: 2,
            seed: Some(9),
        };
        let mut a = config.build_shoe().unwrap();
        let mut b = config.build_shoe().unwrap();
        assert_eq!(a.remaining(), 104);
        assert_eq!(a.draw().unwrap(), b.draw().unwrap());
    }
}
