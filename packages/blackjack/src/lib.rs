mod card;
mod error;
mod game_state;
mod hand;
mod money;
pub mod rules;
mod settlement;
mod shoe;

pub use card::{Card, Rank, Suit};
pub use error::{Error, Result};
pub use game_state::{
    Action, ActionOutcome, GamePhase, GameState, Player, Role, RoundStart, Turn,
};
pub use hand::{can_split_cards, hand_values, is_busted, is_soft_hand, Hand, HandOutcome};
pub use money::Money;
pub use rules::PayoutRatio;
pub use settlement::{settle_hand, HandSettlement, Settlement, SettlementEntry};
pub use shoe::{Shoe, CARDS_PER_DECK};
