use blackjack::{Action, GamePhase, Money, Turn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    // Roster, only between rounds
    Join { name: String, buy_in: Money },
    Leave { seat: usize },
    Rebuy { seat: usize, amount: Money },
    // One wager per seat, in seat order
    Deal { wagers: Vec<Money> },
    Insurance { seat: usize, accept: bool },
    // Actions on the hand whose turn it is
    Hit {},
    Stay {},
    DoubleDown {},
    Split {},
    // Clears the settled round and reopens betting
    NextRound {},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Table {},
    Settlement {},
    Config {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandView {
    /// `"Alice"`, or `"Alice (Hand 2)"` once the bettor has split.
    pub label: String,
    pub cards: Vec<String>,
    /// Final total, or every candidate total joined with `" or "`.
    pub value: String,
    pub annotation: Option<String>,
    pub wager: Money,
    pub insurance: bool,
    pub doubled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// `None` for the dealer.
    pub seat: Option<usize>,
    pub name: String,
    /// `"showing"` while the dealer's hole card is down, otherwise `"has"`.
    pub verb: String,
    pub balance: Option<Money>,
    pub hands: Vec<HandView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub phase: GamePhase,
    pub round: u32,
    pub num_decks: u8,
    pub cards_remaining: usize,
    pub bettors: Vec<PlayerView>,
    pub dealer: PlayerView,
    pub turn: Option<Turn>,
    pub legal_actions: Vec<Action>,
    pub insurance_pending: Vec<usize>,
}
