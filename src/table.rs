use blackjack::{
    Action, ActionOutcome, GamePhase, GameState, Hand, Money, Player, Settlement, Shoe, Turn,
};

use crate::error::TableError;
use crate::msg::{ExecuteMsg, HandView, PlayerView, QueryMsg, TableView};
use crate::response::{Event, Response};
use crate::state::TableConfig;

/// A single blackjack table: one dealer, up to five seats, one shoe.
#[derive(Debug, Clone)]
pub struct Table {
    config: TableConfig,
    game: GameState,
}

impl Table {
    pub fn new(config: TableConfig) -> Result<Self, TableError> {
        let shoe = config.build_shoe()?;
        log::info!(
            "Opened table with a {} deck shoe{}",
            config.num_decks,
            if config.seed.is_some() { " (seeded)" } else { "" }
        );
        Ok(Self {
            config,
            game: GameState::new(shoe),
        })
    }

    /// Table over a prepared shoe, e.g. one built with `Shoe::stacked`.
    pub fn with_shoe(shoe: Shoe) -> Self {
        let config = TableConfig {
            num_decks: shoe.num_decks(),
            seed: None,
        };
        Self {
            config,
            game: GameState::new(shoe),
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Dispatches a message to its handler. A rejected message leaves the
    /// table unchanged.
    pub fn execute(&mut self, msg: ExecuteMsg) -> Result<Response, TableError> {
        let game = &mut self.game;
        match msg {
            ExecuteMsg::Join { name, buy_in } => execute_join(game, name, buy_in),
            ExecuteMsg::Leave { seat } => execute_leave(game, seat),
            ExecuteMsg::Rebuy { seat, amount } => execute_rebuy(game, seat, amount),
            ExecuteMsg::Deal { wagers } => execute_deal(game, wagers),
            ExecuteMsg::Insurance { seat, accept } => execute_insurance(game, seat, accept),
            ExecuteMsg::Hit {} => execute_action(game, Action::Hit),
            ExecuteMsg::Stay {} => execute_action(game, Action::Stay),
            ExecuteMsg::DoubleDown {} => execute_action(game, Action::DoubleDown),
            ExecuteMsg::Split {} => execute_action(game, Action::Split),
            ExecuteMsg::NextRound {} => execute_next_round(game),
        }
    }

    /// JSON-encoded answer to a query.
    pub fn query(&self, msg: QueryMsg) -> Result<String, TableError> {
        let json = match msg {
            QueryMsg::Table {} => serde_json::to_string(&self.query_table())?,
            QueryMsg::Settlement {} => serde_json::to_string(&self.query_settlement())?,
            QueryMsg::Config {} => serde_json::to_string(&self.query_config())?,
        };
        Ok(json)
    }

    pub fn query_config(&self) -> TableConfig {
        self.config
    }

    pub fn query_settlement(&self) -> Option<Settlement> {
        self.game.settlement().cloned()
    }

    pub fn query_table(&self) -> TableView {
        let game = &self.game;
        let bettors = game
            .bettors()
            .iter()
            .enumerate()
            .map(|(seat, player)| player_view(Some(seat), player))
            .collect();

        TableView {
            phase: game.phase(),
            round: game.rounds_dealt(),
            num_decks: game.shoe().num_decks(),
            cards_remaining: game.shoe().remaining(),
            bettors,
            dealer: player_view(None, game.dealer()),
            turn: game.current_turn(),
            legal_actions: game.legal_actions(),
            insurance_pending: game.insurance_pending().to_vec(),
        }
    }
}

fn player_view(seat: Option<usize>, player: &Player) -> PlayerView {
    let hidden = player.hands.iter().any(Hand::has_hidden);
    let verb = if player.is_dealer() && hidden { "showing" } else { "has" };
    let count = player.hands.len();

    let hands = player
        .hands
        .iter()
        .enumerate()
        .map(|(i, hand)| HandView {
            label: hand_label(&player.name, i, count),
            cards: hand.cards.iter().map(|c| c.to_display()).collect(),
            value: hand.display_value(false),
            annotation: hand.annotation().map(str::to_string),
            wager: hand.wager,
            insurance: hand.insurance,
            doubled: hand.doubled,
        })
        .collect();

    PlayerView {
        seat,
        name: player.name.clone(),
        verb: verb.to_string(),
        balance: player.balance(),
        hands,
    }
}

pub fn hand_label(name: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{name} (Hand {})", index + 1)
    } else {
        name.to_string()
    }
}

fn seat_player(game: &GameState, seat: usize) -> Result<&Player, TableError> {
    game.bettor(seat).ok_or(TableError::UnknownSeat(seat))
}

pub fn execute_join(
    game: &mut GameState,
    name: String,
    buy_in: Money,
) -> Result<Response, TableError> {
    let seat = game.add_bettor(name.clone(), buy_in)?;

    Ok(Response::new().add_event(
        Event::new("join")
            .add_attribute("seat", seat)
            .add_attribute("name", name)
            .add_attribute("balance", buy_in),
    ))
}

pub fn execute_leave(game: &mut GameState, seat: usize) -> Result<Response, TableError> {
    seat_player(game, seat)?;
    let player = game.remove_bettor(seat)?;

    Ok(Response::new().add_event(
        Event::new("leave")
            .add_attribute("seat", seat)
            .add_attribute("name", &player.name)
            .add_attribute("balance", player.balance().unwrap_or_default()),
    ))
}

pub fn execute_rebuy(
    game: &mut GameState,
    seat: usize,
    amount: Money,
) -> Result<Response, TableError> {
    let name = seat_player(game, seat)?.name.clone();
    game.rebuy(seat, amount)?;

    Ok(Response::new().add_event(
        Event::new("rebuy")
            .add_attribute("seat", seat)
            .add_attribute("name", name)
            .add_attribute("balance", amount),
    ))
}

/// Validates every wager against its seat's balance, then deals.
pub fn execute_deal(game: &mut GameState, wagers: Vec<Money>) -> Result<Response, TableError> {
    if game.phase() == GamePhase::Betting {
        for (seat, &wager) in wagers.iter().enumerate() {
            let balance = seat_player(game, seat)?.balance().unwrap_or_default();
            if wager > balance {
                return Err(TableError::InsufficientFunds {
                    seat,
                    wager,
                    balance,
                });
            }
        }
    }

    let start = game.start_round(&wagers)?;
    let mut res = Response::new();
    if start.reshuffled {
        res = res.add_event(
            Event::new("reshuffle").add_attribute("num_decks", game.shoe().num_decks()),
        );
    }
    res = res.add_event(
        Event::new("deal")
            .add_attribute("round", start.round)
            .add_attribute("first_shoe", start.first_shoe)
            .add_attribute("bettors", wagers.len()),
    );
    if game.phase() == GamePhase::Insurance {
        let seats: Vec<String> = game.insurance_pending().iter().map(|s| s.to_string()).collect();
        res = res.add_event(Event::new("insurance_offered").add_attribute("seats", seats.join(",")));
    }

    Ok(res.add_events(round_end_events(game)))
}

pub fn execute_insurance(
    game: &mut GameState,
    seat: usize,
    accept: bool,
) -> Result<Response, TableError> {
    seat_player(game, seat)?;
    game.decide_insurance(seat, accept)?;

    let res = Response::new().add_event(
        Event::new("insurance")
            .add_attribute("seat", seat)
            .add_attribute("accept", accept),
    );
    Ok(res.add_events(round_end_events(game)))
}

pub fn execute_action(game: &mut GameState, action: Action) -> Result<Response, TableError> {
    let turn = game.current_turn();
    let outcome = game.act(action)?;
    let Turn { seat, hand_index } = turn.unwrap_or(Turn {
        seat: 0,
        hand_index: 0,
    });

    let event = match outcome {
        ActionOutcome::Hit { card, busted } => Event::new("hit")
            .add_attribute("card", card.to_display())
            .add_attribute("busted", busted),
        ActionOutcome::Stayed { value } => Event::new("stay").add_attribute("value", value),
        ActionOutcome::Doubled {
            card,
            wager,
            value,
            busted,
        } => Event::new("double_down")
            .add_attribute("card", card.to_display())
            .add_attribute("wager", wager)
            .add_attribute("value", value)
            .add_attribute("busted", busted),
        ActionOutcome::Split { hands } => Event::new("split").add_attribute("hands", hands),
    };
    let event = event
        .add_attribute("seat", seat)
        .add_attribute("hand", hand_index);

    Ok(Response::new()
        .add_event(event)
        .add_events(round_end_events(game)))
}

pub fn execute_next_round(game: &mut GameState) -> Result<Response, TableError> {
    let cards = game.cards_in_play();
    game.reset_round()?;

    Ok(Response::new().add_event(
        Event::new("next_round")
            .add_attribute("discarded", cards)
            .add_attribute("cards_remaining", game.shoe().remaining()),
    ))
}

/// Dealer result and one settlement line per hand, once the round is over.
fn round_end_events(game: &GameState) -> Vec<Event> {
    let (Some(ledger), GamePhase::Settled) = (game.settlement(), game.phase()) else {
        return Vec::new();
    };

    match serde_json::to_string(ledger) {
        Ok(json) => log::debug!("settlement {json}"),
        Err(e) => log::warn!("could not encode settlement: {e}"),
    }

    let mut events = Vec::new();
    if ledger.dealer_blackjack {
        events.push(Event::new("dealer_blackjack"));
    }
    if let Some(hand) = game.dealer_hand() {
        events.push(
            Event::new("dealer")
                .add_attribute("value", hand.display_value(true))
                .add_attribute("busted", hand.busted),
        );
    }
    for entry in &ledger.entries {
        events.push(
            Event::new("settle")
                .add_attribute("seat", entry.seat)
                .add_attribute("name", hand_label(&entry.name, entry.hand_index, entry.hand_count))
                .add_attribute("outcome", format!("{:?}", entry.outcome))
                .add_attribute("wager", entry.wager)
                .add_attribute("insurance", entry.insurance)
                .add_attribute("delta", entry.delta)
                .add_attribute("balance", entry.balance),
        );
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack::{Card, Rank, Suit};

    fn stacked(ranks: &[Rank]) -> Table {
        let cards: Vec<Card> = ranks.iter().map(|&r| Card::new(r, Suit::Spades)).collect();
        Table::with_shoe(Shoe::stacked(8, &cards).unwrap())
    }

    #[test]
    fn test_hand_label() {
        assert_eq!(hand_label("Alice", 0, 1), "Alice");
        assert_eq!(hand_label("Alice", 1, 2), "Alice (Hand 2)");
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let err = Table::new(TableConfig {
            num_decks: 12,
            seed: None,
        })
        .unwrap_err();
        assert!(matches!(err, TableError::Engine(blackjack::Error::Configuration(_))));
    }

    #[test]
    fn test_deal_rejects_wager_over_balance() {
        let mut table = stacked(&[]);
        table
            .execute(ExecuteMsg::Join {
                name: "Alice".to_string(),
                buy_in: Money::from_dollars(20),
            })
            .unwrap();

        let err = table
            .execute(ExecuteMsg::Deal {
                wagers: vec![Money::from_dollars(21)],
            })
            .unwrap_err();
        assert!(matches!(err, TableError::InsufficientFunds { seat: 0, .. }));
        assert_eq!(table.game().phase(), GamePhase::Betting);
    }

    #[test]
    fn test_unknown_seat() {
        let mut table = stacked(&[]);
        let err = table.execute(ExecuteMsg::Leave { seat: 2 }).unwrap_err();
        assert!(matches!(err, TableError::UnknownSeat(2)));
    }

    #[test]
    fn test_dealer_view_verb() {
        let mut table = stacked(&[Rank::Ten, Rank::Nine, Rank::Ten, Rank::Seven]);
        table
            .execute(ExecuteMsg::Join {
                name: "Alice".to_string(),
                buy_in: Money::from_dollars(50),
            })
            .unwrap();
        table
            .execute(ExecuteMsg::Deal {
                wagers: vec![Money::from_dollars(10)],
            })
            .unwrap();

        let view = table.query_table();
        assert_eq!(view.dealer.verb, "showing");
        assert_eq!(view.dealer.hands[0].cards[0], "**");
        assert_eq!(view.dealer.hands[0].value, "7");
        assert_eq!(view.bettors[0].verb, "has");
        assert_eq!(view.bettors[0].hands[0].value, "19");

        table.execute(ExecuteMsg::Stay {}).unwrap();
        let view = table.query_table();
        assert_eq!(view.dealer.verb, "has");
        assert_eq!(view.dealer.hands[0].cards[0], "Ten of Spades");
        assert_eq!(view.dealer.hands[0].value, "17");
    }
}
