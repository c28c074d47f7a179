use crate::error::{Error, Result};
use crate::rules::{
    PayoutRatio, BLACKJACK, DEALER_STAND_TOTAL, MAX_BUY_IN, MAX_HANDS_PER_BETTOR, MAX_PLAYERS, MIN_BUY_IN,
    MIN_PLAYERS, MIN_WAGER,
};
use crate::settlement::{settle_hand, Settlement, SettlementEntry};
use crate::{Card, Hand, Money, Rank, Shoe};
use serde::{Deserialize, Serialize};

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Betting,
    Insurance,
    PlayerTurn,
    DealerTurn,
    Settled,
}

impl GamePhase {
    pub fn name(&self) -> &'static str {
        match self {
            GamePhase::Betting => "Betting",
            GamePhase::Insurance => "Insurance",
            GamePhase::PlayerTurn => "PlayerTurn",
            GamePhase::DealerTurn => "DealerTurn",
            GamePhase::Settled => "Settled",
        }
    }
}

/// The two kinds of seat at the table. Only gamblers carry a balance and
/// take part in the action loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Dealer,
    Gambler { balance: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub role: Role,
    pub hands: Vec<Hand>,
}

impl Player {
    pub fn dealer() -> Self {
        Self {
            name: "Dealer".to_string(),
            role: Role::Dealer,
            hands: Vec::new(),
        }
    }

    pub fn gambler(name: impl Into<String>, balance: Money) -> Self {
        Self {
            name: name.into(),
            role: Role::Gambler { balance },
            hands: Vec::new(),
        }
    }

    pub fn is_dealer(&self) -> bool {
        self.role == Role::Dealer
    }

    pub fn balance(&self) -> Option<Money> {
        match self.role {
            Role::Gambler { balance } => Some(balance),
            Role::Dealer => None,
        }
    }

    fn credit(&mut self, delta: Money) -> Money {
        match &mut self.role {
            Role::Gambler { balance } => {
                *balance += delta;
                *balance
            }
            Role::Dealer => Money::ZERO,
        }
    }

    /// Worst-case loss of every hand on the table, insurance included.
    pub fn exposure(&self) -> Money {
        self.hands.iter().map(hand_exposure).sum()
    }
}

fn hand_exposure(hand: &Hand) -> Money {
    let insurance = if hand.insurance {
        PayoutRatio::INSURANCE.calculate_payout(hand.wager)
    } else {
        Money::ZERO
    };
    hand.wager + insurance
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stay,
    DoubleDown,
    Split,
}

/// What an accepted action did to the active hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Hit { card: Card, busted: bool },
    Stayed { value: u8 },
    Doubled { card: Card, wager: Money, value: u8, busted: bool },
    Split { hands: usize },
}

/// Seat and hand index of the hand currently being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub seat: usize,
    pub hand_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStart {
    /// 1-based count of rounds dealt from this table.
    pub round: u32,
    pub reshuffled: bool,
    /// Set on the table's very first deal.
    pub first_shoe: bool,
}

/// Round engine for one dealer and up to five bettors sharing a shoe.
///
/// Every operation either applies completely or returns an error without
/// touching state; the surrounding loop re-prompts on `InvalidAction`.
#[derive(Debug, Clone)]
pub struct GameState {
    bettors: Vec<Player>,
    dealer: Player,
    shoe: Shoe,
    phase: GamePhase,
    turn: Option<Turn>,
    insurance_pending: Vec<usize>,
    settlement: Option<Settlement>,
    rounds_dealt: u32,
}

impl GameState {
    pub fn new(shoe: Shoe) -> Self {
        Self {
            bettors: Vec::new(),
            dealer: Player::dealer(),
            shoe,
            phase: GamePhase::Betting,
            turn: None,
            insurance_pending: Vec::new(),
            settlement: None,
            rounds_dealt: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn bettors(&self) -> &[Player] {
        &self.bettors
    }

    pub fn bettor(&self, seat: usize) -> Option<&Player> {
        self.bettors.get(seat)
    }

    pub fn dealer(&self) -> &Player {
        &self.dealer
    }

    pub fn dealer_hand(&self) -> Option<&Hand> {
        self.dealer.hands.first()
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn current_turn(&self) -> Option<Turn> {
        self.turn
    }

    pub fn current_hand(&self) -> Option<&Hand> {
        let turn = self.turn?;
        self.bettors.get(turn.seat)?.hands.get(turn.hand_index)
    }

    pub fn insurance_pending(&self) -> &[usize] {
        &self.insurance_pending
    }

    /// Ledger of the last settled round, kept until the next deal.
    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    pub fn rounds_dealt(&self) -> u32 {
        self.rounds_dealt
    }

    pub fn cards_in_play(&self) -> usize {
        self.bettors
            .iter()
            .chain(std::iter::once(&self.dealer))
            .flat_map(|p| p.hands.iter())
            .map(|h| h.cards.len())
            .sum()
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::InvalidPhase {
                expected: expected.name(),
                actual: self.phase.name(),
            });
        }
        Ok(())
    }

    fn seat(&self, seat: usize) -> Result<&Player> {
        self.bettors
            .get(seat)
            .ok_or_else(|| Error::InvalidAction(format!("No bettor in seat {seat}")))
    }

    fn check_buy_in(amount: Money) -> Result<()> {
        let min = Money::from_dollars(MIN_BUY_IN);
        let max = Money::from_dollars(MAX_BUY_IN);
        if !amount.is_whole() || amount < min || amount > max {
            return Err(Error::Configuration(format!(
                "Buy-in must be a whole amount between ${min} and ${max}, got ${amount}"
            )));
        }
        Ok(())
    }

    // ── Roster ──

    pub fn add_bettor(&mut self, name: impl Into<String>, buy_in: Money) -> Result<usize> {
        self.expect_phase(GamePhase::Betting)?;
        if self.bettors.len() >= MAX_PLAYERS {
            return Err(Error::Configuration(format!(
                "Number of players must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
            )));
        }
        Self::check_buy_in(buy_in)?;

        let player = Player::gambler(name, buy_in);
        log::info!("{} buys in for ${}", player.name, buy_in);
        self.bettors.push(player);
        Ok(self.bettors.len() - 1)
    }

    /// Removes a bettor between rounds. Later seats shift down by one.
    pub fn remove_bettor(&mut self, seat: usize) -> Result<Player> {
        self.expect_phase(GamePhase::Betting)?;
        self.seat(seat)?;
        let player = self.bettors.remove(seat);
        log::info!("{} leaves the table with ${}", player.name, player.balance().unwrap_or_default());
        Ok(player)
    }

    /// Buys back in once the balance can no longer cover the minimum wager.
    /// The new buy-in replaces whatever change was left.
    pub fn rebuy(&mut self, seat: usize, amount: Money) -> Result<()> {
        self.expect_phase(GamePhase::Betting)?;
        let balance = self.seat(seat)?.balance().unwrap_or_default();
        if balance >= Money::from_dollars(MIN_WAGER) {
            return Err(Error::InvalidAction(format!(
                "Rebuy is only available at a $0 balance (balance ${balance})"
            )));
        }
        Self::check_buy_in(amount)?;

        let player = &mut self.bettors[seat];
        player.role = Role::Gambler { balance: amount };
        log::info!("{} rebuys for ${}", player.name, amount);
        Ok(())
    }

    // ── Deal ──

    /// Starts a round with one whole-dollar wager per bettor, in seat order.
    pub fn start_round(&mut self, wagers: &[Money]) -> Result<RoundStart> {
        self.expect_phase(GamePhase::Betting)?;
        if self.bettors.len() < MIN_PLAYERS {
            return Err(Error::Configuration(format!(
                "Number of players must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
            )));
        }
        if wagers.len() != self.bettors.len() {
            return Err(Error::InvalidAction(format!(
                "Expected {} wagers, got {}",
                self.bettors.len(),
                wagers.len()
            )));
        }
        for (player, &wager) in self.bettors.iter().zip(wagers) {
            let balance = player.balance().unwrap_or_default();
            let max = Money::from_dollars(balance.whole_dollars());
            if !wager.is_whole() || wager < Money::from_dollars(MIN_WAGER) || wager > max {
                return Err(Error::InvalidAction(format!(
                    "{} must wager a whole amount between ${MIN_WAGER} and ${max}, got ${wager}",
                    player.name
                )));
            }
        }

        let reshuffled = self.shoe.needs_reshuffle();
        if reshuffled {
            self.shoe.rebuild()?;
        }

        self.settlement = None;
        self.rounds_dealt += 1;
        log::info!(
            "Dealing round {} ({} cards left in shoe)",
            self.rounds_dealt,
            self.shoe.remaining()
        );

        for (player, &wager) in self.bettors.iter_mut().zip(wagers) {
            let mut hand = Hand::with_wager(wager);
            hand.deal(self.shoe.draw()?);
            hand.deal(self.shoe.draw()?);
            player.hands = vec![hand];
        }

        let mut dealer_hand = Hand::new();
        let mut hole = self.shoe.draw()?;
        hole.hidden = true;
        dealer_hand.deal(hole);
        dealer_hand.deal(self.shoe.draw()?);
        self.dealer.hands = vec![dealer_hand];

        for player in &mut self.bettors {
            for hand in &mut player.hands {
                hand.evaluate(false);
                if hand.blackjack {
                    log::info!("{} is dealt blackjack", player.name);
                }
            }
        }

        let start = RoundStart {
            round: self.rounds_dealt,
            reshuffled,
            first_shoe: self.rounds_dealt == 1,
        };

        if self.dealer_shows_ace() {
            self.insurance_pending = (0..self.bettors.len()).collect();
            self.phase = GamePhase::Insurance;
            log::debug!("Dealer shows an Ace, offering insurance to seats {:?}", self.insurance_pending);
        } else {
            self.peek_dealer()?;
        }

        Ok(start)
    }

    fn dealer_shows_ace(&self) -> bool {
        self.dealer_hand()
            .and_then(|h| h.cards.get(1))
            .is_some_and(|c| c.rank == Rank::Ace)
    }

    // ── Insurance ──

    pub fn can_insure(&self, seat: usize) -> bool {
        if self.phase != GamePhase::Insurance || !self.insurance_pending.contains(&seat) {
            return false;
        }
        let Some(player) = self.bettors.get(seat) else {
            return false;
        };
        let Some(hand) = player.hands.first() else {
            return false;
        };
        let stake = PayoutRatio::INSURANCE.calculate_payout(hand.wager);
        player.exposure() + stake <= player.balance().unwrap_or_default()
    }

    /// Records one bettor's answer to the insurance offer. The dealer peeks
    /// once every offered seat has answered.
    pub fn decide_insurance(&mut self, seat: usize, accept: bool) -> Result<()> {
        self.expect_phase(GamePhase::Insurance)?;
        let Some(pos) = self.insurance_pending.iter().position(|&s| s == seat) else {
            return Err(Error::InvalidAction(format!(
                "Insurance is not on offer for seat {seat}"
            )));
        };
        if accept && !self.can_insure(seat) {
            return Err(Error::InvalidAction(
                "Insufficient balance to cover insurance".to_string(),
            ));
        }

        self.insurance_pending.remove(pos);
        let player = &mut self.bettors[seat];
        if accept {
            player.hands[0].insurance = true;
            log::info!("{} takes insurance", player.name);
        }

        if self.insurance_pending.is_empty() {
            self.peek_dealer()?;
        }
        Ok(())
    }

    /// Checks the dealer's two cards for blackjack and either short-circuits
    /// to settlement or hands the action to the first bettor.
    fn peek_dealer(&mut self) -> Result<()> {
        let dealer_blackjack = match self.dealer.hands.first_mut() {
            Some(hand) => {
                hand.evaluate(true);
                hand.first_action = false;
                hand.blackjack
            }
            None => false,
        };

        if dealer_blackjack {
            log::info!("Dealer has blackjack");
            for player in &mut self.bettors {
                for hand in &mut player.hands {
                    if hand.final_value.is_none() {
                        hand.final_value = Some(hand.best_value());
                    }
                }
            }
            return self.finish_round();
        }

        self.phase = GamePhase::PlayerTurn;
        self.turn = None;
        self.advance_from(Turn {
            seat: 0,
            hand_index: 0,
        })
    }

    // ── Player actions ──

    pub fn can_double(&self, turn: Turn) -> bool {
        let Some(player) = self.bettors.get(turn.seat) else {
            return false;
        };
        let Some(hand) = player.hands.get(turn.hand_index) else {
            return false;
        };
        if !hand.first_action || hand.is_resolved() {
            return false;
        }
        // Insurance is settled on the final wager, so it doubles too.
        let extra = hand_exposure(hand);
        player.exposure() + extra <= player.balance().unwrap_or_default()
    }

    pub fn can_split(&self, turn: Turn) -> bool {
        let Some(player) = self.bettors.get(turn.seat) else {
            return false;
        };
        let Some(hand) = player.hands.get(turn.hand_index) else {
            return false;
        };
        hand.first_action
            && !hand.is_resolved()
            && hand.can_split()
            && player.hands.len() < MAX_HANDS_PER_BETTOR
            && player.exposure() + hand.wager <= player.balance().unwrap_or_default()
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        let Some(turn) = self.turn.filter(|_| self.phase == GamePhase::PlayerTurn) else {
            return Vec::new();
        };
        let mut actions = vec![Action::Hit, Action::Stay];
        if self.can_double(turn) {
            actions.push(Action::DoubleDown);
        }
        if self.can_split(turn) {
            actions.push(Action::Split);
        }
        actions
    }

    /// Applies an action to the active hand and moves play forward. When the
    /// last bettor hand resolves, the dealer plays and the round settles.
    pub fn act(&mut self, action: Action) -> Result<ActionOutcome> {
        self.expect_phase(GamePhase::PlayerTurn)?;
        let turn = self
            .turn
            .ok_or_else(|| Error::InvalidAction("No hand is waiting to act".to_string()))?;

        let outcome = match action {
            Action::Hit => self.hit(turn)?,
            Action::Stay => self.stay(turn),
            Action::DoubleDown => {
                if !self.can_double(turn) {
                    return Err(Error::InvalidAction(
                        "Double down needs a first action and a balance covering the doubled stake"
                            .to_string(),
                    ));
                }
                self.double_down(turn)?
            }
            Action::Split => {
                if !self.can_split(turn) {
                    return Err(Error::InvalidAction(
                        "Split needs two cards of the same rank on the first action and enough balance"
                            .to_string(),
                    ));
                }
                self.split(turn)?
            }
        };

        self.advance_from(turn)?;
        Ok(outcome)
    }

    fn active_hand_mut(&mut self, turn: Turn) -> &mut Hand {
        &mut self.bettors[turn.seat].hands[turn.hand_index]
    }

    fn hit(&mut self, turn: Turn) -> Result<ActionOutcome> {
        let card = self.shoe.draw()?;
        let hand = self.active_hand_mut(turn);
        hand.deal(card);
        hand.first_action = false;
        let busted = hand.check_busted();
        log::debug!("Seat {} hand {} hits: {}", turn.seat, turn.hand_index, card.to_display());
        Ok(ActionOutcome::Hit { card, busted })
    }

    fn stay(&mut self, turn: Turn) -> ActionOutcome {
        let hand = self.active_hand_mut(turn);
        hand.first_action = false;
        hand.stay();
        let value = hand.final_value.unwrap_or_default();
        log::debug!("Seat {} hand {} stays on {value}", turn.seat, turn.hand_index);
        ActionOutcome::Stayed { value }
    }

    fn double_down(&mut self, turn: Turn) -> Result<ActionOutcome> {
        let card = self.shoe.draw()?;
        let hand = self.active_hand_mut(turn);
        hand.doubled = true;
        hand.wager = hand.wager * 2;
        hand.deal(card);
        hand.first_action = false;
        hand.final_value = Some(hand.best_value());
        let busted = hand.check_busted();
        let wager = hand.wager;
        let value = hand.final_value.unwrap_or_default();
        log::info!("Seat {} hand {} doubles down to ${wager}", turn.seat, turn.hand_index);
        Ok(ActionOutcome::Doubled {
            card,
            wager,
            value,
            busted,
        })
    }

    /// Replaces the active hand with two one-card hands, in place, and deals
    /// each a second card. Only the first child keeps the insurance bet.
    fn split(&mut self, turn: Turn) -> Result<ActionOutcome> {
        let first_card = self.shoe.draw()?;
        let second_card = self.shoe.draw()?;

        let player = &mut self.bettors[turn.seat];
        let original = player.hands.remove(turn.hand_index);

        let mut left = Hand::with_wager(original.wager);
        left.insurance = original.insurance;
        left.deal(original.cards[0]);
        left.deal(first_card);

        let mut right = Hand::with_wager(original.wager);
        right.deal(original.cards[1]);
        right.deal(second_card);

        for (offset, mut hand) in [left, right].into_iter().enumerate() {
            hand.evaluate(false);
            player.hands.insert(turn.hand_index + offset, hand);
        }

        log::info!("{} splits into {} hands", player.name, player.hands.len());
        Ok(ActionOutcome::Split {
            hands: player.hands.len(),
        })
    }

    /// Moves the turn to the first unresolved hand at or after `from`.
    fn advance_from(&mut self, from: Turn) -> Result<()> {
        let next = self
            .bettors
            .iter()
            .enumerate()
            .skip(from.seat)
            .flat_map(|(seat, player)| {
                let start = if seat == from.seat { from.hand_index } else { 0 };
                player
                    .hands
                    .iter()
                    .enumerate()
                    .skip(start)
                    .map(move |(hand_index, hand)| (Turn { seat, hand_index }, hand))
            })
            .find(|(_, hand)| !hand.is_resolved())
            .map(|(turn, _)| turn);

        self.turn = next;
        if next.is_none() {
            self.finish_round()?;
        }
        Ok(())
    }

    // ── Dealer and adjudication ──

    fn finish_round(&mut self) -> Result<()> {
        self.phase = GamePhase::DealerTurn;
        self.turn = None;
        self.insurance_pending.clear();
        self.play_dealer()?;
        self.determine_outcomes();
        self.settle();
        self.phase = GamePhase::Settled;
        Ok(())
    }

    /// Draws for the dealer until it reaches a hard 17 or a soft 18 or more.
    fn play_dealer(&mut self) -> Result<()> {
        let Some(hand) = self.dealer.hands.first_mut() else {
            return Ok(());
        };
        hand.reveal();

        loop {
            let best = hand.best_value();
            let stand_on = if hand.is_soft() {
                DEALER_STAND_TOTAL + 1
            } else {
                DEALER_STAND_TOTAL
            };

            if best >= stand_on {
                hand.final_value = Some(best);
                hand.busted = best > BLACKJACK;
                log::info!("Dealer stands on {best}{}", if hand.busted { " (busted)" } else { "" });
                return Ok(());
            }

            let card = self.shoe.draw()?;
            log::debug!("Dealer draws {} on {best}", card.to_display());
            hand.deal(card);
        }
    }

    fn determine_outcomes(&mut self) {
        let Some(dealer) = self.dealer.hands.first() else {
            return;
        };
        let dealer_blackjack = dealer.blackjack;
        let dealer_busted = dealer.busted;
        let dealer_value = dealer.final_value.unwrap_or_default();

        for hand in self.bettors.iter_mut().flat_map(|p| p.hands.iter_mut()) {
            if hand.busted {
                continue;
            }
            if hand.blackjack {
                hand.push = dealer_blackjack;
                continue;
            }
            let value = hand.final_value.unwrap_or_else(|| hand.best_value());
            if dealer_busted || value > dealer_value {
                hand.win = true;
            } else if value == dealer_value {
                hand.push = true;
            }
        }
    }

    fn settle(&mut self) {
        let dealer_blackjack = self.dealer_hand().is_some_and(|h| h.blackjack);
        let mut ledger = Settlement {
            dealer_blackjack,
            entries: Vec::new(),
        };

        for (seat, player) in self.bettors.iter_mut().enumerate() {
            let hand_count = player.hands.len();
            for hand_index in 0..hand_count {
                let hand = &player.hands[hand_index];
                let wager = hand.wager;
                let result = settle_hand(hand, dealer_blackjack);
                let balance = player.credit(result.delta);
                log::info!(
                    "{} hand {}: {:?}, delta ${}, balance ${}",
                    player.name,
                    hand_index + 1,
                    result.outcome,
                    result.delta,
                    balance
                );
                ledger.entries.push(SettlementEntry {
                    seat,
                    name: player.name.clone(),
                    hand_index,
                    hand_count,
                    outcome: result.outcome,
                    wager,
                    insurance: result.insurance,
                    delta: result.delta,
                    balance,
                });
            }
        }

        self.settlement = Some(ledger);
    }

    /// Clears every hand and reopens betting. Cards leave play as discards.
    pub fn reset_round(&mut self) -> Result<()> {
        self.expect_phase(GamePhase::Settled)?;
        let in_play = self.cards_in_play();
        self.shoe.discard(in_play);
        for player in self.bettors.iter_mut().chain(std::iter::once(&mut self.dealer)) {
            player.hands.clear();
        }
        self.turn = None;
        self.phase = GamePhase::Betting;
        Ok(())
    }
}
