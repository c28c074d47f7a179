use std::io::Write;

use anyhow::{Context, Result};
use blackjack::rules::{MAX_BUY_IN, MAX_DECKS, MAX_PLAYERS, MIN_BUY_IN, MIN_DECKS, MIN_PLAYERS, MIN_WAGER};
use blackjack::{Action, GamePhase, Money};
use blackjack_table::msg::ExecuteMsg;
use blackjack_table::{Response, Table, TableConfig, TableError};

use crate::prompt::{InputProvider, DOUBLE_DOWN, HIT, SPLIT, STAY};
use crate::render::Style;

/// Setup answers already known from flags or the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Setup {
    pub players: Option<usize>,
    pub decks: Option<u8>,
    pub seed: Option<u64>,
}

/// Runs the whole session: seating, rounds, and play-again, until every
/// bettor has left.
pub fn run<I: InputProvider, W: Write>(
    input: &mut I,
    out: &mut W,
    style: Style,
    setup: Setup,
) -> Result<()> {
    writeln!(out, "{}", style.welcome())?;

    let players = match setup.players {
        Some(n) => n,
        None => input.integer_in_range(
            &format!("How many people will be playing? ({MIN_PLAYERS}-{MAX_PLAYERS}): "),
            MIN_PLAYERS as i64,
            MAX_PLAYERS as i64,
        )? as usize,
    };

    let mut seats = Vec::with_capacity(players);
    for i in 0..players {
        let name = input.line(&format!("What is the name of Player {}?: ", i + 1))?;
        let buy_in = ask_buy_in(input, &name)?;
        seats.push((name, buy_in));
    }

    let num_decks = match setup.decks {
        Some(n) => n,
        None => input.integer_in_range(
            "How many decks would you like to play with?: ",
            i64::from(MIN_DECKS),
            i64::from(MAX_DECKS),
        )? as u8,
    };

    let mut table = Table::new(TableConfig {
        num_decks,
        seed: setup.seed,
    })?;
    for (name, buy_in) in seats {
        table.execute(ExecuteMsg::Join { name, buy_in })?;
    }

    while !table.game().bettors().is_empty() {
        play_round(&mut table, input, out, style)?;
        play_again(&mut table, input, out, style)?;
    }
    Ok(())
}

fn ask_buy_in<I: InputProvider>(input: &mut I, name: &str) -> Result<Money> {
    let amount = input.integer_in_range(
        &format!("{name}, how much would you like to buy in for? ({MAX_BUY_IN} max): "),
        MIN_BUY_IN,
        MAX_BUY_IN,
    )?;
    Ok(Money::from_dollars(amount))
}

/// Sends a message the loop believes is legal. Anything but an exhausted
/// shoe is reported and skipped.
fn send<W: Write>(table: &mut Table, out: &mut W, msg: ExecuteMsg) -> Result<Option<Response>> {
    match table.execute(msg) {
        Ok(res) => Ok(Some(res)),
        Err(e) if e.is_fatal() => Err(e).context("cannot continue the game"),
        Err(e) => {
            log::warn!("rejected: {e}");
            writeln!(out, "{e}")?;
            Ok(None)
        }
    }
}

fn play_round<I: InputProvider, W: Write>(
    table: &mut Table,
    input: &mut I,
    out: &mut W,
    style: Style,
) -> Result<()> {
    let game = table.game();
    let names: Vec<String> = game.bettors().iter().map(|p| p.name.clone()).collect();
    if game.rounds_dealt() == 0 || game.shoe().needs_reshuffle() {
        let notice = style.shuffle_notice(game.rounds_dealt() == 0, &names, game.shoe().num_decks());
        writeln!(out, "{notice}")?;
    }

    let mut wagers = Vec::with_capacity(names.len());
    for player in game.bettors() {
        let balance = player.balance().unwrap_or_default();
        let amount = input.integer_in_range(
            &format!(
                "{}, how much would you like to wager? (Balance ${balance}): ",
                player.name
            ),
            MIN_WAGER,
            balance.whole_dollars(),
        )?;
        wagers.push(Money::from_dollars(amount));
    }

    if send(table, out, ExecuteMsg::Deal { wagers })?.is_none() {
        return Ok(());
    }
    writeln!(out, "{}", style.table(&table.query_table()))?;

    while table.game().phase() == GamePhase::Insurance {
        let game = table.game();
        let Some(&seat) = game.insurance_pending().first() else {
            break;
        };
        let accept = if game.can_insure(seat) {
            let name = &game.bettors()[seat].name;
            input.yes_no(&format!("{name}, would you like insurance? (y/n): "))?
        } else {
            false
        };
        send(table, out, ExecuteMsg::Insurance { seat, accept })?;
    }

    while table.game().phase() == GamePhase::PlayerTurn {
        let view = table.query_table();
        let Some(turn) = view.turn else {
            break;
        };
        let label = view.bettors[turn.seat].hands[turn.hand_index].label.clone();
        let (question, suggestions) = style.action_question(&label, &view.legal_actions);

        let mut options: Vec<(&[&str], Action)> = vec![(HIT, Action::Hit), (STAY, Action::Stay)];
        if view.legal_actions.contains(&Action::DoubleDown) {
            options.push((DOUBLE_DOWN, Action::DoubleDown));
        }
        if view.legal_actions.contains(&Action::Split) {
            options.push((SPLIT, Action::Split));
        }

        let msg = match input.choice(&question, &options, &suggestions)? {
            Action::Hit => ExecuteMsg::Hit {},
            Action::Stay => ExecuteMsg::Stay {},
            Action::DoubleDown => ExecuteMsg::DoubleDown {},
            Action::Split => ExecuteMsg::Split {},
        };
        let Some(res) = send(table, out, msg)? else {
            continue;
        };
        if let Some(wager) = res.events_of("double_down").find_map(|e| e.attr("wager")) {
            writeln!(out, "{}", style.double_banner(&label, wager))?;
        }
        writeln!(out, "{}", style.table(&table.query_table()))?;
    }

    if let Some(ledger) = table.query_settlement() {
        writeln!(out, "{}", style.settlement(&ledger))?;
    }
    send(table, out, ExecuteMsg::NextRound {})?;
    Ok(())
}

/// Asks each bettor whether to stay seated; a broke bettor may rebuy.
fn play_again<I: InputProvider, W: Write>(
    table: &mut Table,
    input: &mut I,
    out: &mut W,
    style: Style,
) -> Result<()> {
    let mut seat = 0;
    while let Some(player) = table.game().bettor(seat) {
        let name = player.name.clone();
        let broke = player.balance().unwrap_or_default() < Money::from_dollars(MIN_WAGER);

        let mut stays = input.yes_no(&format!("{name}, would you like to play again? (y/n): "))?;
        if stays && broke {
            stays = input.yes_no(&format!(
                "{name}, your balance is $0. Would you like to buy in for more money? (y/n): "
            ))?;
            if stays {
                let amount = ask_buy_in(input, &name)?;
                stays = send(table, out, ExecuteMsg::Rebuy { seat, amount })?.is_some();
            }
        }

        if stays {
            seat += 1;
        } else {
            match table.execute(ExecuteMsg::Leave { seat }) {
                Ok(_) => writeln!(out, "{}", style.goodbye(&name))?,
                Err(TableError::UnknownSeat(_)) => break,
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedInput;

    const PLAIN: Style = Style { color: false };

    fn play(answers: &[&str], setup: Setup) -> (String, ScriptedInput) {
        let mut input = ScriptedInput::new(answers);
        let mut out = Vec::new();
        run(&mut input, &mut out, PLAIN, setup).unwrap();
        (String::from_utf8(out).unwrap(), input)
    }

    #[test]
    fn test_single_round_then_leave() {
        let setup = Setup {
            players: None,
            decks: None,
            seed: Some(5),
        };
        let (text, input) = play(
            &["1", "Kyle", "100", "2", "10", "n", "s", "s", "s", "s", "s", "n"],
            setup,
        );
        assert!(text.contains("Welcome to Blackjack!"));
        assert!(text.contains("Good Luck, Kyle!"));
        assert!(text.contains("Kyle's Balance: $"));
        assert!(text.ends_with("Goodbye, Kyle. Thanks for playing!\n"));
        assert_eq!(input.questions[0], "How many people will be playing? (1-5): ");
        assert_eq!(
            input.questions[2],
            "Kyle, how much would you like to buy in for? (500 max): "
        );
        assert_eq!(
            input.questions[4],
            "Kyle, how much would you like to wager? (Balance $100): "
        );
    }

    #[test]
    fn test_flags_skip_setup_questions() {
        let setup = Setup {
            players: Some(2),
            decks: Some(4),
            seed: Some(17),
        };
        let answers = ["Ann", "50", "Bob", "60", "5", "5", "n", "n", "s", "s", "s", "s", "n", "n"];
        let (text, input) = play(&answers, setup);
        assert_eq!(input.questions[0], "What is the name of Player 1?: ");
        assert!(text.contains("Good Luck, Everyone!"));
        assert!(text.contains("Goodbye, Ann."));
        assert!(text.contains("Goodbye, Bob."));
    }

    #[test]
    fn test_invalid_setup_answers_are_reprompted() {
        let setup = Setup {
            players: Some(1),
            decks: None,
            seed: Some(3),
        };
        let (_, input) = play(
            &["Kyle", "600", "100", "0", "1", "5", "n", "s", "s", "s", "s", "s", "n"],
            setup,
        );
        assert_eq!(
            input.rejections[0],
            "Invalid input. Expected an integer between 1-500"
        );
        assert_eq!(
            input.rejections[1],
            "Invalid input. Expected an integer between 1-8"
        );
    }
}
