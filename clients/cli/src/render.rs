use blackjack::{Action, HandOutcome, Settlement};
use blackjack_table::msg::{PlayerView, TableView};
use blackjack_table::table::hand_label;
use crossterm::style::Stylize;

pub const DIVIDER: &str = "\n*************************************";

/// Stateless text formatter. With color off every method returns plain text.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn green(&self, text: &str) -> String {
        if self.color {
            text.bold().green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        if self.color {
            text.bold().red().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn welcome(&self) -> String {
        self.bold("\nWelcome to Blackjack!\n")
    }

    /// Printed before the first deal and whenever the shoe is rebuilt.
    pub fn shuffle_notice(&self, first: bool, names: &[String], num_decks: u8) -> String {
        let text = if first {
            let greeting = match names {
                [only] => format!("Good Luck, {only}!"),
                _ => "Good Luck, Everyone!".to_string(),
            };
            self.bold(&greeting)
        } else if num_decks == 1 {
            "Re-shuffling Deck".to_string()
        } else {
            format!("Re-shuffling {num_decks} deck shoe.")
        };
        format!("\n{text}\n")
    }

    /// Every bettor's hands, then the dealer's, one card per line.
    pub fn table(&self, view: &TableView) -> String {
        let mut out = String::from(DIVIDER);
        out.push('\n');
        for player in view.bettors.iter().chain(std::iter::once(&view.dealer)) {
            self.player(&mut out, player);
        }
        out
    }

    fn player(&self, out: &mut String, player: &PlayerView) {
        for hand in &player.hands {
            let info = hand
                .annotation
                .as_deref()
                .map(|a| format!(" ({a})"))
                .unwrap_or_default();
            let header = format!("{} {}: {}{}", hand.label, player.verb, hand.value, info);
            out.push_str(&self.bold(&header));
            out.push('\n');
            for card in &hand.cards {
                out.push_str(card);
                out.push('\n');
            }
            out.push('\n');
        }
    }

    pub fn action_question(&self, label: &str, legal: &[Action]) -> (String, String) {
        let mut keys = vec!["stay", "hit"];
        let mut values = vec!["s", "h"];
        if legal.contains(&Action::DoubleDown) {
            keys.push("double down");
            values.push("d");
        }
        if legal.contains(&Action::Split) {
            keys.push("split");
            values.push("split");
        }
        let suggestions = values.join("/");
        (
            format!("{label}, would you like to {}? ({suggestions}): ", keys.join(", ")),
            suggestions,
        )
    }

    pub fn double_banner(&self, label: &str, wager: &str) -> String {
        let text = format!("{label} has doubled down. New wager: ${wager}");
        let border = "*".repeat(text.len() + 6);
        format!("\n{border}\n*  {text}  *\n{border}")
    }

    /// One line per settled hand followed by the bettor's balance.
    pub fn settlement(&self, ledger: &Settlement) -> String {
        let mut out = String::new();
        if ledger.dealer_blackjack {
            out.push_str(DIVIDER);
            out.push('\n');
            out.push_str("Sorry! Dealer had Blackjack.\n\n");
        }

        for entry in &ledger.entries {
            let label = hand_label(&entry.name, entry.hand_index, entry.hand_count);
            let line = match entry.outcome {
                HandOutcome::Blackjack => {
                    self.green(&format!("{label} got Blackjack! Won ${}", entry.delta))
                }
                HandOutcome::Push => self.bold(&format!("{label} pushed")),
                HandOutcome::Win => self.green(&format!("{label} won ${}", entry.delta)),
                HandOutcome::Loss => self.red(&format!("{label} lost ${}", entry.delta.abs())),
            };
            out.push_str(&line);
            out.push('\n');
            out.push_str(&format!("{}'s Balance: ${}\n\n", entry.name, entry.balance));
        }

        out.push_str(DIVIDER);
        out
    }

    pub fn goodbye(&self, name: &str) -> String {
        self.bold(&format!("\nGoodbye, {name}. Thanks for playing!"))
    }
}
