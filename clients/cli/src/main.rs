mod game;
mod prompt;
mod render;

use std::io::{self, BufWriter};

use anyhow::{bail, Result};
use blackjack::rules::{MAX_DECKS, MAX_PLAYERS, MIN_DECKS, MIN_PLAYERS};
use clap::Parser;

use crate::game::Setup;
use crate::prompt::TerminalInput;
use crate::render::Style;

#[derive(Parser)]
#[command(name = "blackjack", about = "Command line casino blackjack for one to five players")]
struct Cli {
    /// Number of decks in the shoe (1-8); asked for when omitted
    #[arg(long, env = "BLACKJACK_DECKS")]
    decks: Option<u8>,

    /// Number of players at the table (1-5); asked for when omitted
    #[arg(long, env = "BLACKJACK_PLAYERS")]
    players: Option<usize>,

    /// Seed for a reproducible shoe
    #[arg(long, env = "BLACKJACK_SEED")]
    seed: Option<u64>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    /// Log filter, e.g. "debug" or "blackjack=info"
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn setup(&self) -> Result<Setup> {
        if let Some(decks) = self.decks {
            if !(MIN_DECKS..=MAX_DECKS).contains(&decks) {
                bail!(blackjack::Error::Configuration(format!(
                    "Number of decks must be between {MIN_DECKS} and {MAX_DECKS}, got {decks}"
                )));
            }
        }
        if let Some(players) = self.players {
            if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
                bail!(blackjack::Error::Configuration(format!(
                    "Number of players must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {players}"
                )));
            }
        }
        Ok(Setup {
            players: self.players,
            decks: self.decks,
            seed: self.seed,
        })
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .target(env_logger::Target::Stderr)
        .init();

    let setup = cli.setup()?;
    let style = Style {
        color: !cli.no_color,
    };
    log::info!("Starting blackjack ({setup:?})");

    let stdin = io::stdin();
    let mut input = TerminalInput::new(stdin.lock(), io::stdout());
    let mut out = BufWriter::new(io::stdout());
    let result = game::run(&mut input, &mut LineFlush(&mut out), style, setup);
    if let Err(e) = &result {
        log::error!("Game aborted: {e:#}");
    }
    result
}

/// Flushes after every write so output interleaves with prompts.
struct LineFlush<'a, W: io::Write>(&'a mut W);

impl<W: io::Write> io::Write for LineFlush<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.0.write(buf)?;
        self.0.flush()?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["blackjack", "--decks", "6", "--players", "2", "--seed", "42", "--no-color"]);
        let setup = cli.setup().unwrap();
        assert_eq!(setup.decks, Some(6));
        assert_eq!(setup.players, Some(2));
        assert_eq!(setup.seed, Some(42));
        assert!(cli.no_color);
    }

    #[test]
    fn test_cli_rejects_out_of_range() {
        let cli = Cli::parse_from(["blackjack", "--decks", "9"]);
        assert!(cli.setup().is_err());
        let cli = Cli::parse_from(["blackjack", "--players", "6"]);
        assert!(cli.setup().is_err());
    }
}
