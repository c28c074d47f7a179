#[cfg(test)]
use std::collections::VecDeque;
use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

pub const YES: &[&str] = &["y", "yes", "Y", "Yes"];
pub const NO: &[&str] = &["n", "no", "N", "No"];
pub const HIT: &[&str] = &["h", "hit", "H", "Hit"];
pub const STAY: &[&str] = &["s", "stay", "S", "Stay"];
pub const DOUBLE_DOWN: &[&str] = &["d", "double", "double down", "D", "Double", "Double Down"];
pub const SPLIT: &[&str] = &["split", "Split"];

/// Source of answers to the game's questions.
///
/// Implementors supply raw lines; validation and re-prompting are shared.
pub trait InputProvider {
    /// Asks `question` and returns the answer without its line ending.
    fn line(&mut self, question: &str) -> Result<String>;

    /// Reports a rejected answer before the question is asked again.
    fn invalid(&mut self, message: &str);

    fn integer_in_range(&mut self, question: &str, min: i64, max: i64) -> Result<i64> {
        loop {
            let answer = self.line(question)?;
            match answer.trim().parse::<i64>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(n),
                _ => self.invalid(&format!(
                    "Invalid input. Expected an integer between {min}-{max}"
                )),
            }
        }
    }

    /// Re-asks until the answer is one of the aliases in `options`, and
    /// returns the value paired with the matching alias list.
    fn choice<T: Copy>(
        &mut self,
        question: &str,
        options: &[(&[&str], T)],
        suggestions: &str,
    ) -> Result<T> {
        loop {
            let answer = self.line(question)?;
            if let Some((_, value)) = options.iter().find(|(aliases, _)| aliases.contains(&answer.as_str())) {
                return Ok(*value);
            }
            self.invalid(&format!(
                "Invalid input. Expected one of the following: ({suggestions})"
            ));
        }
    }

    fn yes_no(&mut self, question: &str) -> Result<bool> {
        self.choice(question, &[(YES, true), (NO, false)], "y/n")
    }
}

/// Reads answers from a buffered reader, echoing questions to a writer.
pub struct TerminalInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> InputProvider for TerminalInput<R, W> {
    fn line(&mut self, question: &str) -> Result<String> {
        write!(self.writer, "{question}").context("failed to write prompt")?;
        self.writer.flush().context("failed to flush prompt")?;

        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .context("failed to read from stdin")?;
        if read == 0 {
            bail!("input closed");
        }
        Ok(buf.trim_end_matches(['\r', '\n']).to_string())
    }

    fn invalid(&mut self, message: &str) {
        if let Err(e) = writeln!(self.writer, "{message}") {
            log::warn!("failed to write message: {e}");
        }
    }
}

/// Canned answers, consumed in order. Running out is an error.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
    pub rejections: Vec<String>,
}

#[cfg(test)]
impl ScriptedInput {
    pub fn new<S: ToString>(answers: &[S]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[cfg(test)]
impl InputProvider for ScriptedInput {
    fn line(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .with_context(|| format!("no scripted answer for {question:?}"))
    }

    fn invalid(&mut self, message: &str) {
        self.rejections.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_reprompts_until_in_range() {
        let mut input = ScriptedInput::new(&["six", "0", "9", "3"]);
        assert_eq!(input.integer_in_range("Decks?: ", 1, 8).unwrap(), 3);
        assert_eq!(input.rejections.len(), 3);
        assert_eq!(
            input.rejections[0],
            "Invalid input. Expected an integer between 1-8"
        );
        assert_eq!(input.questions.len(), 4);
    }

    #[test]
    fn test_choice_accepts_aliases() {
        let options: &[(&[&str], u8)] = &[(HIT, 1), (STAY, 2), (DOUBLE_DOWN, 3)];
        let mut input = ScriptedInput::new(&["x", "double down", "Hit", "S"]);
        assert_eq!(input.choice("?", options, "s/h/d").unwrap(), 3);
        assert_eq!(input.choice("?", options, "s/h/d").unwrap(), 1);
        assert_eq!(input.choice("?", options, "s/h/d").unwrap(), 2);
        assert_eq!(
            input.rejections,
            vec!["Invalid input. Expected one of the following: (s/h/d)"]
        );
    }

    #[test]
    fn test_choice_is_case_sensitive_beyond_aliases() {
        let mut input = ScriptedInput::new(&["YES", "yes"]);
        assert!(input.yes_no("Again?: ").unwrap());
        assert_eq!(input.rejections.len(), 1);
    }

    #[test]
    fn test_scripted_input_runs_dry() {
        let mut input = ScriptedInput::new::<&str>(&[]);
        assert!(input.yes_no("Again?: ").is_err());
    }

    #[test]
    fn test_terminal_input_reads_lines() {
        let reader = std::io::Cursor::new("Alice\r\n42\n");
        let mut out = Vec::new();
        let mut input = TerminalInput::new(reader, &mut out);
        assert_eq!(input.line("Name?: ").unwrap(), "Alice");
        assert_eq!(input.integer_in_range("Buy in?: ", 1, 500).unwrap(), 42);
        assert!(input.line("More?: ").is_err());
        drop(input);
        assert_eq!(String::from_utf8(out).unwrap(), "Name?: Buy in?: More?: ");
    }
}
