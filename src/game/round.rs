use std::time::Duration;

use tokio::io::{AsyncBufRead, Lines};

use crate::utils;

/// Outcome of one guessing round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guess {
    Correct,
    Wrong(String),
    /// An empty line.
    Skipped,
    TimedOut,
}

/// Reads one line from `input` and compares it with `answer`.
///
/// The read is abandoned once `budget` has elapsed. Returns `None` when the
/// input is closed or unreadable.
pub async fn read_guess<R>(input: &mut Lines<R>, answer: &str, budget: Duration) -> Option<Guess>
where
    R: AsyncBufRead + Unpin,
{
    let line = match tokio::time::timeout(budget, input.next_line()).await {
        Err(_) => return Some(Guess::TimedOut),
        Ok(Ok(Some(line))) => line,
        Ok(_) => return None,
    };

    let guess = line.trim();
    if guess.is_empty() {
        Some(Guess::Skipped)
    } else if utils::guess_matches(guess, answer) {
        Some(Guess::Correct)
    } else {
        Some(Guess::Wrong(guess.to_string()))
    }
}
