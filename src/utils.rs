use std::time::Duration;

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Value of the `Authorization` header for client-credential requests.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", credentials)
}

/// Absolute expiry of a token issued at `now` with a lifetime of `expires_in`
/// seconds. `None` for a negative or unrepresentable lifetime.
pub fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    if expires_in < 0 {
        return None;
    }
    TimeDelta::try_seconds(expires_in).and_then(|lifetime| now.checked_add_signed(lifetime))
}

/// Wait after the failed refresh attempt `attempt` (1-based): `2^attempt` units.
pub fn refresh_backoff(attempt: u32, unit: Duration) -> Duration {
    unit.saturating_mul(2u32.saturating_pow(attempt))
}

/// Wait before retrying a failed API call: `base * (attempt + 1)`.
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt.saturating_add(1))
}

/// Time allowed for guessing round `round` (1-based): `unit * round`.
pub fn guess_budget(round: u32, unit: Duration) -> Duration {
    unit.saturating_mul(round.max(1))
}

/// `m:ss` rendering of a track length.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// The string the player has to guess, also used as the catalog search query.
pub fn format_guess(track_name: &str, artist_name: &str) -> String {
    format!("{} - {}", track_name, artist_name)
}

/// Loose comparison of a guess with the drawn track name.
pub fn guess_matches(guess: &str, answer: &str) -> bool {
    fn normalize(s: &str) -> String {
        s.chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    let guess = normalize(guess);
    !guess.is_empty() && guess == normalize(answer)
}
