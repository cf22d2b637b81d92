use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    catalog::CatalogClient,
    game::{self, Guess},
    info,
    spotify::auth::TokenRefresher,
    success, utils, warning,
};

/// Time for the first guess; every further round adds the same again.
const GUESS_BUDGET_UNIT: Duration = Duration::from_secs(10);

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub async fn play(guesses: u32) {
    let conn = super::connect().await;

    // the catalog proxy lives on the local server
    if let Ok(refresher) = TokenRefresher::from_env() {
        super::spawn_server(super::server_state(refresher));
    }

    let pb = spinner("Drawing a track from your playlists...");
    let drawn = game::draw_random_track(&conn.client).await;
    pb.finish_and_clear();
    let drawn = match drawn {
        Ok(d) => d,
        Err(e) => super::fail(e),
    };

    let pb = spinner("Looking for a preview...");
    let preview = CatalogClient::from_env().find_preview(&drawn.answer()).await;
    pb.finish_and_clear();
    let preview = match preview {
        Ok(p) => p,
        Err(e) => super::fail(e),
    };

    info!("Track drawn from \"{}\"", drawn.playlist);
    info!("Listen: {}", preview);

    let rounds = guesses.max(1);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    for round in 1..=rounds {
        let budget = utils::guess_budget(round, GUESS_BUDGET_UNIT);
        info!(
            "Your guess ({}/{}, {} s, empty line to skip):",
            round,
            rounds,
            budget.as_secs()
        );

        match game::read_guess(&mut lines, &drawn.name, budget).await {
            Some(Guess::Correct) => {
                success!("Correct! It was {}", drawn.answer());
                return;
            }
            Some(Guess::Wrong(_)) => warning!("Not quite."),
            Some(Guess::Skipped) => info!("Skipped."),
            Some(Guess::TimedOut) => warning!("Time's up."),
            None => break,
        }
    }

    info!("It was {}", drawn.answer());
}
