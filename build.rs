//! Build script for guessthebeat.
//!
//! Places the `.env.example` template next to the `.env` file the game reads at
//! startup, so a fresh install shows which Spotify credentials and service URLs
//! have to be filled in.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root into `<data_local_dir>/guessthebeat/`.
///
/// A missing template only produces a cargo warning; directory or write
/// failures abort the build.
///
/// # Destination
///
/// - Linux: `~/.local/share/guessthebeat/.env.example`
/// - macOS: `~/Library/Application Support/guessthebeat/.env.example`
/// - Windows: `%LOCALAPPDATA%/guessthebeat/.env.example`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let template = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join(".env.example");

    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.push("guessthebeat");
    fs::create_dir_all(&data_dir)?;

    if !template.is_file() {
        println!(
            "cargo:warning=no credentials template at {}",
            template.display()
        );
        return Ok(());
    }

    fs::copy(&template, data_dir.join(".env.example"))?;
    Ok(())
}
