//! Game logic that does not depend on any user interface.
//!
//! - [`picker`] - draws the track the player has to guess
//! - [`round`] - reads one timed guess

pub mod picker;
pub mod round;

pub use picker::{DrawnTrack, draw_random_track};
pub use round::{Guess, read_guess};
