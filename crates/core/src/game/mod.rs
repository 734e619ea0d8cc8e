#![allow(missing_docs)]

//! Round and game state.

mod round;
mod state;

pub use round::{
    GuessOutcome, GuessRecord, Round, RoundError, RoundOutcome, RoundSummary, TOTAL_CLUES,
};
pub use state::{Game, MAX_ROUNDS};
