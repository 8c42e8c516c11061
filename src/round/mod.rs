//! Round window module
//!
//! Pure time arithmetic for fixed-duration up/down rounds. Rounds are
//! aligned to the epoch, so for durations dividing an hour they start on
//! the hour and every `duration` after it.

mod resolver;

pub use resolver::{duration_label, format_time_left, parse_slug_start, RoundRef, RoundWindowResolver};
