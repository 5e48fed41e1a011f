//! Letter-by-letter text reveal and the babble voice that goes with it.

pub mod typewriter;
pub mod voice;

pub use typewriter::{is_shouty, Pace, RevealOptions, Revealed, Typewriter};
pub use voice::Voice;
