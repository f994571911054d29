//! Voice graphs for the four loop instruments.
//!
//! Each voice is a ready-to-use node graph, built fresh for every hit or note
//! the loop renderer schedules.
//!
//! # Example
//!
//! ```ignore
//! use loopmix::voices;
//!
//! // Drums (noise voices take a seed so every render is repeatable)
//! let kick = voices::kick(1);
//! let snare = voices::snare(2);
//! let hihat = voices::hihat(3);
//!
//! // Melodic
//! let bass = voices::bass();
//! let vocal = voices::vocal();
//! let pad = voices::pad();
//! ```

mod bass;
mod hihat;
mod kick;
mod pad;
mod snare;
mod vocal;

pub use bass::{bass, BASS_RELEASE};
pub use hihat::hihat;
pub use kick::kick;
pub use pad::{pad, PAD_RELEASE};
pub use snare::snare;
pub use vocal::{vocal, VOCAL_RELEASE};
