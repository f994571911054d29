pub mod config;
pub mod dsp;
pub mod engine; // Render path: strips, bus, meters, backends
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod mixer; // Sessions, transport, control surface
pub mod synth; // Procedural loop synthesis
pub mod voices;

pub use config::{AnalyzerConfig, MixerConfig};
pub use error::{ErrorKind, MixerError, Result};
pub use mixer::{
    default_catalog, Channel, ChannelId, ChannelParam, ChannelParameters, Console, MasterState,
    Session, SessionHandle, TransportState,
};
pub use synth::{generate_loop, InstrumentType, LoopBuffer};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
