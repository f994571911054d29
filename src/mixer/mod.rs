//! The control surface.
//!
//! `Console` hands out `SessionHandle`s; each `Session` owns its channel
//! strips, the mixing bus, the transport clock and one audio context.

pub mod bus;
pub mod channel;
pub mod console;
pub mod params;
pub mod session;
pub mod strip;
pub mod transport;

pub use bus::{is_audible, MasterState, MixBus};
pub use channel::{default_catalog, Channel, ChannelId};
pub use console::{Console, SessionHandle};
pub use params::{effective_gain, pan_value, unmap_pan, ChannelParam, ChannelParameters};
pub use session::Session;
pub use strip::{ChannelStrip, FeedState};
pub use transport::{PlayState, TransportClock, TransportState};
