use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{MixerError, Result},
    synth::InstrumentType,
};

pub type ChannelId = u32;

/// A catalog entry. Immutable for the life of a session.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub instrument: InstrumentType,
    pub name: String,
}

impl Channel {
    pub fn new(id: ChannelId, instrument: InstrumentType, name: impl Into<String>) -> Self {
        Self {
            id,
            instrument,
            name: name.into(),
        }
    }
}

/// The four-channel console layout: drums, bass, vocals, pads.
pub fn default_catalog() -> Vec<Channel> {
    vec![
        Channel::new(1, InstrumentType::Drum, "Drums"),
        Channel::new(2, InstrumentType::Bass, "Bass"),
        Channel::new(3, InstrumentType::Vocal, "Vocals"),
        Channel::new(4, InstrumentType::Pad, "Pads"),
    ]
}

pub(crate) fn validate_catalog(catalog: &[Channel]) -> Result<()> {
    if catalog.is_empty() {
        return Err(MixerError::invalid_config("channel catalog is empty"));
    }
    let mut seen = HashSet::new();
    for channel in catalog {
        if !seen.insert(channel.id) {
            return Err(MixerError::invalid_config(format!(
                "channel id {} appears more than once",
                channel.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_covers_every_instrument() {
        let catalog = default_catalog();
        assert!(validate_catalog(&catalog).is_ok());
        for instrument in InstrumentType::ALL {
            assert!(catalog.iter().any(|c| c.instrument == instrument));
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let catalog = vec![
            Channel::new(1, InstrumentType::Drum, "Kit"),
            Channel::new(1, InstrumentType::Bass, "Bass"),
        ];
        assert!(validate_catalog(&catalog).is_err());
        assert!(validate_catalog(&[]).is_err());
    }
}
