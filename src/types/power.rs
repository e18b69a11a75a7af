//! Power mode for light control.

use serde::{Deserialize, Serialize};

/// Power state for a light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
}

impl PowerMode {
    /// The `on` value the device uses on the wire.
    pub fn value(&self) -> u8 {
        match self {
            PowerMode::On => 1,
            PowerMode::Off => 0,
        }
    }

    /// Returns None for anything but 0 or 1.
    pub fn create(value: i32) -> Option<Self> {
        match value {
            1 => Some(PowerMode::On),
            0 => Some(PowerMode::Off),
            _ => None,
        }
    }
}
