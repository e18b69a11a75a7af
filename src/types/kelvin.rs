//! Color temperature control and conversion to device units.
//!
//! Elgato lights encode colour temperature as a small integer that is
//! inversely proportional to Kelvin (roughly mireds). The two conversions
//! below are deliberately not exact inverses: writes use an exponent of
//! -0.999 while reads assume -1, so a value written and read back can come
//! out a few dozen Kelvin higher than requested.

use serde::{Deserialize, Serialize};

/// Converts a temperature in Kelvin to the device's encoding.
///
/// # Examples
///
/// ```
/// use elgato_lights_rs::kelvin_to_device;
///
/// assert_eq!(kelvin_to_device(2900), 343);
/// assert_eq!(kelvin_to_device(7000), 142);
/// ```
pub fn kelvin_to_device(kelvin: u16) -> u16 {
    (987007.0 * f64::from(kelvin).powf(-0.999)).round() as u16
}

/// Converts the device's temperature encoding back to Kelvin.
///
/// A value of zero saturates to `u16::MAX`.
///
/// # Examples
///
/// ```
/// use elgato_lights_rs::device_to_kelvin;
///
/// assert_eq!(device_to_kelvin(343), 2915);
/// assert_eq!(device_to_kelvin(142), 7042);
/// ```
pub fn device_to_kelvin(value: u16) -> u16 {
    (1_000_000.0 / f64::from(value)).round() as u16
}

/// Color temperature in Kelvin, with valid values from 2900K to 7000K.
///
/// Lower values produce warmer light, higher values cooler light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Default for Kelvin {
    fn default() -> Self {
        Self::new()
    }
}

impl Kelvin {
    pub const MIN: i32 = 2900;
    pub const MAX: i32 = 7000;

    /// Create a new Kelvin with the default value (2900K).
    pub fn new() -> Self {
        Kelvin {
            kelvin: Self::MIN as u16,
        }
    }

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// The value sent to the device for this temperature.
    pub fn to_device(&self) -> u16 {
        kelvin_to_device(self.kelvin)
    }

    /// Create a new Kelvin with the given value.
    ///
    /// Returns `None` if value is outside the valid range (2900-7000).
    ///
    /// # Examples
    ///
    /// ```
    /// use elgato_lights_rs::Kelvin;
    ///
    /// assert!(Kelvin::create(2899).is_none());
    /// assert!(Kelvin::create(2900).is_some());
    /// assert!(Kelvin::create(7000).is_some());
    /// assert!(Kelvin::create(7001).is_none());
    /// ```
    pub fn create(kelvin: i32) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&kelvin) {
            Some(Kelvin {
                kelvin: kelvin as u16,
            })
        } else {
            None
        }
    }

    /// Pins value into the valid range.
    pub fn clamped(kelvin: i32) -> Self {
        Kelvin {
            kelvin: kelvin.clamp(Self::MIN, Self::MAX) as u16,
        }
    }
}
