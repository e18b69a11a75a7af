//! Brightness control for Elgato lights.

use serde::{Deserialize, Serialize};

/// Brightness level from 0 to 100 percent.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 100;

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is outside valid range (0-100).
    ///
    /// # Examples
    ///
    /// ```
    /// use elgato_lights_rs::Brightness;
    ///
    /// assert!(Brightness::create(-1).is_none());
    /// assert_eq!(Brightness::create(0).unwrap().value(), 0);
    /// assert_eq!(Brightness::create(100).unwrap().value(), 100);
    /// assert!(Brightness::create(101).is_none());
    /// ```
    pub fn create(value: i32) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|_| Self::is_valid(value))
            .map(|value| Brightness { value })
    }

    /// Pins value into the valid range.
    pub fn clamped(value: i32) -> Self {
        Brightness {
            value: value.clamp(Self::MIN, Self::MAX) as u8,
        }
    }

    fn is_valid(value: i32) -> bool {
        (Self::MIN..=Self::MAX).contains(&value)
    }
}
