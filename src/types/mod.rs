//! Value types for light control parameters.

mod brightness;
mod kelvin;
mod power;

pub use brightness::Brightness;
pub use kelvin::{Kelvin, device_to_kelvin, kelvin_to_device};
pub use power::PowerMode;
