//! Actuator drivers: the switch state machine and the devices built on it.

pub mod led;
pub mod mister;
pub mod pump;
pub mod switch;

pub use led::{LedGroup, LedGroupMode};
pub use switch::{Polarity, SwitchDevice, SwitchMode, SwitchState};
