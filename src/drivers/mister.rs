//! Mister: an event-driven [`SwitchDevice`] by default.
//!
//! Stays on until something turns it off, which is what a soil monitor
//! wants from the actuator it drives.

use embedded_hal::digital::OutputPin;

use super::switch::{SwitchDevice, SwitchMode};
use crate::error::Result;

pub fn mister<P: OutputPin>(name: &str, pin: P) -> Result<SwitchDevice<P>> {
    mister_with_mode(name, pin, SwitchMode::EventOnEventOff)
}

pub fn mister_with_mode<P: OutputPin>(
    name: &str,
    pin: P,
    mode: SwitchMode,
) -> Result<SwitchDevice<P>> {
    SwitchDevice::new(name, pin, mode)
}
