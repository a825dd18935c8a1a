//! Water pump: a timed [`SwitchDevice`].
//!
//! Each `On` runs the pump for a fixed window and it stops by itself; a
//! second `On` inside the window does not extend it.

use embedded_hal::digital::OutputPin;

use super::switch::{SwitchDevice, SwitchMode};
use crate::error::Result;
use crate::time::Duration;

/// Default run time per activation.
pub const PUMP_RUN_TIME: Duration = Duration::minutes(1);

/// Pump with the default one-minute window.
pub fn water_pump<P: OutputPin>(name: &str, pin: P) -> Result<SwitchDevice<P>> {
    water_pump_for(name, pin, PUMP_RUN_TIME)
}

/// Pump with a custom run time.  Zero is rejected.
pub fn water_pump_for<P: OutputPin>(
    name: &str,
    pin: P,
    run_time: Duration,
) -> Result<SwitchDevice<P>> {
    SwitchDevice::new(name, pin, SwitchMode::Timed(run_time))
}
