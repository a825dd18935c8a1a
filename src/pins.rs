//! Default pin assignments and exclusive pin ownership.
//!
//! The constants below are only the factory defaults used by
//! [`ControllerConfig::default`](crate::config::ControllerConfig); real
//! assignments always come from configuration.  [`PinClaims`] enforces that
//! no two devices drive the same pin.

use log::warn;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Water pump relay.
pub const PUMP_GPIO: u8 = 5;
/// Misting valve relay.
pub const MISTER_GPIO: u8 = 6;

// ---------------------------------------------------------------------------
// LED group, bar order (bottom first)
// ---------------------------------------------------------------------------

pub const LED_RED_GPIO: u8 = 8;
pub const LED_ORANGE_GPIO: u8 = 9;
pub const LED_YELLOW_GPIO: u8 = 10;
pub const LED_GREEN_GPIO: u8 = 11;

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// Highest pin number accepted.
pub const MAX_GPIO: u8 = 63;

/// Set of claimed pins, one bit per pin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PinClaims(u64);

impl PinClaims {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Claim `pin` for one device.  A second claim on the same pin fails.
    pub fn claim(&mut self, pin: u8) -> Result<(), ConfigError> {
        if pin > MAX_GPIO {
            warn!("PinClaims: GPIO{} out of range", pin);
            return Err(ConfigError::InvalidPin(pin));
        }
        let bit = 1u64 << pin;
        if self.0 & bit != 0 {
            warn!("PinClaims: GPIO{} already claimed", pin);
            return Err(ConfigError::PinInUse(pin));
        }
        self.0 |= bit;
        Ok(())
    }

    pub fn is_claimed(&self, pin: u8) -> bool {
        pin <= MAX_GPIO && self.0 & (1u64 << pin) != 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }
}
