//! Port traits: the boundary between the device core and the outside world.
//!
//! ```text
//!   Board / SoilProbe ──▶ devices ──▶ EventSink
//! ```
//!
//! Driven adapters (pins, probe drivers, diagnostic output) implement these
//! traits.  Devices consume them through generics or the tick context, so
//! the core never touches a bus or register directly.

use embedded_hal::digital::OutputPin;

use super::events::DiagnosticEvent;
use crate::error::{Result, SensorError};

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// Devices emit structured [`DiagnosticEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &DiagnosticEvent);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &DiagnosticEvent) {}
}

// ───────────────────────────────────────────────────────────────
// Soil probe port (driven adapter: vendor driver → core)
// ───────────────────────────────────────────────────────────────

/// Capacitive soil probe (STEMMA/seesaw class).  Bus protocol is the
/// implementor's business.  Every call must return promptly.
pub trait SoilProbe {
    /// Open the device at `address`.  `false` means unreachable.
    fn begin(&mut self, address: u8) -> bool;

    /// Raw capacitive reading, nominally 200 (dry) to 2000 (wet).
    fn read_raw(&mut self) -> core::result::Result<f32, SensorError>;

    /// Probe die temperature in degrees Celsius.
    fn read_temperature_c(&mut self) -> core::result::Result<f32, SensorError>;

    /// Firmware version reported after a successful `begin`.
    fn version(&self) -> Option<u32> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// Board port (driven adapter: pin numbers / addresses → drivers)
// ───────────────────────────────────────────────────────────────

/// Hands out hardware by the numbers found in configuration.  Pin
/// exclusivity is checked before any pin is requested.
pub trait Board {
    type Pin: OutputPin + 'static;
    type Probe: SoilProbe + 'static;

    /// Digital output for `number`, configured as push-pull output.
    fn output_pin(&mut self, number: u8) -> Result<Self::Pin>;

    /// Soil probe driver for the device at bus `address`.
    fn soil_probe(&mut self, address: u8) -> Result<Self::Probe>;
}
