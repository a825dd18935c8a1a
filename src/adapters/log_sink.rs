//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by rendering each [`DiagnosticEvent`] as one
//! `log` record (serial console on the device, `env_logger` on the host).

use log::{info, warn};

use crate::app::events::{DiagnosticEvent, Extreme};
use crate::app::ports::EventSink;
use crate::ranged::Position;

/// Adapter that logs every [`DiagnosticEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { emitted: 0 }
    }

    /// Events rendered so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DiagnosticEvent) {
        self.emitted += 1;
        match event {
            DiagnosticEvent::Initialized { device } => {
                info!("INIT  | {} ready", device);
            }
            DiagnosticEvent::InitFailed { device, error } => {
                warn!("INIT  | {} FAILED: {} (code {})", device, error, error.code());
            }
            DiagnosticEvent::SwitchChanged { device, on, cause } => {
                info!("SWITCH| {} {} ({:?})", device, if *on { "ON" } else { "OFF" }, cause);
            }
            DiagnosticEvent::SwitchFailed { device, error } => {
                warn!("SWITCH| {} FAILED: {}", device, error);
            }
            DiagnosticEvent::Sample {
                device,
                raw,
                moisture,
                temperature_f,
            } => {
                info!(
                    "SAMPLE| {} | raw={:.0} | H2O={}% | T={}\u{00b0}F",
                    device, raw, moisture, temperature_f
                );
            }
            DiagnosticEvent::OutOfPhysicalRange {
                device,
                raw,
                position,
            } => {
                let side = if *position == Position::Below { "<" } else { ">" };
                warn!("RANGE | {} raw {} physical bound, value={:.0}", device, side, raw);
            }
            DiagnosticEvent::NewExtreme {
                device,
                extreme,
                value,
            } => {
                let which = match extreme {
                    Extreme::Min => "min",
                    Extreme::Max => "max",
                };
                info!("H2O   | {} ***new {} H2O: {}", device, which, value);
            }
            DiagnosticEvent::SampleFailed { device, error } => {
                warn!("SAMPLE| {} FAILED: {}", device, error);
            }
            DiagnosticEvent::AutoControl { device, enabled } => {
                info!("AUTO  | {} {}", device, if *enabled { "resumed" } else { "suspended" });
            }
        }
    }
}
