//! Outbound diagnostic events.
//!
//! Devices emit these through the [`EventSink`](super::ports::EventSink)
//! port carried in the tick [`Context`](crate::device::Context).  Adapters
//! on the other side decide what to do with them (serial log, test
//! recorder, ...).  None of them are needed for correct control.

use crate::device::Name;
use crate::error::Error;
use crate::ranged::Position;

/// Why a switch changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCause {
    /// An inbound command token.
    Command,
    /// A timed window ran out.
    Expired,
    /// A soil monitor's threshold decision.
    Monitor,
}

/// Which hysteresis extreme was overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

/// Structured events emitted by devices.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// `initialize` succeeded.
    Initialized { device: Name },

    /// `initialize` failed; the device keeps running degraded.
    InitFailed { device: Name, error: Error },

    /// An actuator changed state.
    SwitchChanged {
        device: Name,
        on: bool,
        cause: SwitchCause,
    },

    /// An actuator command could not be carried out.
    SwitchFailed { device: Name, error: Error },

    /// A fresh soil sample was processed.
    Sample {
        device: Name,
        raw: f32,
        moisture: u8,
        temperature_f: u8,
    },

    /// The raw sample was outside the probe's documented range and was
    /// clamped.  Informational only.
    OutOfPhysicalRange {
        device: Name,
        raw: f32,
        position: Position,
    },

    /// Moisture left the acceptable window; the matching extreme was
    /// overwritten with `value`.
    NewExtreme {
        device: Name,
        extreme: Extreme,
        value: u8,
    },

    /// A sample could not be acquired; the previous value is retained.
    SampleFailed { device: Name, error: Error },

    /// Automatic actuation was suspended or resumed by command.
    AutoControl { device: Name, enabled: bool },
}
