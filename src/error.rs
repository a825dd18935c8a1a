//! Unified error types for the Demeter controller.
//!
//! A single `Error` enum that every device can convert into, keeping the
//! status aggregation in composites and the controller uniform.  All
//! variants are `Copy` so they can ride inside a [`Status`](crate::device::Status)
//! up the device hierarchy without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Hardware could not be reached during `initialize`.
    Init(&'static str),
    /// A sensor sample could not be acquired.
    Sensor(SensorError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// Configuration is invalid.  Fatal at construction time only.
    Config(ConfigError),
}

impl Error {
    /// Numeric status code reported to the scheduler.  Never zero.
    pub const fn code(self) -> u8 {
        match self {
            Self::Init(_) => 1,
            Self::Sensor(_) => 2,
            Self::Actuator(_) => 3,
            Self::Config(_) => 4,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The probe did not answer a read request.
    AcquisitionFailed,
    /// The probe returned NaN or infinity.
    InvalidReading,
    /// `initialize` failed earlier; the probe is not polled again.
    NotInitialized,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcquisitionFailed => write!(f, "sample acquisition failed"),
            Self::InvalidReading => write!(f, "non-finite reading"),
            Self::NotInitialized => write!(f, "sensor not initialised"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Digital output write failed.
    PinWriteFailed,
    /// An actuator handle did not resolve to a registered device.
    Unresolved,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWriteFailed => write!(f, "pin write failed"),
            Self::Unresolved => write!(f, "actuator handle unresolved"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Programming-time contract violations.  Raised while building devices or
/// wiring a controller, never from a running tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A monitor was configured without the mandatory actuator reference.
    MissingActuator,
    /// A monitor references an actuator name that is not registered.
    UnknownActuator,
    /// Two devices share a name.
    DuplicateName,
    /// Device name empty or longer than [`NAME_CAP`](crate::device::NAME_CAP).
    InvalidName,
    /// A physical pin is claimed by more than one device.
    PinInUse(u8),
    /// Pin number beyond the board's range.
    InvalidPin(u8),
    /// A range has `min > max` (or an empty physical window).
    InvalidRange,
    /// A timed actuator was given a zero duration.
    ZeroDuration,
    /// A fixed-capacity table is full.
    CapacityExceeded,
    /// Scheduler tick period must be non-zero.
    InvalidTickPeriod,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingActuator => write!(f, "monitor has no actuator"),
            Self::UnknownActuator => write!(f, "monitor references unknown actuator"),
            Self::DuplicateName => write!(f, "duplicate device name"),
            Self::InvalidName => write!(f, "device name empty or too long"),
            Self::PinInUse(pin) => write!(f, "pin {pin} claimed twice"),
            Self::InvalidPin(pin) => write!(f, "pin {pin} does not exist"),
            Self::InvalidRange => write!(f, "range minimum above maximum"),
            Self::ZeroDuration => write!(f, "timed actuator with zero duration"),
            Self::CapacityExceeded => write!(f, "device table full"),
            Self::InvalidTickPeriod => write!(f, "tick period must be non-zero"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
