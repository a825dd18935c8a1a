//! Device lifecycle abstraction.
//!
//! Every hardware-backed entity implements [`Device`]:
//!
//! ```text
//!  scheduler ──initialize()──▶ Device      (once, may fail, never retried)
//!            ──update()──────▶ Device      (every tick, bounded, non-blocking)
//!            ──process_input()▶ Device      (0..n per tick, decoded tokens)
//! ```
//!
//! Actuators additionally implement [`Switch`], which is what a soil
//! monitor commands through an [`ActuatorHandle`].  Composites own their
//! children as `Box<dyn Device>` and fan every call out in a fixed order.

pub mod bank;
pub mod composite;

pub use bank::{ActuatorBank, ActuatorHandle};
pub use composite::CompositeDevice;

use crate::app::commands::CommandToken;
use crate::app::events::DiagnosticEvent;
use crate::app::ports::EventSink;
use crate::error::{ConfigError, Error, Result};
use crate::time::Instant;

/// Maximum device name length (bytes).
pub const NAME_CAP: usize = 24;

/// Fixed-capacity device name.
pub type Name = heapless::String<NAME_CAP>;

/// Validate and copy a device name.
pub fn device_name(s: &str) -> Result<Name> {
    if s.is_empty() {
        return Err(ConfigError::InvalidName.into());
    }
    let mut name = Name::new();
    name.push_str(s)
        .map_err(|()| Error::Config(ConfigError::InvalidName))?;
    Ok(name)
}

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Outcome of a lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Work was done and succeeded.
    Ok,
    /// Nothing to do this tick.
    Idle,
    /// The device is running with reduced capability.
    Degraded(Error),
}

impl Status {
    /// `0` for `Ok`/`Idle`, the error's nonzero code otherwise.
    pub const fn code(self) -> u8 {
        match self {
            Self::Ok | Self::Idle => 0,
            Self::Degraded(e) => e.code(),
        }
    }

    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub const fn error(self) -> Option<Error> {
        match self {
            Self::Degraded(e) => Some(e),
            _ => None,
        }
    }

    /// Worst-of aggregation.  The first degradation seen wins; otherwise any
    /// `Ok` beats `Idle`.
    #[must_use]
    pub fn worst(self, other: Status) -> Status {
        match (self, other) {
            (Self::Degraded(e), _) | (_, Self::Degraded(e)) => Self::Degraded(e),
            (Self::Ok, _) | (_, Self::Ok) => Self::Ok,
            _ => Self::Idle,
        }
    }
}

impl From<Result<()>> for Status {
    fn from(r: Result<()>) -> Self {
        match r {
            Ok(()) => Self::Ok,
            Err(e) => Self::Degraded(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tick context
// ---------------------------------------------------------------------------

/// Per-call environment: the tick timestamp, the diagnostic sink and, for
/// devices that drive actuators, the actuator bank.
///
/// Actuators themselves are updated with a detached context (no bank) so a
/// switch can never reach back into the table that owns it.
pub struct Context<'a> {
    now: Instant,
    sink: &'a mut dyn EventSink,
    actuators: Option<&'a mut ActuatorBank>,
}

impl<'a> Context<'a> {
    /// Context without actuator access.
    pub fn new(now: Instant, sink: &'a mut dyn EventSink) -> Self {
        Self {
            now,
            sink,
            actuators: None,
        }
    }

    /// Context that lets devices resolve [`ActuatorHandle`]s.
    pub fn with_actuators(
        now: Instant,
        sink: &'a mut dyn EventSink,
        actuators: &'a mut ActuatorBank,
    ) -> Self {
        Self {
            now,
            sink,
            actuators: Some(actuators),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn emit(&mut self, event: &DiagnosticEvent) {
        self.sink.emit(event);
    }

    /// Resolve a non-owning actuator handle for this call only.
    pub fn actuator(&mut self, handle: ActuatorHandle) -> Option<&mut (dyn Switch + 'static)> {
        self.actuators.as_deref_mut()?.get_mut(handle)
    }
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Lifecycle capability shared by every controllable entity.
pub trait Device {
    fn name(&self) -> &str;

    /// One-time hardware setup.  A failure is reported once and is sticky;
    /// the scheduler keeps calling [`update`](Self::update) regardless.
    fn initialize(&mut self, ctx: &mut Context<'_>) -> Status;

    /// Once per scheduler tick.  Must not block.
    fn update(&mut self, ctx: &mut Context<'_>) -> Status;

    /// Interpret a decoded command.  Must not block or do slow I/O.
    fn process_input(&mut self, cmd: &CommandToken, ctx: &mut Context<'_>);
}

/// Result of an on/off request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The output toggled.
    Changed,
    /// Already in the requested state; nothing was written.
    Unchanged,
}

/// An actuator that can be commanded on and off.
pub trait Switch: Device {
    /// Idempotent: returns [`Transition::Unchanged`] when already on and
    /// does not restart a running timed window.
    fn turn_on(&mut self, now: Instant) -> Result<Transition>;

    /// Idempotent: returns [`Transition::Unchanged`] when already off.
    fn turn_off(&mut self) -> Result<Transition>;

    fn is_on(&self) -> bool;
}
