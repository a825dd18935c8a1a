//! Binary-output actuator state machine.
//!
//! ```text
//!            turn_on (mode = Timed)            now - since >= duration
//!   ┌─────┐ ─────────────────────────▶ ┌─────────┐ ────────────────────┐
//!   │ Off │                            │ OnTimed │                     │
//!   └─────┘ ◀───────────────────────── └─────────┘ ◀───────────────────┘
//!     ▲  │        turn_off                                  (update)
//!     │  │ turn_on (mode = EventOnEventOff)
//!     │  ▼
//!   ┌─────────┐
//!   │ OnEvent │   leaves only on turn_off
//!   └─────────┘
//! ```
//!
//! Every transition writes the pin exactly once.  Requests that would not
//! change state write nothing, and a repeated `turn_on` never extends a
//! running timed window.

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::commands::{CommandToken, Verb};
use crate::app::events::{DiagnosticEvent, SwitchCause};
use crate::device::{Context, Device, Name, Status, Switch, Transition, device_name};
use crate::error::{ActuatorError, ConfigError, Error, Result};
use crate::time::{Duration, Instant};

/// Operating mode, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// Turns itself off once the duration has elapsed.
    Timed(Duration),
    /// Stays on until explicitly turned off.
    EventOnEventOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Off,
    OnTimed { since: Instant },
    OnEvent { since: Instant },
}

/// Electrical level that means "on".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    ActiveHigh,
    /// Low-trigger relay boards.
    ActiveLow,
}

pub struct SwitchDevice<P> {
    name: Name,
    pin: P,
    mode: SwitchMode,
    polarity: Polarity,
    state: SwitchState,
}

impl<P: OutputPin> SwitchDevice<P> {
    /// Build an actuator in the `Off` state.  The pin is not written until
    /// [`Device::initialize`].
    pub fn new(name: &str, pin: P, mode: SwitchMode) -> Result<Self> {
        if let SwitchMode::Timed(d) = mode {
            if d.is_zero() {
                return Err(ConfigError::ZeroDuration.into());
            }
        }
        Ok(Self {
            name: device_name(name)?,
            pin,
            mode,
            polarity: Polarity::ActiveHigh,
            state: SwitchState::Off,
        })
    }

    #[must_use]
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn mode(&self) -> SwitchMode {
        self.mode
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Time left in the current timed window, `None` when not `OnTimed`.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match (self.state, self.mode) {
            (SwitchState::OnTimed { since }, SwitchMode::Timed(d)) => {
                Some(d.saturating_sub(now.duration_since(since)))
            }
            _ => None,
        }
    }

    fn drive(&mut self, on: bool) -> Result<()> {
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        let written = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        written.map_err(|_| Error::Actuator(ActuatorError::PinWriteFailed))
    }

    /// Switch and report: `SwitchChanged` on a transition, `SwitchFailed`
    /// on a pin error.
    pub fn apply(&mut self, on: bool, ctx: &mut Context<'_>, cause: SwitchCause) -> Status {
        let result = if on {
            self.turn_on(ctx.now())
        } else {
            self.turn_off()
        };
        match result {
            Ok(Transition::Changed) => {
                ctx.emit(&DiagnosticEvent::SwitchChanged {
                    device: self.name.clone(),
                    on,
                    cause,
                });
                Status::Ok
            }
            Ok(Transition::Unchanged) => Status::Idle,
            Err(e) => {
                warn!("{}: switch {} failed: {}", self.name, if on { "on" } else { "off" }, e);
                ctx.emit(&DiagnosticEvent::SwitchFailed {
                    device: self.name.clone(),
                    error: e,
                });
                Status::Degraded(e)
            }
        }
    }
}

impl<P: OutputPin> Switch for SwitchDevice<P> {
    fn turn_on(&mut self, now: Instant) -> Result<Transition> {
        if self.is_on() {
            return Ok(Transition::Unchanged);
        }
        self.drive(true)?;
        self.state = match self.mode {
            SwitchMode::Timed(_) => SwitchState::OnTimed { since: now },
            SwitchMode::EventOnEventOff => SwitchState::OnEvent { since: now },
        };
        debug!("{}: on at {}", self.name, now);
        Ok(Transition::Changed)
    }

    fn turn_off(&mut self) -> Result<Transition> {
        if !self.is_on() {
            return Ok(Transition::Unchanged);
        }
        // State stays on if the write fails so the next tick retries.
        self.drive(false)?;
        self.state = SwitchState::Off;
        debug!("{}: off", self.name);
        Ok(Transition::Changed)
    }

    fn is_on(&self) -> bool {
        !matches!(self.state, SwitchState::Off)
    }
}

impl<P: OutputPin> Device for SwitchDevice<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &mut Context<'_>) -> Status {
        self.state = SwitchState::Off;
        match self.drive(false) {
            Ok(()) => {
                info!("{}: ready ({:?})", self.name, self.mode);
                ctx.emit(&DiagnosticEvent::Initialized {
                    device: self.name.clone(),
                });
                Status::Ok
            }
            Err(e) => {
                warn!("{}: output unreachable: {}", self.name, e);
                let error = Error::Init("actuator pin unreachable");
                ctx.emit(&DiagnosticEvent::InitFailed {
                    device: self.name.clone(),
                    error,
                });
                Status::Degraded(error)
            }
        }
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> Status {
        match (self.state, self.mode) {
            (SwitchState::OnTimed { since }, SwitchMode::Timed(d))
                if ctx.now().duration_since(since) >= d =>
            {
                debug!("{}: {} window elapsed", self.name, d);
                self.apply(false, ctx, SwitchCause::Expired)
            }
            _ => Status::Idle,
        }
    }

    fn process_input(&mut self, cmd: &CommandToken, ctx: &mut Context<'_>) {
        if !cmd.targets(&self.name) {
            return;
        }
        // Status is reported through the sink; process_input has no return.
        let _ = match cmd.verb {
            Verb::On => self.apply(true, ctx, SwitchCause::Command),
            Verb::Off | Verb::Reset => self.apply(false, ctx, SwitchCause::Command),
            Verb::Level => Status::Idle,
        };
    }
}
