//! Capacitive soil-moisture monitor with a hysteresis-driven actuator.
//!
//! Each tick the monitor:
//!
//! 1. samples the probe (a failed read keeps the previous values),
//! 2. maps the raw reading from the probe's physical range onto 0..=100 %,
//! 3. converts the probe temperature to Fahrenheit,
//! 4. records the last out-of-band moisture as the low/high extreme,
//! 5. turns its actuator on below the acceptable band and off at or above
//!    its upper bound.
//!
//! The actuator is referenced by [`ActuatorHandle`] and resolved through
//! the tick [`Context`]; the monitor never owns it.

use log::{debug, error, info, warn};

use crate::app::commands::{CommandToken, Target, Verb};
use crate::app::events::{DiagnosticEvent, Extreme, SwitchCause};
use crate::app::ports::SoilProbe;
use crate::device::{ActuatorHandle, Context, Device, Name, Status, Transition, device_name};
use crate::error::{ActuatorError, ConfigError, Error, Result, SensorError};
use crate::ranged::{Position, RangedValue};

/// Documented probe output for bone-dry soil.
pub const PHYSICAL_MIN: f32 = 200.0;
/// Documented probe output for saturated soil.
pub const PHYSICAL_MAX: f32 = 2000.0;
/// Factory I2C address of the seesaw soil probe.
pub const DEFAULT_ADDRESS: u8 = 0x36;

// ── Conversions ──────────────────────────────────────────────────

/// Linear map of `raw` from `physical` onto `0..=100`, rounded to nearest.
/// Readings outside the physical window are clamped first.
pub fn moisture_percent(raw: f32, physical: &RangedValue<f32>) -> u8 {
    let (lo, hi) = (physical.min_value(), physical.max_value());
    let span = hi - lo;
    if span <= 0.0 {
        return if raw >= hi { 100 } else { 0 };
    }
    let pct = (physical.clamp(raw) - lo) * 100.0 / span;
    pct.round().clamp(0.0, 100.0) as u8
}

pub fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * 9.0 / 5.0 + 32.0
}

fn finite(v: f32) -> core::result::Result<f32, SensorError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SensorError::InvalidReading)
    }
}

// ── SoilMonitor ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    Uninitialized,
    Ready,
    Failed,
}

pub struct SoilMonitor<S> {
    name: Name,
    probe: S,
    address: u8,
    state: ProbeState,
    physical: RangedValue<f32>,
    acceptable: RangedValue<u8>,
    raw: f32,
    temperature_f: u8,
    min_observed: Option<u8>,
    max_observed: Option<u8>,
    actuator: ActuatorHandle,
    auto: bool,
    degraded: bool,
}

impl<S: SoilProbe> SoilMonitor<S> {
    /// `actuator` is mandatory; `None` fails with
    /// [`ConfigError::MissingActuator`] and no monitor is produced.  It is an
    /// `Option` so config-driven wiring can pass an unresolved reference
    /// straight through.
    pub fn new(
        name: &str,
        probe: S,
        acceptable: RangedValue<u8>,
        actuator: Option<ActuatorHandle>,
    ) -> Result<Self> {
        let Some(actuator) = actuator else {
            error!("{}: soil monitor needs an actuator", name);
            return Err(ConfigError::MissingActuator.into());
        };
        if acceptable.max_value() > 100 {
            return Err(ConfigError::InvalidRange.into());
        }
        let physical = RangedValue::bounds(PHYSICAL_MIN, PHYSICAL_MAX)?;
        Ok(Self {
            name: device_name(name)?,
            probe,
            address: DEFAULT_ADDRESS,
            state: ProbeState::Uninitialized,
            physical,
            acceptable,
            raw: PHYSICAL_MIN,
            temperature_f: 0,
            min_observed: None,
            max_observed: None,
            actuator,
            auto: true,
            degraded: false,
        })
    }

    #[must_use]
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Override the probe's documented output range.
    pub fn with_physical_range(mut self, min: f32, max: f32) -> Result<Self> {
        let physical = RangedValue::bounds(min, max)?;
        if !(min.is_finite() && max.is_finite()) || min == max {
            return Err(ConfigError::InvalidRange.into());
        }
        self.physical = physical;
        self.raw = min;
        Ok(self)
    }

    /// Moisture in percent from the last good sample.
    pub fn moisture(&self) -> u8 {
        self.acceptable.current()
    }

    pub fn temperature_f(&self) -> u8 {
        self.temperature_f
    }

    /// Unclamped raw reading from the last good sample.
    pub fn raw_sample(&self) -> f32 {
        self.raw
    }

    /// Last moisture seen below the acceptable band since initialisation.
    pub fn min_observed(&self) -> Option<u8> {
        self.min_observed
    }

    /// Last moisture seen above the acceptable band since initialisation.
    pub fn max_observed(&self) -> Option<u8> {
        self.max_observed
    }

    pub fn acceptable(&self) -> &RangedValue<u8> {
        &self.acceptable
    }

    pub fn physical(&self) -> &RangedValue<f32> {
        &self.physical
    }

    pub fn actuator(&self) -> ActuatorHandle {
        self.actuator
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn auto_enabled(&self) -> bool {
        self.auto
    }

    /// The last `initialize` or `update` reported a degradation.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn sample_failed(&mut self, error: Error, ctx: &mut Context<'_>) -> Status {
        warn!("{}: {}", self.name, error);
        ctx.emit(&DiagnosticEvent::SampleFailed {
            device: self.name.clone(),
            error,
        });
        Status::Degraded(error)
    }

    fn track_extremes(&mut self, moisture: u8, band: Position, ctx: &mut Context<'_>) {
        // Overwrites: these are the latest out-of-band values, not running
        // minima/maxima.
        let extreme = match band {
            Position::Below => {
                self.min_observed = Some(moisture);
                Extreme::Min
            }
            Position::Above => {
                self.max_observed = Some(moisture);
                Extreme::Max
            }
            Position::Within => return,
        };
        info!("{}: new {:?} H2O {}", self.name, extreme, moisture);
        ctx.emit(&DiagnosticEvent::NewExtreme {
            device: self.name.clone(),
            extreme,
            value: moisture,
        });
    }

    fn actuate(&mut self, moisture: u8, ctx: &mut Context<'_>) -> Status {
        let on = if moisture < self.acceptable.min_value() {
            true
        } else if moisture >= self.acceptable.max_value() {
            false
        } else {
            return Status::Ok;
        };

        let now = ctx.now();
        let outcome = ctx.actuator(self.actuator).map(|a| {
            let result = if on { a.turn_on(now) } else { a.turn_off() };
            (device_name(a.name()).unwrap_or_default(), result)
        });

        match outcome {
            None => {
                warn!("{}: actuator slot {} unresolved", self.name, self.actuator.index());
                Status::Degraded(ActuatorError::Unresolved.into())
            }
            Some((device, Ok(Transition::Changed))) => {
                info!("{}: moisture {}% -> {} {}", self.name, moisture, device, if on { "on" } else { "off" });
                ctx.emit(&DiagnosticEvent::SwitchChanged {
                    device,
                    on,
                    cause: SwitchCause::Monitor,
                });
                Status::Ok
            }
            Some((_, Ok(Transition::Unchanged))) => Status::Ok,
            Some((device, Err(error))) => {
                warn!("{}: could not switch {}: {}", self.name, device, error);
                ctx.emit(&DiagnosticEvent::SwitchFailed { device, error });
                Status::Degraded(error)
            }
        }
    }

    fn set_auto(&mut self, enabled: bool, ctx: &mut Context<'_>) {
        if self.auto == enabled {
            return;
        }
        self.auto = enabled;
        info!("{}: automatic control {}", self.name, if enabled { "resumed" } else { "suspended" });
        ctx.emit(&DiagnosticEvent::AutoControl {
            device: self.name.clone(),
            enabled,
        });
    }
}

impl<S: SoilProbe> Device for SoilMonitor<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &mut Context<'_>) -> Status {
        self.min_observed = None;
        self.max_observed = None;

        if !self.probe.begin(self.address) {
            self.state = ProbeState::Failed;
            self.degraded = true;
            error!("{}: soil probe at {:#04x} not responding", self.name, self.address);
            let error = Error::Init("soil probe unreachable");
            ctx.emit(&DiagnosticEvent::InitFailed {
                device: self.name.clone(),
                error,
            });
            return Status::Degraded(error);
        }

        self.state = ProbeState::Ready;
        self.degraded = false;
        match self.probe.version() {
            Some(v) => info!("{}: soil probe ready, version {:x}", self.name, v),
            None => info!("{}: soil probe ready", self.name),
        }
        ctx.emit(&DiagnosticEvent::Initialized {
            device: self.name.clone(),
        });
        Status::Ok
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> Status {
        if self.state != ProbeState::Ready {
            // Init failure is sticky; the probe is not touched again.
            self.degraded = true;
            return Status::Degraded(SensorError::NotInitialized.into());
        }

        let raw = match self.probe.read_raw().and_then(finite) {
            Ok(raw) => raw,
            Err(e) => {
                self.degraded = true;
                return self.sample_failed(e.into(), ctx);
            }
        };
        self.raw = raw;

        let position = self.physical.set_clamped(raw);
        if position != Position::Within {
            debug!("{}: raw {} outside {}..{}", self.name, raw, self.physical.min_value(), self.physical.max_value());
            ctx.emit(&DiagnosticEvent::OutOfPhysicalRange {
                device: self.name.clone(),
                raw,
                position,
            });
        }
        let moisture = moisture_percent(raw, &self.physical);
        let band = self.acceptable.set(moisture);

        let mut status = Status::Ok;
        match self.probe.read_temperature_c().and_then(finite) {
            Ok(c) => {
                self.temperature_f = celsius_to_fahrenheit(c).round().clamp(0.0, 255.0) as u8;
            }
            Err(e) => status = status.worst(self.sample_failed(e.into(), ctx)),
        }

        debug!("{}: raw {} -> {}% / {}F", self.name, raw, moisture, self.temperature_f);
        ctx.emit(&DiagnosticEvent::Sample {
            device: self.name.clone(),
            raw,
            moisture,
            temperature_f: self.temperature_f,
        });

        self.track_extremes(moisture, band, ctx);
        if self.auto {
            status = status.worst(self.actuate(moisture, ctx));
        }

        self.degraded = status.is_degraded();
        status
    }

    fn process_input(&mut self, cmd: &CommandToken, ctx: &mut Context<'_>) {
        let addressed = matches!(&cmd.target, Target::Device(n) if n.as_str() == self.name.as_str());
        match cmd.verb {
            // On/Off only when named: a broadcast Off is for actuators.
            Verb::On if addressed => self.set_auto(true, ctx),
            Verb::Off if addressed => self.set_auto(false, ctx),
            _ => {}
        }
    }
}
