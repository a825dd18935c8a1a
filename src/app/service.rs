//! Controller: the cooperative scheduler core.
//!
//! [`Controller`] owns every device for the process lifetime: actuators in
//! an [`ActuatorBank`], everything else (monitors, composites) in an
//! ordered device table.  The host loop calls [`Controller::tick`] once per
//! period; nothing in here blocks.
//!
//! ```text
//!  enqueue(cmd) ──▶ inbox ─┐
//!                          ▼
//!  tick(now) ──▶ 1. dispatch queued commands (actuators, then devices)
//!                2. actuators.update()      (timed windows expire)
//!                3. devices.update()        (monitors resolve actuator handles)
//!                          │
//!                          └──▶ EventSink
//! ```

use log::{debug, info, warn};

use crate::device::{ActuatorBank, ActuatorHandle, Context, Device, Status, Switch};
use crate::error::{ConfigError, Result};
use crate::time::Instant;

use super::commands::CommandToken;
use super::ports::EventSink;

/// Maximum non-actuator devices (monitors, groups).
pub const MAX_DEVICES: usize = 16;
/// Commands buffered between ticks.
pub const INBOX_CAPACITY: usize = 16;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    actuators: ActuatorBank,
    devices: heapless::Vec<Box<dyn Device>, MAX_DEVICES>,
    inbox: heapless::Deque<CommandToken, INBOX_CAPACITY>,
    tick_count: u64,
    init_status: Option<Status>,
    last_status: Status,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            actuators: ActuatorBank::new(),
            devices: heapless::Vec::new(),
            inbox: heapless::Deque::new(),
            tick_count: 0,
            init_status: None,
            last_status: Status::Idle,
        }
    }

    // ── Registration ──────────────────────────────────────────

    /// Register an actuator.  The returned handle is what monitors hold.
    pub fn add_actuator(&mut self, actuator: Box<dyn Switch>) -> Result<ActuatorHandle> {
        if self.device(actuator.name()).is_some() {
            return Err(ConfigError::DuplicateName.into());
        }
        self.actuators.register(actuator)
    }

    /// Register a non-actuator device.  Registration order is update order.
    pub fn add_device(&mut self, device: Box<dyn Device>) -> Result<()> {
        if self.device(device.name()).is_some() || self.actuators.find(device.name()).is_some() {
            warn!("Controller: duplicate name '{}'", device.name());
            return Err(ConfigError::DuplicateName.into());
        }
        info!("Controller: '{}' registered", device.name());
        self.devices
            .push(device)
            .map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(())
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise actuators, then devices.  Failures are reported once and
    /// the controller keeps running; there is no retry.
    pub fn initialize(&mut self, now: Instant, sink: &mut dyn EventSink) -> Status {
        let mut status = self.actuators.initialize_all(now, sink);
        let mut ctx = Context::with_actuators(now, sink, &mut self.actuators);
        for device in &mut self.devices {
            status = status.worst(device.initialize(&mut ctx));
        }
        match status.error() {
            Some(e) => warn!("Controller: initialised degraded ({})", e),
            None => info!(
                "Controller: {} actuators, {} devices ready",
                self.actuators.len(),
                self.devices.len()
            ),
        }
        self.init_status = Some(status);
        status
    }

    /// Queue a decoded command for the next tick.  A full inbox hands the
    /// command back.
    pub fn enqueue(&mut self, cmd: CommandToken) -> core::result::Result<(), CommandToken> {
        self.inbox.push_back(cmd).inspect_err(|cmd| {
            warn!("Controller: inbox full, dropping {:?}", cmd.verb);
        })
    }

    /// Deliver `cmd` to every actuator and device immediately.
    pub fn dispatch(&mut self, cmd: &CommandToken, now: Instant, sink: &mut dyn EventSink) {
        self.actuators.dispatch(cmd, now, sink);
        let mut ctx = Context::with_actuators(now, sink, &mut self.actuators);
        for device in &mut self.devices {
            device.process_input(cmd, &mut ctx);
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cooperative cycle.  Returns the worst status of the tick.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn EventSink) -> Status {
        self.tick_count += 1;

        while let Some(cmd) = self.inbox.pop_front() {
            debug!("Controller: tick {} command {:?}", self.tick_count, cmd);
            self.dispatch(&cmd, now, sink);
        }

        let mut status = self.actuators.update_all(now, sink);
        let mut ctx = Context::with_actuators(now, sink, &mut self.actuators);
        for device in &mut self.devices {
            status = status.worst(device.update(&mut ctx));
        }

        if status.is_degraded() && !self.last_status.is_degraded() {
            warn!("Controller: tick {} degraded (code {})", self.tick_count, status.code());
        }
        self.last_status = status;
        status
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn actuator_handle(&self, name: &str) -> Option<ActuatorHandle> {
        self.actuators.find(name)
    }

    pub fn actuator(&self, handle: ActuatorHandle) -> Option<&(dyn Switch + 'static)> {
        self.actuators.get(handle)
    }

    pub fn actuators(&self) -> &ActuatorBank {
        &self.actuators
    }

    pub fn device(&self, name: &str) -> Option<&(dyn Device + 'static)> {
        self.devices.iter().find(|d| d.name() == name).map(|d| &**d)
    }

    pub fn devices(&self) -> impl Iterator<Item = &(dyn Device + 'static)> {
        self.devices.iter().map(|d| &**d)
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Outcome of [`initialize`](Self::initialize), `None` before it ran.
    pub fn init_status(&self) -> Option<Status> {
        self.init_status
    }

    pub fn last_status(&self) -> Status {
        self.last_status
    }

    pub fn pending_commands(&self) -> usize {
        self.inbox.len()
    }
}
