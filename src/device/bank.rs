//! Actuator table and non-owning handles.
//!
//! The bank owns every top-level actuator for the process lifetime.  Other
//! devices refer to an actuator by [`ActuatorHandle`] and resolve it through
//! the tick [`Context`] for the duration of a single call, so nothing but
//! the bank ever holds the actuator itself.

use log::{debug, info, warn};

use super::{Context, Status, Switch};
use crate::app::commands::CommandToken;
use crate::app::ports::EventSink;
use crate::error::{ConfigError, Result};
use crate::time::Instant;

/// Maximum number of top-level actuators.
pub const MAX_ACTUATORS: usize = 16;

/// Index of an actuator in an [`ActuatorBank`].  Copyable, carries no
/// ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActuatorHandle(usize);

impl ActuatorHandle {
    pub const fn index(self) -> usize {
        self.0
    }
}

pub struct ActuatorBank {
    slots: heapless::Vec<Box<dyn Switch>, MAX_ACTUATORS>,
}

impl Default for ActuatorBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorBank {
    pub fn new() -> Self {
        Self {
            slots: heapless::Vec::new(),
        }
    }

    /// Take ownership of an actuator.  Names must be unique.
    pub fn register(&mut self, actuator: Box<dyn Switch>) -> Result<ActuatorHandle> {
        if self.find(actuator.name()).is_some() {
            warn!("ActuatorBank: duplicate name '{}'", actuator.name());
            return Err(ConfigError::DuplicateName.into());
        }
        let handle = ActuatorHandle(self.slots.len());
        info!("ActuatorBank: '{}' registered at slot {}", actuator.name(), handle.0);
        self.slots
            .push(actuator)
            .map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(handle)
    }

    pub fn find(&self, name: &str) -> Option<ActuatorHandle> {
        self.slots
            .iter()
            .position(|s| s.name() == name)
            .map(ActuatorHandle)
    }

    pub fn get(&self, handle: ActuatorHandle) -> Option<&(dyn Switch + 'static)> {
        self.slots.get(handle.0).map(|slot| &**slot)
    }

    pub fn get_mut(&mut self, handle: ActuatorHandle) -> Option<&mut (dyn Switch + 'static)> {
        match self.slots.get_mut(handle.0) {
            Some(slot) => Some(&mut **slot),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Switch + 'static)> {
        self.slots.iter().map(|slot| &**slot)
    }

    /// Initialise every actuator in registration order.
    pub fn initialize_all(&mut self, now: Instant, sink: &mut dyn EventSink) -> Status {
        let mut ctx = Context::new(now, sink);
        self.slots
            .iter_mut()
            .fold(Status::Idle, |acc, s| acc.worst(s.initialize(&mut ctx)))
    }

    /// Per-tick update: timed actuators check their windows here.
    pub fn update_all(&mut self, now: Instant, sink: &mut dyn EventSink) -> Status {
        let mut ctx = Context::new(now, sink);
        self.slots
            .iter_mut()
            .fold(Status::Idle, |acc, s| acc.worst(s.update(&mut ctx)))
    }

    pub fn dispatch(&mut self, cmd: &CommandToken, now: Instant, sink: &mut dyn EventSink) {
        debug!("ActuatorBank: dispatch {:?}", cmd);
        let mut ctx = Context::new(now, sink);
        for slot in &mut self.slots {
            slot.process_input(cmd, &mut ctx);
        }
    }
}
