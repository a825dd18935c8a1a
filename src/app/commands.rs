//! Inbound command tokens.
//!
//! The serial parser (outside this crate) decodes raw bytes into
//! [`CommandToken`]s; the [`Controller`](super::service::Controller) queues
//! them and hands each one to every device's `process_input`.  Leaf devices
//! act on tokens addressed to their own name or broadcast to all.

use crate::device::{Name, device_name};
use crate::error::Result;

/// Who a command is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every device.
    All,
    /// The device (or composite) with this name.
    Device(Name),
}

/// What the command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Switch on.  On a monitor: resume automatic actuation.
    On,
    /// Switch off.  On a monitor: suspend automatic actuation.
    Off,
    /// Force a switch off.  Monitors ignore it.
    Reset,
    /// Show a 0..=100 level (LED group bar display).
    Level,
}

/// A decoded instruction: target, verb and an optional numeric argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandToken {
    pub target: Target,
    pub verb: Verb,
    pub value: Option<i32>,
}

impl CommandToken {
    /// Address a single device by name.
    pub fn to(name: &str, verb: Verb) -> Result<Self> {
        Ok(Self {
            target: Target::Device(device_name(name)?),
            verb,
            value: None,
        })
    }

    /// Address every device.
    pub fn broadcast(verb: Verb) -> Self {
        Self {
            target: Target::All,
            verb,
            value: None,
        }
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    /// True when a device called `name` should act on this token.
    pub fn targets(&self, name: &str) -> bool {
        match &self.target {
            Target::All => true,
            Target::Device(n) => n.as_str() == name,
        }
    }

    /// Same verb and value, addressed to everyone.  Composites use this to
    /// relay a command aimed at the group to each child.
    pub fn rebroadcast(&self) -> Self {
        Self {
            target: Target::All,
            verb: self.verb,
            value: self.value,
        }
    }
}
