//! Composite devices: one [`Device`] to the scheduler, many children inside.
//!
//! Children are visited in declaration order on every call, unconditionally.
//! A failing child degrades the composite's status but never stops its
//! siblings from initialising, updating, or seeing a command.

use log::{debug, warn};

use super::{Context, Device, Name, Status, device_name};
use crate::app::commands::{CommandToken, Target};
use crate::error::{ConfigError, Result};

/// Maximum children per composite.
pub const MAX_CHILDREN: usize = 8;

// ── Fan-out helpers (shared with fixed-shape groups) ─────────────

/// `initialize` every child, worst-of.
pub fn initialize_each<'d, D>(
    children: impl IntoIterator<Item = &'d mut D>,
    ctx: &mut Context<'_>,
) -> Status
where
    D: Device + ?Sized + 'd,
{
    children
        .into_iter()
        .fold(Status::Idle, |acc, child| acc.worst(child.initialize(ctx)))
}

/// `update` every child, worst-of.
pub fn update_each<'d, D>(
    children: impl IntoIterator<Item = &'d mut D>,
    ctx: &mut Context<'_>,
) -> Status
where
    D: Device + ?Sized + 'd,
{
    children
        .into_iter()
        .fold(Status::Idle, |acc, child| acc.worst(child.update(ctx)))
}

/// Forward `cmd` to every child.  A command addressed to the group itself
/// is relayed to every child as a broadcast.
pub fn forward_each<'d, D>(
    group: &str,
    children: impl IntoIterator<Item = &'d mut D>,
    cmd: &CommandToken,
    ctx: &mut Context<'_>,
) where
    D: Device + ?Sized + 'd,
{
    let relayed;
    let cmd = if cmd.target != Target::All && cmd.targets(group) {
        debug!("{}: relaying {:?} to children", group, cmd.verb);
        relayed = cmd.rebroadcast();
        &relayed
    } else {
        cmd
    };
    for child in children {
        child.process_input(cmd, ctx);
    }
}

// ── CompositeDevice ──────────────────────────────────────────────

/// Owns an ordered, fixed set of child devices.  Holds no hardware of its
/// own beyond its name.
pub struct CompositeDevice {
    name: Name,
    children: heapless::Vec<Box<dyn Device>, MAX_CHILDREN>,
}

impl CompositeDevice {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: device_name(name)?,
            children: heapless::Vec::new(),
        })
    }

    /// Append a child.  Declaration order is update order.
    pub fn with_child(mut self, child: Box<dyn Device>) -> Result<Self> {
        if self.children.iter().any(|c| c.name() == child.name()) {
            return Err(ConfigError::DuplicateName.into());
        }
        if self.children.push(child).is_err() {
            warn!("{}: more than {} children", self.name, MAX_CHILDREN);
            return Err(ConfigError::CapacityExceeded.into());
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = &(dyn Device + 'static)> {
        self.children.iter().map(|c| &**c)
    }
}

impl Device for CompositeDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &mut Context<'_>) -> Status {
        let status = initialize_each(self.children.iter_mut().map(|c| &mut **c), ctx);
        if let Some(e) = status.error() {
            warn!("{}: initialised with degraded children ({})", self.name, e);
        }
        // The group itself has nothing to set up.
        Status::Ok.worst(status)
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> Status {
        update_each(self.children.iter_mut().map(|c| &mut **c), ctx)
    }

    fn process_input(&mut self, cmd: &CommandToken, ctx: &mut Context<'_>) {
        forward_each(
            &self.name,
            self.children.iter_mut().map(|c| &mut **c),
            cmd,
            ctx,
        );
    }
}
