//! Application core: command intake, event output, port traits and the
//! controller that schedules every device.
//!
//! All interaction with hardware happens through the **port traits** in
//! [`ports`], so the whole core runs against mocks in tests.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod wiring;

pub use service::Controller;
