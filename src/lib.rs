//! Demeter greenhouse controller core.
//!
//! Device lifecycle, actuator state machines, composite fan-out and the
//! soil-moisture control loop, all behind port traits so the same code runs
//! on a board or against the host simulator.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod device;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod ranged;
pub mod sensors;
pub mod time;


pub use error::{Error, Result};
