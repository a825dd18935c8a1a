//! Sensor-driven devices and host-side probe simulation.

pub mod sim;
pub mod soil;

pub use sim::SimulatedProbe;
pub use soil::SoilMonitor;
