//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements | Connects to                  |
//! |------------|------------|------------------------------|
//! | `hardware` | Board      | Simulated pins and probes    |
//! | `log_sink` | EventSink  | `log` facade                 |
//! | `time`     | clock      | `std::time::Instant`         |

pub mod hardware;
pub mod log_sink;
pub mod time;
