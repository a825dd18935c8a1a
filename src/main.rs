//! Demeter host simulator.
//!
//! Wires the controller against a [`SimBoard`] and runs it on a virtual
//! clock with a crude soil model: beds dry out slowly and get wetter while
//! their actuator is on.
//!
//! ```text
//! demeter-sim [CONFIG.json] [TICKS]
//! ```
//!
//! Set `RUST_LOG=debug` for per-tick detail.

use std::fs;

use anyhow::{Context as _, Result, bail};
use log::{info, warn};

use demeter::adapters::hardware::SimBoard;
use demeter::adapters::log_sink::LogEventSink;
use demeter::adapters::time::HostClock;
use demeter::app::Controller;
use demeter::app::commands::{CommandToken, Verb};
use demeter::config::ControllerConfig;
use demeter::ranged::RangedValue;
use demeter::sensors::soil::moisture_percent;
use demeter::time::Instant;

// ---------------------------------------------------------------------------
// Soil model
// ---------------------------------------------------------------------------

/// Raw counts lost per tick while the actuator is off.
const DRYING_PER_TICK: f32 = 6.0;
/// Raw counts gained per tick while the actuator is on.
const WETTING_PER_TICK: f32 = 45.0;
/// Probe output never leaves this window, even in the model.
const MODEL_RAW_MIN: f32 = 120.0;
const MODEL_RAW_MAX: f32 = 2150.0;
/// Starting reading: fairly dry.
const MODEL_RAW_START: f32 = 700.0;

/// Ticks between LED bar refreshes.
const LEVEL_EVERY: u64 = 10;

const DEFAULT_TICKS: u64 = 600;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<ControllerConfig>(&text)
                .with_context(|| format!("parsing {path}"))?
        }
        None => ControllerConfig::default(),
    };
    let ticks: u64 = match args.next() {
        Some(n) => n.parse().with_context(|| format!("tick count '{n}'"))?,
        None => DEFAULT_TICKS,
    };
    if ticks == 0 {
        bail!("tick count must be at least 1");
    }

    info!("Demeter simulator v{}", env!("CARGO_PKG_VERSION"));

    let mut board = SimBoard::new();
    let mut ctl = Controller::from_config(&config, &mut board).context("invalid configuration")?;

    // Probe handles plus what the model needs to know about each bed.
    let mut beds = Vec::new();
    for m in &config.monitors {
        let (Some(probe), Some(handle)) = (
            board.probe(m.address),
            m.actuator.as_deref().and_then(|a| ctl.actuator_handle(a)),
        ) else {
            warn!("{}: not simulated", m.name);
            continue;
        };
        probe.set_raw(MODEL_RAW_START);
        let physical = RangedValue::bounds(m.physical_min, m.physical_max)
            .map_err(|e| anyhow::anyhow!("{}: {e}", m.name))?;
        beds.push((probe, handle, physical));
    }
    let bar = config
        .led_group
        .as_ref()
        .map(|g| g.group_name().to_owned());

    let mut sink = LogEventSink::new();
    let period = config.tick_period();
    let wall = HostClock::new();

    let status = ctl.initialize(Instant::ZERO, &mut sink);
    if status.is_degraded() {
        warn!("starting degraded (code {})", status.code());
    }
    if ctl.actuator_handle("pump").is_some() {
        if ctl.enqueue(CommandToken::to("pump", Verb::On)?).is_err() {
            warn!("startup pump command dropped");
        }
    }

    let mut now = Instant::ZERO;
    for tick in 1..=ticks {
        now = now + period;

        for (probe, handle, _) in &beds {
            let on = ctl.actuator(*handle).is_some_and(|a| a.is_on());
            let delta = if on { WETTING_PER_TICK } else { -DRYING_PER_TICK };
            probe.set_raw((probe.raw() + delta).clamp(MODEL_RAW_MIN, MODEL_RAW_MAX));
        }

        if let (Some(group), Some((probe, _, physical))) = (&bar, beds.first()) {
            if tick % LEVEL_EVERY == 0 {
                let level = moisture_percent(probe.raw(), physical);
                let cmd = CommandToken::to(group, Verb::Level)?.with_value(i32::from(level));
                if ctl.enqueue(cmd).is_err() {
                    warn!("tick {}: level update dropped", tick);
                }
            }
        }

        ctl.tick(now, &mut sink);
    }

    info!(
        "simulated {} ticks ({}) in {} ms wall time, {} events, last status code {}",
        ctl.tick_count(),
        now.duration_since(Instant::ZERO),
        wall.now().as_millis(),
        sink.emitted(),
        ctl.last_status().code()
    );
    Ok(())
}
