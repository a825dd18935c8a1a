//! Controller wired from configuration against mock hardware.

use demeter::app::Controller;
use demeter::app::commands::{CommandToken, Verb};
use demeter::app::events::{DiagnosticEvent, SwitchCause};
use demeter::config::ControllerConfig;
use demeter::device::Status;
use demeter::error::{ConfigError, Error, SensorError};
use demeter::pins;
use demeter::time::Instant;

use crate::mock_hw::{MockBoard, RecordingSink, ScriptedProbe};

const PROBE: u8 = 0x36;

/// Raw reading that maps to `pct` percent on the 200..2000 range.
fn raw(pct: u8) -> f32 {
    200.0 + f32::from(pct) * 18.0
}

fn secs(s: u64) -> Instant {
    Instant::from_millis(s * 1_000)
}

struct Rig {
    board: MockBoard,
    probe: ScriptedProbe,
    ctl: Controller,
    sink: RecordingSink,
}

impl Rig {
    fn with_config(config: &ControllerConfig, moisture: u8) -> Self {
        let mut board = MockBoard::new();
        let probe = board.probe(PROBE);
        probe.set_raw(raw(moisture));
        let ctl = Controller::from_config(config, &mut board).unwrap();
        Self {
            board,
            probe,
            ctl,
            sink: RecordingSink::new(),
        }
    }

    /// Default greenhouse: pump (timed), mister (event), LED bar, bed-1 on
    /// the mister with a 35..65 % band.
    fn new(moisture: u8) -> Self {
        Self::with_config(&ControllerConfig::default(), moisture)
    }

    fn init(&mut self) -> Status {
        self.ctl.initialize(Instant::ZERO, &mut self.sink)
    }

    fn tick(&mut self, s: u64) -> Status {
        self.ctl.tick(secs(s), &mut self.sink)
    }

    fn send(&mut self, cmd: CommandToken) {
        self.ctl.enqueue(cmd).unwrap();
    }

    fn is_on(&self, name: &str) -> bool {
        let h = self.ctl.actuator_handle(name).unwrap();
        self.ctl.actuator(h).unwrap().is_on()
    }
}

// ── Closed loop ───────────────────────────────────────────────

#[test]
fn mister_follows_soil_moisture() {
    let mut rig = Rig::new(20);
    assert_eq!(rig.init(), Status::Ok);
    let mister = rig.board.pin(pins::MISTER_GPIO);
    assert_eq!(mister.writes(), [false], "initialise drives the output low");

    for s in 1..=5 {
        assert_eq!(rig.tick(s), Status::Ok);
    }
    assert!(mister.level());
    assert_eq!(mister.rising_edges(), 1, "repeated on requests must not re-toggle");
    assert_eq!(rig.sink.switch_changes("mister", SwitchCause::Monitor), 1);

    rig.probe.set_raw(raw(50));
    for s in 6..=8 {
        rig.tick(s);
    }
    assert!(mister.level(), "inside the band nothing changes");

    rig.probe.set_raw(raw(65));
    rig.tick(9);
    assert!(!mister.level());
    assert_eq!(mister.writes(), [false, true, false]);
}

#[test]
fn decision_uses_the_sample_of_the_same_tick() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.probe.queue(&[raw(10), raw(90)]);
    rig.tick(1);
    assert!(rig.is_on("mister"));
    rig.tick(2);
    assert!(!rig.is_on("mister"));
}

#[test]
fn extremes_are_reported_as_they_are_overwritten() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.probe.queue(&[raw(10), raw(30), raw(80)]);
    for s in 1..=3 {
        rig.tick(s);
    }
    let extremes: Vec<u8> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            DiagnosticEvent::NewExtreme { value, .. } => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(extremes, [10, 30, 80]);
}

#[test]
fn out_of_range_sample_is_clamped_not_an_error() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.probe.set_raw(2_600.0);
    assert_eq!(rig.tick(1), Status::Ok);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, DiagnosticEvent::OutOfPhysicalRange { .. })),
        1
    );
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        DiagnosticEvent::Sample { moisture: 100, .. }
    )));
}

// ── Timed actuators ───────────────────────────────────────────

#[test]
fn pump_command_runs_exactly_one_minute() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.send(CommandToken::to("pump", Verb::On).unwrap());
    rig.tick(1);
    assert!(rig.is_on("pump"));

    for s in 2..=60 {
        rig.tick(s);
        assert!(rig.is_on("pump"), "still inside the window at {s}s");
    }
    rig.tick(61);
    assert!(!rig.is_on("pump"));
    assert_eq!(rig.sink.switch_changes("pump", SwitchCause::Expired), 1);

    for s in 62..=200 {
        rig.tick(s);
    }
    let pump = rig.board.pin(pins::PUMP_GPIO);
    assert_eq!(pump.writes(), [false, true, false]);
}

#[test]
fn repeated_pump_command_does_not_extend_window() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.send(CommandToken::to("pump", Verb::On).unwrap());
    rig.tick(1);
    rig.send(CommandToken::to("pump", Verb::On).unwrap());
    rig.tick(30);
    rig.tick(61);
    assert!(!rig.is_on("pump"));
}

#[test]
fn monitor_retriggers_timed_pump_after_expiry() {
    let mut config = ControllerConfig::default();
    config.monitors[0].actuator = Some("pump".into());
    let mut rig = Rig::with_config(&config, 10);
    rig.init();

    rig.tick(1);
    assert!(rig.is_on("pump"));
    for s in 2..=60 {
        rig.tick(s);
    }
    // The window closes, then the still-dry bed turns the pump back on.
    rig.tick(61);
    assert!(rig.is_on("pump"));
    assert_eq!(rig.sink.switch_changes("pump", SwitchCause::Expired), 1);
    assert_eq!(rig.sink.switch_changes("pump", SwitchCause::Monitor), 2);
    assert_eq!(rig.board.pin(pins::PUMP_GPIO).rising_edges(), 2);
    assert!(!rig.is_on("mister"));
}

// ── Degraded operation ────────────────────────────────────────

#[test]
fn unreachable_probe_degrades_but_loop_continues() {
    let mut board = MockBoard::new();
    let probe = board.probe(PROBE);
    probe.set_online(false);
    let mut ctl = Controller::from_config(&ControllerConfig::default(), &mut board).unwrap();
    let mut sink = RecordingSink::new();

    let init = ctl.initialize(Instant::ZERO, &mut sink);
    assert_eq!(init, Status::Degraded(Error::Init("soil probe unreachable")));
    assert_ne!(init.code(), 0);

    ctl.enqueue(CommandToken::to("pump", Verb::On).unwrap()).unwrap();
    let status = ctl.tick(secs(1), &mut sink);
    assert_eq!(status, Status::Degraded(SensorError::NotInitialized.into()));
    assert_eq!(probe.raw_reads(), 0, "a failed probe is never polled");

    let pump = ctl.actuator_handle("pump").unwrap();
    assert!(ctl.actuator(pump).unwrap().is_on(), "siblings keep working");
    assert_eq!(
        sink.count(|e| matches!(e, DiagnosticEvent::InitFailed { .. })),
        1,
        "init failure is reported once"
    );
}

#[test]
fn failed_sample_keeps_last_decision() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.probe.queue(&[raw(20)]);
    rig.probe.queue_failure();
    rig.probe.queue(&[raw(70)]);

    assert_eq!(rig.tick(1), Status::Ok);
    assert!(rig.is_on("mister"));

    assert!(rig.tick(2).is_degraded());
    assert!(rig.is_on("mister"), "no fabricated reading, no new decision");

    assert_eq!(rig.tick(3), Status::Ok);
    assert!(!rig.is_on("mister"));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn led_bar_shows_level() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.send(
        CommandToken::to("LED Group", Verb::Level)
            .unwrap()
            .with_value(75),
    );
    rig.tick(1);
    let lit: Vec<bool> = [
        pins::LED_RED_GPIO,
        pins::LED_ORANGE_GPIO,
        pins::LED_YELLOW_GPIO,
        pins::LED_GREEN_GPIO,
    ]
    .iter()
    .map(|&p| rig.board.pin(p).level())
    .collect();
    assert_eq!(lit, [true, true, true, false]);
}

#[test]
fn broadcast_off_stops_every_actuator() {
    let mut rig = Rig::new(50);
    rig.init();
    rig.send(CommandToken::to("pump", Verb::On).unwrap());
    rig.send(CommandToken::to("mister", Verb::On).unwrap());
    rig.send(CommandToken::to("LED Group.green", Verb::On).unwrap());
    rig.tick(1);
    assert!(rig.is_on("pump") && rig.is_on("mister"));
    assert!(rig.board.pin(pins::LED_GREEN_GPIO).level());

    rig.send(CommandToken::broadcast(Verb::Off));
    rig.tick(2);
    assert!(!rig.is_on("pump") && !rig.is_on("mister"));
    assert!(!rig.board.pin(pins::LED_GREEN_GPIO).level());
}

#[test]
fn suspended_monitor_leaves_actuator_alone() {
    let mut rig = Rig::new(10);
    rig.init();
    rig.send(CommandToken::to("bed-1", Verb::Off).unwrap());
    for s in 1..=3 {
        rig.tick(s);
    }
    assert!(!rig.is_on("mister"));
    assert!(rig.probe.raw_reads() >= 3, "sampling continues");

    rig.send(CommandToken::to("bed-1", Verb::On).unwrap());
    rig.tick(4);
    assert!(rig.is_on("mister"));
}

// ── Wiring ────────────────────────────────────────────────────

#[test]
fn monitor_without_actuator_is_not_built() {
    let mut config = ControllerConfig::default();
    config.monitors[0].actuator = None;
    let result = Controller::from_config(&config, &mut MockBoard::new());
    assert_eq!(result.err(), Some(ConfigError::MissingActuator.into()));
}

#[test]
fn shared_pin_is_not_wired() {
    let mut config = ControllerConfig::default();
    config.actuators[0].pin = pins::MISTER_GPIO;
    let result = Controller::from_config(&config, &mut MockBoard::new());
    assert_eq!(
        result.err(),
        Some(ConfigError::PinInUse(pins::MISTER_GPIO).into())
    );
}

#[test]
fn actuator_named_like_a_group_led_is_not_wired() {
    let json = r#"{
        "led_group": { "pins": [8, 9, 10, 11] },
        "actuators": [ { "name": "LED Group.red", "pin": 20, "kind": "led" } ]
    }"#;
    let config: ControllerConfig = serde_json::from_str(json).unwrap();
    let result = Controller::from_config(&config, &mut MockBoard::new());
    assert_eq!(result.err(), Some(ConfigError::DuplicateName.into()));
}

#[test]
fn json_config_wires_a_working_controller() {
    let json = r#"{
        "tick_period_ms": 500,
        "actuators": [
            { "name": "drip", "pin": 3, "kind": "pump",
              "mode": { "type": "timed", "duration_ms": 2000 } }
        ],
        "monitors": [
            { "name": "herbs", "moisture_min": 40, "moisture_max": 60, "actuator": "drip" }
        ]
    }"#;
    let config: ControllerConfig = serde_json::from_str(json).unwrap();
    let mut rig = Rig::with_config(&config, 20);
    assert_eq!(rig.init(), Status::Ok);
    assert_eq!(rig.ctl.devices().count(), 1);

    rig.ctl.tick(Instant::from_millis(500), &mut rig.sink);
    assert!(rig.is_on("drip"));
    rig.probe.set_raw(raw(50));
    rig.ctl.tick(Instant::from_millis(2_500), &mut rig.sink);
    assert!(!rig.is_on("drip"), "2 s window elapsed");
}
