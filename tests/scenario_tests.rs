//! Scenario-based integration tests
//!
//! Drives the full behavior layer through timelines of obstruction contacts
//! and checks the resulting command sequences.
//!
//! ```bash
//! RUST_LOG=pratikriya=debug cargo test --test scenario_tests -- --nocapture
//! ```

use std::path::PathBuf;

use pratikriya::harness::{ContactWindow, Scenario, Trace, load_scenario, run_scenario};
use pratikriya::{
    AvoidanceConfig, AvoidanceState, Command, ReflexConfig, StuckConfig, StuckState, Timestamp,
    TurnDirection,
};

fn init_logging() {
    env_logger::try_init().ok();
}

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn run_file(name: &str) -> Trace {
    init_logging();
    let scenario = load_scenario(data_path(name)).expect("scenario should load");
    run_scenario(&scenario).expect("scenario should run")
}

/// Avoidance rounds of 30 ms with contact that never clears.
fn rapid_bump_config() -> ReflexConfig {
    ReflexConfig {
        avoidance: AvoidanceConfig {
            reverse_ms: 10,
            turn_ms: 10,
            settle_ms: 10,
            ..Default::default()
        },
        stuck: StuckConfig {
            initial_agitation: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_idle_sensor_ten_cycles() {
    init_logging();
    let trace = run_scenario(&Scenario::new("idle", 90)).unwrap();

    assert_eq!(trace.records.len(), 10);
    assert_eq!(trace.bump_count(), 0);
    for record in &trace.records {
        assert_eq!(record.avoidance_state, AvoidanceState::Idle);
        assert_eq!(record.output.avoidance, Command::DISABLED);
        assert_eq!(record.stuck_state, StuckState::Idle);
    }
    // Only the startup agitation, drained one step at t = 50
    assert_eq!(trace.last().unwrap().agitation, 49);
}

#[test]
fn test_center_bump_sequence() {
    let trace = run_file("center_bump.toml");

    assert_eq!(trace.bump_count(), 1);
    let at = |t| trace.at(t).unwrap();

    assert!(at(0).output.bumped);
    assert_eq!(
        at(0).avoidance_state,
        AvoidanceState::Reversing {
            escape: TurnDirection::Left
        }
    );
    assert_eq!(at(0).output.avoidance, Command::drive(-5, 0));
    // Contact still sensed on the next cycle is ignored
    assert!(at(10).reading.any());
    assert!(!at(10).output.bumped);

    assert_eq!(at(2490).output.avoidance, Command::drive(-5, 0));
    assert_eq!(at(2500).avoidance_state, AvoidanceState::Turning(TurnDirection::Left));
    assert_eq!(at(2500).output.avoidance, Command::drive(0, -6));
    assert_eq!(at(3990).output.avoidance, Command::drive(0, -6));
    assert_eq!(at(4000).avoidance_state, AvoidanceState::Settling);
    assert_eq!(at(4000).output.avoidance, Command::halt());
    assert_eq!(at(4990).output.avoidance, Command::halt());
    assert_eq!(at(5000).avoidance_state, AvoidanceState::Idle);
    assert_eq!(at(5000).output.avoidance, Command::DISABLED);

    // One bump is nowhere near the escalation threshold
    assert!(trace.escalations().is_empty());
    assert_eq!(trace.last().unwrap().output.stuck, Command::DISABLED);
}

#[test]
fn test_six_rapid_bumps_escalate() {
    init_logging();
    let scenario = Scenario::new("six_bumps", 4200)
        .with_config(rapid_bump_config())
        .with_contact(ContactWindow {
            from_ms: 0,
            until_ms: 100_000,
            center: true,
            ..Default::default()
        });
    let trace = run_scenario(&scenario).unwrap();

    let bumps_before: Vec<_> = trace
        .records
        .iter()
        .filter(|r| r.output.bumped && r.now() <= Timestamp(150))
        .map(|r| r.now().as_millis())
        .collect();
    assert_eq!(bumps_before, vec![0, 30, 60, 90, 120, 150]);

    // Fifth bump leaves agitation at the threshold, the sixth crosses it
    assert_eq!(trace.at(120).unwrap().stuck_state, StuckState::Idle);
    assert_eq!(trace.escalations(), vec![Timestamp(150)]);

    for record in trace
        .records
        .iter()
        .filter(|r| r.now() >= Timestamp(150) && r.now() < Timestamp(4150))
    {
        assert_eq!(record.stuck_state, StuckState::Escaping);
        assert_eq!(record.output.stuck, Command::drive(0, -5));
    }

    let end = trace.at(4150).unwrap();
    assert_eq!(end.stuck_state, StuckState::Idle);
    assert_eq!(end.agitation, 0);
    assert_eq!(end.output.stuck, Command::DISABLED);
}

#[test]
fn test_occasional_bumps_never_escalate() {
    init_logging();
    let mut scenario = Scenario::new("occasional", 60_000);
    for i in 0..10 {
        scenario = scenario.with_contact(ContactWindow {
            from_ms: i * 6000,
            until_ms: i * 6000 + 20,
            left: true,
            ..Default::default()
        });
    }
    let trace = run_scenario(&scenario).unwrap();

    assert_eq!(trace.bump_count(), 10);
    assert!(trace.escalations().is_empty());
    assert!(trace.peak_agitation() <= 100);
}

#[test]
fn test_corner_trap_escalates_and_forgives() {
    let trace = run_file("corner_trap.toml");

    let escalations = trace.escalations();
    assert!(escalations.len() >= 2, "escalations: {:?}", escalations);
    assert!(escalations[0] < Timestamp(2000));

    for pair in escalations.windows(2) {
        assert!(pair[1].since(pair[0]) > 4000);
    }

    let first = escalations[0];
    let end = trace.at(first.as_millis() + 4000).unwrap();
    assert_eq!(end.stuck_state, StuckState::Idle);
    assert_eq!(end.agitation, 0);

    let before_end = trace.at(first.as_millis() + 3990).unwrap();
    assert_eq!(before_end.stuck_state, StuckState::Escaping);
    assert_eq!(before_end.output.stuck, Command::drive(0, -5));
}

#[test]
fn test_hallway_contacts() {
    let trace = run_file("hallway.toml");

    // The unlocalized contact has no escape direction and is ignored
    assert_eq!(trace.bump_count(), 4);
    assert!(trace.escalations().is_empty());
    assert_eq!(trace.at(25000).unwrap().avoidance_state, AvoidanceState::Idle);

    let turn_at = |bump_ms: u64| trace.at(bump_ms + 2500).unwrap().avoidance_state;
    assert_eq!(turn_at(1000), AvoidanceState::Turning(TurnDirection::Right));
    assert_eq!(turn_at(9000), AvoidanceState::Turning(TurnDirection::Left));
    assert_eq!(turn_at(17000), AvoidanceState::Turning(TurnDirection::Left));
    assert_eq!(turn_at(33000), AvoidanceState::Turning(TurnDirection::Left));

    // Manual override keeps driving forward the whole time
    assert!(
        trace
            .records
            .iter()
            .all(|r| r.output.manual == Command::drive(5, 0))
    );
}

#[test]
fn test_dwell_never_exceeds_bound_by_a_cycle() {
    init_logging();
    let cycle_ms = 7;
    let scenario = Scenario::new("dwell", 6000)
        .with_cycle_ms(cycle_ms)
        .with_contact(ContactWindow {
            from_ms: 0,
            until_ms: 5,
            right: true,
            ..Default::default()
        });
    let trace = run_scenario(&scenario).unwrap();

    let bound = |state: AvoidanceState| match state {
        AvoidanceState::Reversing { .. } => 2500,
        AvoidanceState::Turning(_) => 1500,
        AvoidanceState::Settling => 1000,
        AvoidanceState::Idle => u64::MAX,
    };

    let mut entered = trace.records[0].now();
    let mut current = trace.records[0].avoidance_state;
    let mut checked = 0;
    for record in &trace.records[1..] {
        if record.avoidance_state != current {
            let dwell = record.now().since(entered);
            assert!(dwell >= bound(current), "{} left after {}ms", current.name(), dwell);
            assert!(dwell < bound(current) + cycle_ms);
            checked += 1;
            entered = record.now();
            current = record.avoidance_state;
        }
    }
    assert_eq!(checked, 3);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pratikriya.toml");

    let mut config = ReflexConfig::default();
    config.avoidance.reverse_ms = 1800;
    config.stuck.escape_ms = 3500;
    config.save(&path).unwrap();

    let loaded = ReflexConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReflexConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, pratikriya::Error::Io(_)));
}

#[test]
fn test_scenario_file_with_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        "name = \"broken\"\nduration_ms = 100\n\n[config.stuck]\nescape_ms = 0\n",
    )
    .unwrap();

    let err = load_scenario(&path).unwrap_err();
    assert!(matches!(err, pratikriya::Error::InvalidParameter(_)));
}
