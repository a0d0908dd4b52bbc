use std::time::Duration;

use chess_engine::config::EngineConfig;
use chess_engine::engine::{Command, CommandOutcome, Engine};
use chess_engine::time::GoRequest;

fn wait_for_outcome(engine: &mut Engine, timeout: Duration) -> CommandOutcome {
    let start = std::time::Instant::now();
    loop {
        if let Some(outcome) = engine.poll() {
            return outcome;
        }
        assert!(start.elapsed() < timeout, "engine did not produce an outcome in time");
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn go_then_poll_produces_a_legal_move() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.dispatch(Command::New).unwrap();
    engine.dispatch(Command::SetDepth(3)).unwrap();
    engine.dispatch(Command::Go(GoRequest { depth: Some(3), ..GoRequest::default() })).unwrap();

    let outcome = wait_for_outcome(&mut engine, Duration::from_secs(10));
    match outcome {
        CommandOutcome::MoveMade { notation, stats } => {
            assert_ne!(notation, "0000");
            assert!(stats.is_some());
        }
        other => panic!("expected MoveMade, got {other:?}"),
    }
    assert_eq!(engine.state_name(), "waiting");
}

#[test]
fn set_fen_then_usermove_then_go_completes_the_state_machine_discipline_sequence() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.dispatch(Command::SetFen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string())).unwrap();
    engine.dispatch(Command::SetDepth(2)).unwrap();

    let outcome = engine.dispatch(Command::Go(GoRequest { depth: Some(2), ..GoRequest::default() })).unwrap();
    assert!(matches!(outcome, CommandOutcome::SearchStarted));
    assert_eq!(engine.state_name(), "searching");

    let stopped = engine.dispatch(Command::Stop).unwrap();
    assert!(matches!(stopped, CommandOutcome::SearchStopped));
    assert_eq!(engine.state_name(), "waiting");

    let forced = engine.dispatch(Command::Force).unwrap();
    assert!(matches!(forced, CommandOutcome::Ok));
    assert_eq!(engine.state_name(), "observing");
}

#[test]
fn per_move_time_control_publishes_a_move_within_its_budget_plus_slack() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.dispatch(Command::New).unwrap();
    engine.dispatch(Command::SetMoveTime(Duration::from_millis(200))).unwrap();

    let start = std::time::Instant::now();
    engine.dispatch(Command::Go(GoRequest::default())).unwrap();
    let outcome = wait_for_outcome(&mut engine, Duration::from_millis(500));
    assert!(matches!(outcome, CommandOutcome::MoveMade { .. }));
    assert!(start.elapsed() < Duration::from_millis(500), "bestmove published too late: {:?}", start.elapsed());
}

#[test]
fn perft_from_observing_returns_known_node_count() {
    let mut engine = Engine::new(EngineConfig::default());
    let outcome = engine.dispatch(Command::Perft(3)).unwrap();
    assert!(matches!(outcome, CommandOutcome::PerftStarted));

    let outcome = wait_for_outcome(&mut engine, Duration::from_secs(10));
    assert!(matches!(outcome, CommandOutcome::PerftResult(8_902)));
    assert_eq!(engine.state_name(), "observing");
}
