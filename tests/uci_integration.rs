use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use chess_engine::board::{generate_legal_moves, Board};
use chess_engine::moves::GenMode;

#[test]
fn uci_session_produces_a_legal_bestmove() {
    let exe = env!("CARGO_BIN_EXE_chess_engine");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    writeln!(stdin, "uci").unwrap();
    writeln!(stdin, "isready").unwrap();
    writeln!(stdin, "position startpos moves e2e4").unwrap();
    writeln!(stdin, "go movetime 200").unwrap();

    let mut bestmove_line = None;
    let mut line = String::new();
    while bestmove_line.is_none() {
        line.clear();
        let n = stdout.read_line(&mut line).expect("reading engine stdout");
        assert_ne!(n, 0, "engine exited before printing bestmove");
        if line.trim_start().starts_with("bestmove") {
            bestmove_line = Some(line.trim().to_string());
        }
    }
    let bestmove_line = bestmove_line.unwrap();

    writeln!(stdin, "quit").unwrap();
    drop(stdin);
    let status = child.wait().expect("waiting for engine process");
    assert!(status.success());

    let parts: Vec<&str> = bestmove_line.split_whitespace().collect();
    assert!(parts.len() >= 2, "bestmove line missing a move: {bestmove_line}");
    let mv_uci = parts[1];
    assert_ne!(mv_uci, "0000", "engine returned the null move");

    let mut board = Board::from_xfen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", false).unwrap();
    let e2e4 = generate_legal_moves(&board, GenMode::All)
        .iter()
        .find(|m| m.to_uci(None) == "e2e4")
        .copied()
        .expect("e2e4 should be legal from the starting position");
    board.make_move(e2e4);

    let legal = generate_legal_moves(&board, GenMode::All);
    assert!(legal.iter().any(|m| m.to_uci(None) == mv_uci), "bestmove {mv_uci} is not legal in the resulting position");
}

#[test]
fn cli_dialect_accepts_usermove_and_reports_the_board() {
    let exe = env!("CARGO_BIN_EXE_chess_engine");
    let mut child = Command::new(exe)
        .arg("--protocol")
        .arg("cli")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let input = b"usermove e2e4\ndisplay\nexit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l.contains('/')), "display should print an (X)FEN-shaped line");
}
