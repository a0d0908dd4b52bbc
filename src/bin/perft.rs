//! Standalone perft-divide binary: prints the node count contributed by
//! each root move.

use std::time::Instant;

use clap::Parser;

use chess_engine::board::{generate_legal_moves, Board};
use chess_engine::engine::perft;
use chess_engine::moves::GenMode;

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Move-count enumeration with a per-root-move breakdown")]
struct Args {
    /// Position to start from, in (X-)FEN. Defaults to the starting position.
    #[arg(long)]
    fen: Option<String>,

    /// Search depth in plies.
    #[arg(long, default_value_t = 5)]
    depth: u32,

    /// Worker threads to split root moves across.
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Interpret castling rights/notation as Chess960.
    #[arg(long, default_value_t = false)]
    chess960: bool,
}

fn main() {
    let args = Args::parse();
    let board = match args.fen {
        Some(fen) => Board::from_xfen(&fen, args.chess960).expect("invalid FEN"),
        None => Board::starting_position(),
    };

    println!("perft depth {} from {}", args.depth, board.to_xfen(args.chess960));
    let start = Instant::now();

    if args.depth == 0 {
        println!("Total: 1 in {:?}", start.elapsed());
        return;
    }

    let root_moves = generate_legal_moves(&board, GenMode::All);
    let mut total = 0u64;
    for &mv in root_moves.iter() {
        let mut child = board.clone();
        let info = child.make_move(mv);
        let nodes = perft::parallel_perft(&child, args.depth - 1, args.threads);
        child.unmake_move(mv, info);
        println!("  {}: {nodes}", mv.to_uci(None));
        total += nodes;
    }

    println!("Total: {total} in {:?}", start.elapsed());
}
