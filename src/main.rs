use clap::Parser;

use chess_engine::config::{Cli, EngineConfig, Protocol};
use chess_engine::protocol::{self, OutputSink};

fn main() {
    #[cfg(feature = "logging")]
    env_logger::init();

    let cli = Cli::parse();
    let protocol = cli.protocol;
    let config = EngineConfig::from(cli);
    let sink = OutputSink::new();
    let stdin = std::io::stdin().lock();

    match protocol {
        Protocol::Uci => protocol::uci::run(stdin, &sink, config),
        Protocol::Cli => protocol::cli::run(stdin, &sink, config),
    }
}
