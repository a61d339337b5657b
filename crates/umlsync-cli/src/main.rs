//! umlsync CLI - Format, validate and resolve PlantUML class diagrams

mod cli;

use clap::Parser;

fn main() {
    // Logging is configured inside run() from flags and environment
    let cli_args = cli::Cli::parse();

    let mut app = cli::UmlsyncApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
