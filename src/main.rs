use bridge::cli::commands::Cli;
use bridge::cli::handlers;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // No subcommand → launch TUI
        None => bridge::tui::run(cli.api_url.as_deref(), cli.project),
        Some(_) => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
