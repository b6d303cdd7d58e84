use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use blazon::cli::{Cli, Commands};
use blazon::output::Printer;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("blazon={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let printer = Printer::new();
    let config = cli.load_config()?;

    match cli.command {
        Commands::Fmt(args) => {
            blazon::cli::fmt::run(args, &config, &printer)?;
        }
        Commands::Check(args) => blazon::cli::check::run(args, &config, &printer)?,
        Commands::Info(args) => blazon::cli::info::run(args, &config, &printer)?,
        Commands::Extract(args) => blazon::cli::extract::run(args, &config)?,
        Commands::Colours(args) => blazon::cli::colours::run(args, &printer)?,
        Commands::Completions(args) => blazon::cli::completions::run(args)?,
    }

    Ok(())
}
