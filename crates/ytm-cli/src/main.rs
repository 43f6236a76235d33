mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::yields::{PriceArgs, SolveArgs};

/// Bond yield-to-maturity calculations
#[derive(Parser)]
#[command(
    name = "ytm",
    version,
    about = "Bond yield-to-maturity calculations",
    long_about = "Solves for the yield to maturity of a fixed-coupon bond by \
                  Newton-Raphson on the discounted cash-flow price, with decimal \
                  precision. Also prices a bond off a given yield."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for yield to maturity from a market price
    Solve(SolveArgs),
    /// Price a bond off a flat yield
    Price(PriceArgs),
    /// Prompt for bond terms on the terminal and print the YTM
    Interactive,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Solve(args) => commands::yields::run_solve(args),
        Commands::Price(args) => commands::yields::run_price(args),
        Commands::Interactive => {
            if let Err(e) = commands::interactive::run_interactive() {
                fail(e);
            }
            return;
        }
        Commands::Version => {
            println!("ytm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result.and_then(|value| output::render(&cli.output, &value)) {
        Ok(rendered) => {
            println!("{}", rendered);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}
