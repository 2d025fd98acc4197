//! CSV Engine CLI
//!
//! Command-line interface for tokenizing CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- input.csv
//! cargo run -- --strategy async --format json input.csv
//! cargo run -- --delimiter '||' --allow-comments --no-header input.csv
//! cargo run -- --config options.json --lenient --format csv input.csv > normalized.csv
//! ```
//!
//! Records go to stdout in the selected format. Diagnostics go to stderr and are
//! filtered with `RUST_LOG` (default `warn`).
//!
//! # Processing Strategies
//!
//! - **sync**: blocking block reads on the calling thread (default)
//! - **async**: block reads awaited on a tokio multi-thread runtime
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid options, file not found, unrecovered bad data, etc.)

use rust_csv_engine::cli;
use rust_csv_engine::strategy;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::parse_args();

    let config = match args.to_options().and_then(|options| options.build()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let strategy = strategy::create_strategy(args.strategy, config, args.format);

    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
