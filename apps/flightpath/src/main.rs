//! # Flightpath
//!
//! Command-line shell for the Flightpath progression engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/flightpath (THE SHELL)        │
//! │                                               │
//! │   ┌─────────────┐        ┌────────────────┐   │
//! │   │    CLI      │        │  AppConfig     │   │
//! │   │   (clap)    │        │  (TOML)        │   │
//! │   └──────┬──────┘        └───────┬────────┘   │
//! │          └───────────┬───────────┘            │
//! │                      ▼                        │
//! │             ┌─────────────────┐               │
//! │             │ flightpath-core │               │
//! │             │    (Engine)     │               │
//! │             └─────────────────┘               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! flightpath init
//! flightpath submit --kind quick --file responses.json
//! flightpath tech-stack --file stack.json
//! flightpath status --detailed
//! flightpath project --score 80
//! ```

use clap::Parser;
use flightpath::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // FLIGHTPATH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FLIGHTPATH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "flightpath=debug"
    } else {
        "flightpath=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
       __
   ___/  \___      FLIGHTPATH v{}
  <___  ()  _>     marketing maturity, one route at a time
      \____/
"#,
        env!("CARGO_PKG_VERSION")
    );
}
