mod report;
mod settings;

use clap::Parser;
use gps_track_lib::{DiagnosticSink, Track};
use report::Report;
use settings::Settings;
use std::process::ExitCode;
use std::sync::Arc;

/// Initialize logging to stderr, honoring `RUST_LOG` when set
fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
}

/// Load, query and summarise; every library failure is printed by the sink
fn run(settings: &Settings) -> ExitCode {
    let sink: DiagnosticSink = Arc::new(|message: &str| eprintln!("{message}"));
    let mut track = Track::with_config(settings.track_config()).with_diagnostics(sink);

    let Ok(loaded) = track.load_file(&settings.track) else {
        return ExitCode::FAILURE;
    };
    tracing::info!("Loaded {} samples from {}", loaded, settings.track.display());

    if settings.debug {
        for line in track.dump() {
            println!("{line}");
        }
    }

    match Report::build(&track, &settings.date) {
        Ok(report) => {
            print!("{report}");
            if report.fix.is_some() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(_) => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    setup_logging();
    let settings = Settings::parse();
    run(&settings)
}
