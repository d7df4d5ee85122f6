#![forbid(unsafe_code)]

//! `sortscope`: watch a sorting algorithm work in the terminal.
//!
//! Everything is configured through `SORTSCOPE_*` environment variables
//! (see `sortscope_core::config` and `sortscope_harness::options`). Logs go
//! to stderr, filtered by `RUST_LOG`.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use sortscope_core::RunConfig;
use sortscope_harness::app;
use sortscope_harness::options::{HarnessOptions, TraceTarget};
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    // A subscriber may already be installed when embedded; keep it.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn main() -> std::io::Result<()> {
    let options = HarnessOptions::from_env();
    init_logging(options.log_json);

    let config = RunConfig::from_env().map_err(app::into_io_error)?;

    let trace: Option<Box<dyn Write>> = match &options.trace {
        None => None,
        Some(TraceTarget::Stdout) => Some(Box::new(io::stdout())),
        Some(TraceTarget::File(path)) => Some(Box::new(BufWriter::new(File::create(path)?))),
    };
    let display: Box<dyn Write> = if options.trace_on_stdout() {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    let summary = app::run(&config, &options, display, trace)?;
    if !summary.cancelled && !summary.sorted {
        return Err(io::Error::other(format!(
            "{} finished without sorting the array",
            summary.algorithm
        )));
    }
    Ok(())
}
