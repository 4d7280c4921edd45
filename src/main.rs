use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use csv2influx::cli::Cli;
use csv2influx::import_file;

fn main() -> Result<()> {
    let args = Cli::parse();

    setup_logging(&args)?;

    let config = args.run_config()?;
    let conn = args.connection()?;

    // One row at a time, each flush awaited before the next row is read
    let runtime = tokio::runtime::Builder::new_current_thread()
        .thread_name("csv2influx")
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let summary = runtime
        .block_on(import_file(&args.input, &config, &conn))
        .with_context(|| format!("Import of {} failed", args.input.display()))?;

    info!(
        "Read {} lines, wrote {} points",
        summary.lines_read, summary.points_written
    );
    Ok(())
}

// Console logging, plus a debug log file when one is given
fn setup_logging(args: &Cli) -> Result<()> {
    let default_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    match &args.log_file {
        Some(path) => {
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            let console_logger = pretty_env_logger::formatted_builder()
                .parse_filters(&default_filter)
                .build();

            let file_logger = pretty_env_logger::formatted_builder()
                .parse_filters("debug")
                .target(pretty_env_logger::env_logger::Target::Pipe(Box::new(log_file)))
                .build();

            log::set_boxed_logger(Box::new(LogDispatcher {
                console: console_logger,
                file: file_logger,
            }))?;
            log::set_max_level(log::LevelFilter::Debug);
        }
        None => {
            pretty_env_logger::formatted_builder()
                .parse_filters(&default_filter)
                .try_init()?;
        }
    }

    Ok(())
}

// Sends every record to both the console and the log file
struct LogDispatcher {
    console: pretty_env_logger::env_logger::Logger,
    file: pretty_env_logger::env_logger::Logger,
}

impl log::Log for LogDispatcher {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.console.enabled(metadata) || self.file.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        self.console.log(record);
        self.file.log(record);
    }

    fn flush(&self) {
        self.console.flush();
        self.file.flush();
    }
}
