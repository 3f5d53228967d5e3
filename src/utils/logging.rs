//! Logging setup.
//!
//! Logs go to stdout by default. With `LOG_MODE=file` they go to a daily rolling file
//! `deposit-monitor.log` under `LOG_DATA_DIR` (default `logs/`). The filter comes from
//! `RUST_LOG`, then `LOG_LEVEL`, then defaults to `info`.

use std::env;
use tracing_appender::rolling;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default directory for log files
pub const DEFAULT_LOG_DIR: &str = "logs";

/// File name prefix of rolled log files
pub const LOG_FILE_PREFIX: &str = "deposit-monitor.log";

/// Where log output is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMode {
	Stdout,
	File { dir: String },
}

impl LogMode {
	/// Reads the mode from `LOG_MODE` and `LOG_DATA_DIR`
	pub fn from_env() -> Self {
		match env::var("LOG_MODE") {
			Ok(mode) if mode.eq_ignore_ascii_case("file") => Self::File {
				dir: env::var("LOG_DATA_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string()),
			},
			_ => Self::Stdout,
		}
	}
}

fn env_filter() -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
		EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
	})
}

/// Setup logging for the application according to [`LogMode::from_env`]
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	match LogMode::from_env() {
		LogMode::Stdout => setup_logging_with_writer(std::io::stdout),
		LogMode::File { dir } => {
			std::fs::create_dir_all(&dir)?;
			setup_logging_with_writer(rolling::daily(dir, LOG_FILE_PREFIX))
		}
	}
}

/// Setup logging for the application with a custom writer
pub fn setup_logging_with_writer<W>(
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry()
		.with(env_filter())
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(false)
						.compact(),
				)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;
	Ok(())
}
