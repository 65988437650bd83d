use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc, FormatTime};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// Whether to enable logging.
	pub enabled: bool,
	/// The log level to filter logs by.
	/// See https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
	pub level: String,
	/// The log format to use.
	pub format: LoggingFormat,
	/// Show the file info in logs.
	pub show_file_info: bool,
	/// Show the thread id in logs.
	pub show_thread_id: bool,
	/// Show timestamps in logs.
	pub timestamps: LoggingTimestamps,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			level: "info".into(),
			format: LoggingFormat::default(),
			show_file_info: true,
			show_thread_id: false,
			timestamps: LoggingTimestamps::default(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
	/// The default human-readable log format.
	#[default]
	Normal,
	/// The JSON log format.
	Json,
	/// The pretty log format.
	Pretty,
	/// The compact log format.
	Compact,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingTimestamps {
	/// Show timestamps in logs in the local timezone.
	#[default]
	Local,
	/// Show timestamps in logs in UTC.
	Utc,
	/// Do not show timestamps in logs.
	Off,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("invalid log level: {0}")]
	InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to init logger: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
}

enum TimeFormatter {
	Local(ChronoLocal),
	Utc(ChronoUtc),
	None,
}

impl FormatTime for TimeFormatter {
	fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
		match self {
			TimeFormatter::Local(formatter) => formatter.format_time(w),
			TimeFormatter::Utc(formatter) => formatter.format_time(w),
			TimeFormatter::None => ().format_time(w),
		}
	}
}

pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
	if !config.enabled {
		return Ok(());
	}

	let filter = EnvFilter::builder().parse(&config.level)?;

	let layer = tracing_subscriber::fmt::layer()
		.with_file(config.show_file_info)
		.with_line_number(config.show_file_info)
		.with_thread_ids(config.show_thread_id)
		.with_timer(match config.timestamps {
			LoggingTimestamps::Local => TimeFormatter::Local(ChronoLocal::rfc_3339()),
			LoggingTimestamps::Utc => TimeFormatter::Utc(ChronoUtc::rfc_3339()),
			LoggingTimestamps::Off => TimeFormatter::None,
		});

	let layer = match config.format {
		LoggingFormat::Normal => layer.boxed(),
		LoggingFormat::Json => layer.json().boxed(),
		LoggingFormat::Pretty => layer.pretty().boxed(),
		LoggingFormat::Compact => layer.compact().boxed(),
	};

	tracing_subscriber::registry().with(layer.with_filter(filter)).try_init()?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_invalid_level() {
		let config = LoggingConfig {
			level: "contact_form=loud".into(),
			..Default::default()
		};

		assert!(matches!(init(&config), Err(LoggingError::InvalidLevel(_))));
	}

	#[test]
	fn disabled_logging_is_a_noop() {
		let config = LoggingConfig {
			enabled: false,
			level: "not a level ===".into(),
			..Default::default()
		};

		assert!(init(&config).is_ok());
	}
}
