use anyhow::Context;
use clap::ArgAction;

use super::SettingsParser;

const GENERATE_ARG_ID: &str = "generate";
const CONFIG_ARG_ID: &str = "config";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug)]
pub struct Cli<S> {
	settings: SettingsParser<S>,
	app: clap::Command,
}

fn default_cmd() -> clap::Command {
	clap::Command::new(env!("CARGO_PKG_NAME"))
		.version(env!("CARGO_PKG_VERSION"))
		.author(env!("CARGO_PKG_AUTHORS"))
		.about(env!("CARGO_PKG_DESCRIPTION"))
		.arg(
			clap::Arg::new(CONFIG_ARG_ID)
				.long(CONFIG_ARG_ID)
				.short('c')
				.help("The configuration file to use")
				.value_name("FILE")
				.action(ArgAction::Append),
		)
		.arg(
			clap::Arg::new(GENERATE_ARG_ID)
				.long(GENERATE_ARG_ID)
				.help("Generate a configuration file")
				.value_name("FILE")
				.action(ArgAction::Set)
				.num_args(0..=1)
				.default_missing_value("./config.yaml"),
		)
}

/// What the command line asked for.
#[derive(Debug)]
pub enum Matches<S> {
	Run(S),
	Generated(String),
}

impl<S: serde::Serialize + serde::de::DeserializeOwned> Cli<S> {
	pub fn new(default: &S) -> anyhow::Result<Self> {
		Ok(Self {
			settings: SettingsParser::new(default).context("failed to serialize default settings")?,
			app: default_cmd(),
		})
	}

	fn load_file(file: &str, optional: bool) -> anyhow::Result<Option<String>> {
		match std::fs::read_to_string(file) {
			Ok(contents) => Ok(Some(contents)),
			Err(_) if optional => Ok(None),
			Err(err) => Err(err).with_context(|| format!("Error reading configuration file: {file}")),
		}
	}

	pub fn parse(self) -> anyhow::Result<Matches<S>> {
		self.parse_from(std::env::args_os(), super::env::from_env())
	}

	/// Parses the given arguments and merges the environment overrides last.
	pub fn parse_from<I, T>(mut self, args: I, env: serde_yaml::Value) -> anyhow::Result<Matches<S>>
	where
		I: IntoIterator<Item = T>,
		T: Into<std::ffi::OsString> + Clone,
	{
		let args = self.app.try_get_matches_from(args)?;

		if let Some(file) = args.get_one::<String>(GENERATE_ARG_ID) {
			let settings = serde_yaml::to_string(&self.settings.parse().context("failed to construct settings")?)
				.context("failed to serialize settings")?;
			std::fs::write(file, settings).with_context(|| format!("Error writing configuration file: {file}"))?;
			return Ok(Matches::Generated(file.clone()));
		}

		let mut files = if let Some(files) = args.get_many::<String>(CONFIG_ARG_ID) {
			files.cloned().map(|file| (file, false)).collect::<Vec<_>>()
		} else {
			vec![]
		};

		if files.is_empty() {
			files.push((DEFAULT_CONFIG_FILE.to_string(), true));
		}

		for (file, optional) in files {
			if let Some(contents) = Self::load_file(&file, optional)? {
				self.settings
					.merge_str(&contents)
					.with_context(|| format!("Error parsing configuration file: {file}"))?;
			}
		}

		self.settings.merge(env).context("Error merging environment")?;

		Ok(Matches::Run(self.settings.parse().context("failed to parse settings")?))
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;
	use crate::config::{ContactFormConfig, DatabaseConfig};

	fn empty_env() -> serde_yaml::Value {
		serde_yaml::Value::Mapping(Default::default())
	}

	#[test]
	fn loads_files_in_order_then_env() {
		let mut first = tempfile::NamedTempFile::new().unwrap();
		writeln!(first, "api:\n  port: 1000\nnotifier:\n  owner_name: First").unwrap();
		let mut second = tempfile::NamedTempFile::new().unwrap();
		writeln!(second, "api:\n  port: 2000\ndatabase:\n  kind: memory\n  capacity: 3").unwrap();

		let env = crate::settings::env::overrides([("CONTACT_FORM__API__PORT".to_owned(), "3000".to_owned())]);

		let matches = Cli::new(&ContactFormConfig::default())
			.unwrap()
			.parse_from(
				[
					"contact-form",
					"-c",
					first.path().to_str().unwrap(),
					"--config",
					second.path().to_str().unwrap(),
				],
				env,
			)
			.unwrap();

		let Matches::Run(config) = matches else {
			panic!("expected settings");
		};

		assert_eq!(config.api.port, 3000);
		assert_eq!(config.notifier.owner_name, "First");
		let DatabaseConfig::Memory(memory) = config.database else {
			panic!("expected memory database config");
		};
		assert_eq!(memory.capacity, Some(3));
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let result = Cli::new(&ContactFormConfig::default())
			.unwrap()
			.parse_from(["contact-form", "-c", "/definitely/not/here.yaml"], empty_env());

		assert!(result.is_err());
	}

	#[test]
	fn invalid_file_is_an_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "api: [unterminated").unwrap();

		let err = Cli::new(&ContactFormConfig::default())
			.unwrap()
			.parse_from(["contact-form", "-c", file.path().to_str().unwrap()], empty_env())
			.unwrap_err();

		assert!(err.to_string().starts_with("Error parsing configuration file"));
	}

	#[test]
	fn generates_default_config() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("generated.yaml");

		let matches = Cli::new(&ContactFormConfig::default())
			.unwrap()
			.parse_from(["contact-form", "--generate", path.to_str().unwrap()], empty_env())
			.unwrap();

		assert!(matches!(matches, Matches::Generated(ref file) if file == path.to_str().unwrap()));

		let contents = std::fs::read_to_string(&path).unwrap();
		let config: ContactFormConfig = serde_yaml::from_str(&contents).unwrap();
		assert_eq!(config, ContactFormConfig::default());
	}
}
