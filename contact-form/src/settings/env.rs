//! Environment source.
//!
//! `CONTACT_FORM__API__PORT=8080` sets `api.port`. Values are parsed as YAML
//! scalars, quote them to force a string. The variables used by existing
//! deployments (`MONGODB_URI`, `PORT`, ...) are mapped onto their settings
//! paths and always read as text.

use serde_yaml::{Mapping, Value};

pub const ENV_PREFIX: &str = "CONTACT_FORM";
const JOINER: &str = "__";

#[derive(Debug, Clone, Copy)]
enum AliasKind {
	Text,
	Number,
	List,
}

struct Alias {
	var: &'static str,
	kind: AliasKind,
	paths: &'static [&'static [&'static str]],
}

const ALIASES: &[Alias] = &[
	Alias {
		var: "MONGODB_URI",
		kind: AliasKind::Text,
		paths: &[&["database", "uri"]],
	},
	Alias {
		var: "PORT",
		kind: AliasKind::Number,
		paths: &[&["api", "port"]],
	},
	Alias {
		var: "EMAIL_USER",
		kind: AliasKind::Text,
		paths: &[&["notifier", "from"], &["notifier", "provider", "username"]],
	},
	Alias {
		var: "EMAIL_PASS",
		kind: AliasKind::Text,
		paths: &[&["notifier", "provider", "password"]],
	},
	Alias {
		var: "EMAIL_API_KEY",
		kind: AliasKind::Text,
		paths: &[&["notifier", "provider", "api_key"]],
	},
	Alias {
		var: "CORS_ORIGINS",
		kind: AliasKind::List,
		paths: &[&["api", "cors", "allowed_origins"]],
	},
];

/// Builds the override tree from the process environment.
pub fn from_env() -> Value {
	overrides(std::env::vars())
}

/// Builds the override tree from a set of variables.
/// Prefixed variables win over aliases when both set the same key.
pub fn overrides(vars: impl IntoIterator<Item = (String, String)>) -> Value {
	let vars = vars
		.into_iter()
		.filter(|(_, value)| !value.is_empty())
		.collect::<Vec<_>>();

	let mut root = Value::Mapping(Mapping::new());

	for alias in ALIASES {
		let Some((_, raw)) = vars.iter().find(|(key, _)| key == alias.var) else {
			continue;
		};

		let value = match alias.kind {
			AliasKind::Text => Value::String(raw.clone()),
			AliasKind::Number => parse_scalar(raw),
			AliasKind::List => Value::Sequence(
				raw.split(',')
					.map(str::trim)
					.filter(|item| !item.is_empty())
					.map(|item| Value::String(item.to_owned()))
					.collect(),
			),
		};

		for path in alias.paths {
			insert(&mut root, path.iter().map(|s| s.to_string()), value.clone());
		}
	}

	let prefix = format!("{ENV_PREFIX}{JOINER}");
	for (key, raw) in &vars {
		let Some(path) = key.strip_prefix(&prefix) else {
			continue;
		};

		let path = path
			.split(JOINER)
			.filter(|segment| !segment.is_empty())
			.map(str::to_lowercase)
			.collect::<Vec<_>>();

		if path.is_empty() {
			continue;
		}

		insert(&mut root, path, parse_scalar(raw));
	}

	root
}

fn parse_scalar(raw: &str) -> Value {
	match serde_yaml::from_str::<Value>(raw) {
		Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Null)) => value,
		_ => Value::String(raw.to_owned()),
	}
}

fn insert(root: &mut Value, path: impl IntoIterator<Item = String>, value: Value) {
	let mut current = root;

	for segment in path {
		if !current.is_mapping() {
			*current = Value::Mapping(Mapping::new());
		}

		let Some(map) = current.as_mapping_mut() else {
			return;
		};

		current = map.entry(Value::String(segment)).or_insert(Value::Null);
	}

	*current = value;
}
