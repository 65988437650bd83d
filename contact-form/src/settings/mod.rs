//! Layered settings.
//!
//! The default settings are serialized into a YAML tree, every source is
//! merged on top of it and the result is deserialized back into the typed
//! settings. Mappings merge key by key, every other value (sequences
//! included) is replaced by the incoming one.

pub mod cli;
pub mod env;

use serde_yaml::Value;

#[derive(Debug, Clone)]
pub struct SettingsParser<S> {
	root: Value,
	_marker: std::marker::PhantomData<S>,
}

impl<S> SettingsParser<S> {
	pub fn new(default: &S) -> serde_yaml::Result<Self>
	where
		S: serde::Serialize,
	{
		Ok(Self {
			root: serde_yaml::to_value(default)?,
			_marker: std::marker::PhantomData,
		})
	}

	pub fn merge(&mut self, mut incoming: Value) -> serde_yaml::Result<()> {
		self.root.apply_merge()?;
		incoming.apply_merge()?;

		let root = std::mem::take(&mut self.root);
		self.root = merge_loop(root, incoming);
		Ok(())
	}

	pub fn merge_str(&mut self, s: &str) -> serde_yaml::Result<()> {
		let incoming = serde_yaml::from_str(s)?;
		self.merge(incoming)
	}

	pub fn parse(self) -> serde_yaml::Result<S>
	where
		for<'de> S: serde::Deserialize<'de>,
	{
		serde_yaml::from_value(self.root)
	}
}

fn merge_loop(root: Value, incoming: Value) -> Value {
	match (root, incoming) {
		(Value::Mapping(mut first_map), Value::Mapping(second_map)) => {
			for (key, value) in second_map {
				let combined_value = match first_map.remove(&key) {
					Some(existing_value) => merge_loop(existing_value, value),
					None => value,
				};
				first_map.insert(key, combined_value);
			}
			Value::Mapping(first_map)
		}
		// An empty file parses as null and must not wipe the defaults
		(first, Value::Null) if first.is_mapping() => first,
		(_, second) => second,
	}
}
