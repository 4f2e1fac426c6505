//! Known configuration keys, their shape class and compiled-in defaults

use serde::Serialize;
use serde_json::{Value, json};

use crate::prelude::*;

/// Configuration object: config key -> value
pub type ConfigMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigShape {
	/// List of allowed values
	EnumArray,
	Object,
	/// Accepted as-is
	PassThrough,
}

impl ConfigShape {
	pub fn matches(self, value: &Value) -> bool {
		match self {
			ConfigShape::EnumArray => value.is_array(),
			ConfigShape::Object => value.is_object(),
			ConfigShape::PassThrough => true,
		}
	}

	pub fn expected(self) -> &'static str {
		match self {
			ConfigShape::EnumArray => "array",
			ConfigShape::Object => "object",
			ConfigShape::PassThrough => "any",
		}
	}
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfigKeyDef {
	pub key: &'static str,
	pub shape: ConfigShape,
	pub description: &'static str,
}

const CONFIG_KEYS: &[ConfigKeyDef] = &[
	ConfigKeyDef {
		key: "project.stages",
		shape: ConfigShape::EnumArray,
		description: "Pipeline stages of a project",
	},
	ConfigKeyDef {
		key: "task.priorities",
		shape: ConfigShape::EnumArray,
		description: "Task priority levels",
	},
	ConfigKeyDef {
		key: "task.statuses",
		shape: ConfigShape::EnumArray,
		description: "Task workflow statuses",
	},
	ConfigKeyDef {
		key: "billing.statuses",
		shape: ConfigShape::EnumArray,
		description: "Invoice statuses",
	},
	ConfigKeyDef {
		key: "time.categories",
		shape: ConfigShape::EnumArray,
		description: "Time tracking categories",
	},
	ConfigKeyDef {
		key: "thresholds",
		shape: ConfigShape::Object,
		description: "Deadline warning thresholds in days",
	},
	ConfigKeyDef {
		key: "project.stages.ui",
		shape: ConfigShape::PassThrough,
		description: "Display hints for project stages",
	},
];

pub fn config_keys() -> &'static [ConfigKeyDef] {
	CONFIG_KEYS
}

pub fn key_def(key: &str) -> Option<&'static ConfigKeyDef> {
	CONFIG_KEYS.iter().find(|def| def.key == key)
}

/// Compiled-in default of every known key
pub fn default_config() -> ConfigMap {
	let mut map = ConfigMap::new();
	map.insert(
		"project.stages".into(),
		json!(["prospect", "signed", "in_progress", "delivered", "closed"]),
	);
	map.insert("task.priorities".into(), json!(["low", "medium", "high"]));
	map.insert("task.statuses".into(), json!(["todo", "in_progress", "review", "done"]));
	map.insert(
		"billing.statuses".into(),
		json!(["draft", "sent", "paid", "overdue", "cancelled"]),
	);
	map.insert(
		"time.categories".into(),
		json!(["development", "design", "meeting", "management", "support"]),
	);
	map.insert("thresholds".into(), json!({ "warningDays": 3, "dangerDays": 7 }));
	map.insert(
		"project.stages.ui".into(),
		json!({
			"prospect": { "color": "#94a3b8" },
			"signed": { "color": "#3b82f6" },
			"in_progress": { "color": "#f59e0b" },
			"delivered": { "color": "#10b981" },
			"closed": { "color": "#64748b" },
		}),
	);
	map
}

/// Checks that `key` is known and `value` has the key's shape
pub fn validate_config_value(key: &str, value: &Value) -> PbResult<()> {
	let def = key_def(key)
		.ok_or_else(|| Error::ValidationError(format!("unknown config key: {}", key)))?;
	if !def.shape.matches(value) {
		return Err(Error::ValidationError(format!(
			"config key '{}' expects {}, got {}",
			key,
			def.shape.expected(),
			json_type_name(value)
		)));
	}
	Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}


// vim: ts=4
