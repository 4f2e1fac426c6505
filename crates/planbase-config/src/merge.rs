//! Deep merge of configuration values
//!
//! Objects merge key by key, recursively. Anything else, arrays included,
//! replaces the previous value.

use serde_json::Value;

use crate::keys::ConfigMap;

pub fn deep_merge(base: &mut Value, overlay: &Value) {
	match (base, overlay) {
		(Value::Object(base), Value::Object(overlay)) => {
			for (key, value) in overlay {
				match base.get_mut(key) {
					Some(slot) => deep_merge(slot, value),
					None => {
						base.insert(key.clone(), value.clone());
					}
				}
			}
		}
		(base, overlay) => *base = overlay.clone(),
	}
}

/// Merges one layer value into a config map entry
pub fn merge_entry(map: &mut ConfigMap, key: &str, value: &Value) {
	match map.get_mut(key) {
		Some(slot) => deep_merge(slot, value),
		None => {
			map.insert(key.to_string(), value.clone());
		}
	}
}


// vim: ts=4
