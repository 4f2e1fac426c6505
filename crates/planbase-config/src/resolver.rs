//! Layered configuration resolution
//!
//! Precedence, lowest first: compiled-in defaults, the external registry,
//! then the SYSTEM, ACCOUNT, USER and PROJECT overrides. Each layer
//! deep-merges over the previous one.
//!
//! Resolution never fails. Invalid values, registry outages and database
//! errors are logged and the lower layers stay in force.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use planbase_types::meta_adapter::{MetaAdapter, Setting};

use crate::cache::{ConfigCache, ConfigCacheKey, RegistryCache};
use crate::keys::{self, ConfigKeyDef, validate_config_value};
use crate::merge::merge_entry;
use crate::prelude::*;
use crate::registry::RegistrySource;

/// Layer that last set a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
	Default,
	Strapi,
	Db,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
	pub source: ConfigSource,
	/// Resolution time, ISO 8601
	pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveMeta {
	pub strapi_available: bool,
	pub resolved_at: String,
	pub account_id: Option<Box<str>>,
	pub user_id: Option<Box<str>>,
	pub project_id: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
	pub defaults: ConfigMap,
	/// Accepted registry and database values, merged in precedence order
	pub overrides: ConfigMap,
	pub effective: ConfigMap,
	pub sources: BTreeMap<String, SourceInfo>,
	pub meta: ResolveMeta,
}

struct Layering {
	overrides: ConfigMap,
	effective: ConfigMap,
	sources: BTreeMap<String, ConfigSource>,
}

impl Layering {
	fn new(defaults: &ConfigMap) -> Self {
		Self {
			overrides: ConfigMap::new(),
			effective: defaults.clone(),
			sources: defaults.keys().map(|k| (k.clone(), ConfigSource::Default)).collect(),
		}
	}

	/// Merges a value over the current state if it passes validation.
	/// Returns whether it was accepted.
	fn apply(&mut self, key: &str, value: &Value, source: ConfigSource) -> bool {
		if let Err(err) = validate_config_value(key, value) {
			warn!("Rejected {:?} config value: {}", source, err);
			return false;
		}
		merge_entry(&mut self.overrides, key, value);
		merge_entry(&mut self.effective, key, value);
		self.sources.insert(key.to_string(), source);
		true
	}
}

#[derive(Debug)]
pub struct ConfigResolver {
	meta: Arc<dyn MetaAdapter>,
	registry: Option<Arc<dyn RegistrySource>>,
	cache: Arc<ConfigCache>,
	registry_cache: Arc<RegistryCache>,
}

impl ConfigResolver {
	pub fn new(
		meta: Arc<dyn MetaAdapter>,
		registry: Option<Arc<dyn RegistrySource>>,
		cache: Arc<ConfigCache>,
		registry_cache: Arc<RegistryCache>,
	) -> Self {
		Self { meta, registry, cache, registry_cache }
	}

	pub fn cache(&self) -> &ConfigCache {
		&self.cache
	}

	pub fn registry_cache(&self) -> &RegistryCache {
		&self.registry_cache
	}

	pub fn config_keys(&self) -> &'static [ConfigKeyDef] {
		keys::config_keys()
	}

	/// Registry values and whether they are current (fresh or just fetched)
	async fn registry_values(&self) -> (Arc<ConfigMap>, bool) {
		let Some(registry) = &self.registry else {
			return (Arc::new(ConfigMap::new()), false);
		};
		if let Some(values) = self.registry_cache.fresh() {
			return (values, true);
		}

		match registry.fetch().await {
			Ok(values) => {
				debug!("Registry fetched: {} keys", values.len());
				(self.registry_cache.store(values), true)
			}
			Err(err) => {
				warn!("Registry unavailable, using last snapshot: {}", err);
				(self.registry_cache.last(), false)
			}
		}
	}

	/// Applies the database passes in precedence order. Stops at the first
	/// failing pass; returns false in that case.
	async fn apply_db_layers(
		&self,
		layering: &mut Layering,
		account_id: Option<&str>,
		user_id: Option<&str>,
		project_id: Option<&str>,
	) -> bool {
		for scope in ConfigScope::PRECEDENCE {
			let scope_id = match scope {
				ConfigScope::System => None,
				ConfigScope::Account => account_id,
				ConfigScope::User => user_id,
				ConfigScope::Project => project_id,
			};
			if scope != ConfigScope::System && scope_id.is_none() {
				continue;
			}
			match self.meta.list_settings(scope, scope_id).await {
				Ok(settings) => {
					for setting in &settings {
						layering.apply(&setting.key, &setting.value, ConfigSource::Db);
					}
				}
				Err(err) => {
					warn!("Config {} pass failed, skipping remaining overrides: {}", scope, err);
					return false;
				}
			}
		}
		true
	}

	pub async fn resolve_config(
		&self,
		account_id: Option<&str>,
		user_id: Option<&str>,
		project_id: Option<&str>,
	) -> Arc<ResolvedConfig> {
		let key = ConfigCacheKey::new(account_id, user_id, project_id);
		if let Some(config) = self.cache.get(&key) {
			debug!("Config cache hit: {}", key);
			return config;
		}
		debug!("Config cache miss: {}", key);

		let defaults = keys::default_config();
		let mut layering = Layering::new(&defaults);

		// Available only if the registry answered and contributed a valid key
		let (registry_values, current) = self.registry_values().await;
		let mut accepted = false;
		for (k, v) in registry_values.iter() {
			accepted |= layering.apply(k, v, ConfigSource::Strapi);
		}
		let strapi_available = current && accepted;

		let complete =
			self.apply_db_layers(&mut layering, account_id, user_id, project_id).await;

		let resolved_at = Timestamp::now().to_iso_string();
		let sources = layering
			.sources
			.into_iter()
			.map(|(k, source)| (k, SourceInfo { source, timestamp: resolved_at.clone() }))
			.collect();
		let config = Arc::new(ResolvedConfig {
			defaults,
			overrides: layering.overrides,
			effective: layering.effective,
			sources,
			meta: ResolveMeta {
				strapi_available,
				resolved_at,
				account_id: key.account_id.clone(),
				user_id: key.user_id.clone(),
				project_id: key.project_id.clone(),
			},
		});

		// A degraded result is not cached so the next call retries the database
		if complete {
			self.cache.put(key, config.clone());
		}
		config
	}

	pub async fn get_effective_config(
		&self,
		account_id: Option<&str>,
		user_id: Option<&str>,
		project_id: Option<&str>,
	) -> ConfigMap {
		self.resolve_config(account_id, user_id, project_id).await.effective.clone()
	}

	// Direct access to overrides
	//****************************
	pub async fn get_setting_by_key(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<Option<Value>> {
		Ok(self.meta.read_setting(key, scope, scope_id).await?.map(|s| s.value))
	}

	pub async fn get_settings_by_scope(
		&self,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<ConfigMap> {
		let settings = self.meta.list_settings(scope, scope_id).await?;
		Ok(settings.into_iter().map(|s| (s.key.into_string(), s.value)).collect())
	}

	/// Validates and stores an override, then invalidates the affected
	/// resolved configs
	pub async fn update_setting(
		&self,
		key: &str,
		value: &Value,
		scope: ConfigScope,
		scope_id: Option<&str>,
		updated_by: Option<&str>,
	) -> PbResult<Setting> {
		validate_config_value(key, value)?;
		let scope_id = check_scope_id(scope, scope_id)?;

		let setting = self.meta.update_setting(key, scope, scope_id, value, updated_by).await?;
		self.invalidate_cache(Some(scope), scope_id);
		info!(
			"Setting '{}' updated for {} {} (version {})",
			key,
			scope,
			scope_id.unwrap_or("-"),
			setting.version
		);
		Ok(setting)
	}

	/// Removes an override so the lower layers show through again
	pub async fn delete_setting(
		&self,
		key: &str,
		scope: ConfigScope,
		scope_id: Option<&str>,
	) -> PbResult<bool> {
		let scope_id = check_scope_id(scope, scope_id)?;
		let deleted = self.meta.delete_setting(key, scope, scope_id).await?;
		if deleted {
			self.invalidate_cache(Some(scope), scope_id);
			info!("Setting '{}' deleted for {} {}", key, scope, scope_id.unwrap_or("-"));
		}
		Ok(deleted)
	}

	// Cache control
	//***************
	pub fn invalidate_cache(&self, scope: Option<ConfigScope>, scope_id: Option<&str>) {
		let count = self.cache.invalidate(scope, scope_id);
		info!(
			"Config cache invalidated: scope={} id={} ({} entries)",
			scope.map_or("all", |s| s.as_str()),
			scope_id.unwrap_or("-"),
			count
		);
	}

	/// Drops the registry snapshot together with every resolved config
	pub fn invalidate_strapi_cache(&self) {
		self.registry_cache.clear();
		self.cache.clear();
		info!("Registry snapshot and config cache cleared");
	}
}

/// SYSTEM takes no scope id; every other scope requires one
fn check_scope_id(scope: ConfigScope, scope_id: Option<&str>) -> PbResult<Option<&str>> {
	match (scope, scope_id.filter(|id| !id.is_empty())) {
		(ConfigScope::System, _) => Ok(None),
		(_, Some(id)) => Ok(Some(id)),
		(_, None) => Err(Error::ValidationError(format!("scope {} requires a scope id", scope))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_check_scope_id() {
		assert_eq!(check_scope_id(ConfigScope::System, Some("x")).unwrap(), None);
		assert_eq!(check_scope_id(ConfigScope::Project, Some("p1")).unwrap(), Some("p1"));
		assert!(check_scope_id(ConfigScope::Account, None).is_err());
		assert!(check_scope_id(ConfigScope::User, Some("")).is_err());
	}

	#[test]
	fn test_layering_tracks_sources() {
		let defaults = keys::default_config();
		let mut layering = Layering::new(&defaults);
		assert!(layering.apply("task.priorities", &json!(["a"]), ConfigSource::Strapi));
		assert!(layering.apply("thresholds", &json!({"dangerDays": 1}), ConfigSource::Db));
		assert!(!layering.apply("project.stages", &json!("not an array"), ConfigSource::Db));

		assert_eq!(layering.sources["task.priorities"], ConfigSource::Strapi);
		assert_eq!(layering.sources["thresholds"], ConfigSource::Db);
		assert_eq!(layering.sources["project.stages"], ConfigSource::Default);
		assert_eq!(layering.effective["thresholds"], json!({"warningDays": 3, "dangerDays": 1}));
		assert_eq!(layering.overrides.len(), 2);
	}

	#[test]
	fn test_source_serialization() {
		let info = SourceInfo { source: ConfigSource::Strapi, timestamp: "t".into() };
		assert_eq!(serde_json::to_value(&info).unwrap(), json!({"source": "strapi", "timestamp": "t"}));
	}
}

// vim: ts=4
