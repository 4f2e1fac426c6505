//! App state and builder

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use planbase_config::{ConfigCache, ConfigResolver, RegistryCache, RegistrySource, StrapiRegistry};
use planbase_meta_adapter_sqlite::MetaAdapterSqlite;
use planbase_perm::{PermissionCache, PermissionResolver};
use planbase_types::meta_adapter::MetaAdapter;

use crate::prelude::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub db_path: Box<Path>,
	/// External registry base URL, no registry when unset
	pub strapi_url: Option<Box<str>>,
	pub strapi_api_token: Option<Box<str>>,
	pub permission_cache_ttl: i64,
	pub config_cache_ttl: i64,
	pub registry_timeout: Duration,
	/// Maximum entries per cache
	pub cache_capacity: usize,
	/// Log filter used when `RUST_LOG` is not set
	pub log_filter: Box<str>,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			db_path: PathBuf::from("./data/planbase.db").into(),
			strapi_url: None,
			strapi_api_token: None,
			permission_cache_ttl: 300,
			config_cache_ttl: 60,
			registry_timeout: Duration::from_secs(5),
			cache_capacity: 1000,
			log_filter: "info".into(),
		}
	}
}

fn parse_var<T: FromStr>(
	lookup: &impl Fn(&str) -> Option<String>,
	name: &str,
	default: T,
) -> PbResult<T> {
	match lookup(name).filter(|v| !v.trim().is_empty()) {
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| Error::ConfigError(format!("invalid value for {}: {}", name, value))),
		None => Ok(default),
	}
}

impl AppBuilderOpts {
	/// Reads the options from the process environment
	pub fn from_env() -> PbResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the options through `lookup`, falling back to the defaults
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PbResult<Self> {
		let defaults = Self::default();
		let non_empty = |name: &str| -> Option<Box<str>> {
			lookup(name).filter(|v| !v.is_empty()).map(Into::into)
		};

		let permission_cache_ttl: i64 =
			parse_var(&lookup, "PLANBASE_PERMISSION_CACHE_TTL", defaults.permission_cache_ttl)?;
		let config_cache_ttl: i64 =
			parse_var(&lookup, "PLANBASE_CONFIG_CACHE_TTL", defaults.config_cache_ttl)?;
		let registry_timeout: u64 =
			parse_var(&lookup, "PLANBASE_REGISTRY_TIMEOUT", defaults.registry_timeout.as_secs())?;
		let cache_capacity: usize =
			parse_var(&lookup, "PLANBASE_CACHE_CAPACITY", defaults.cache_capacity)?;

		if permission_cache_ttl < 0 || config_cache_ttl < 0 {
			return Err(Error::ConfigError("cache TTL must not be negative".into()));
		}
		if cache_capacity == 0 {
			return Err(Error::ConfigError("PLANBASE_CACHE_CAPACITY must be positive".into()));
		}

		Ok(Self {
			db_path: lookup("PLANBASE_DB")
				.filter(|v| !v.is_empty())
				.map_or(defaults.db_path, |p| PathBuf::from(p).into()),
			strapi_url: non_empty("STRAPI_URL"),
			strapi_api_token: non_empty("STRAPI_API_TOKEN"),
			permission_cache_ttl,
			config_cache_ttl,
			registry_timeout: Duration::from_secs(registry_timeout),
			cache_capacity,
			log_filter: non_empty("PLANBASE_LOG").unwrap_or(defaults.log_filter),
		})
	}
}

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub meta_adapter: Arc<dyn MetaAdapter>,
	pub permissions: PermissionResolver,
	pub config: ConfigResolver,
}

pub type App = Arc<AppState>;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	meta_adapter: Option<Arc<dyn MetaAdapter>>,
	registry: Option<Arc<dyn RegistrySource>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		Self::from_opts(AppBuilderOpts::default())
	}

	pub fn from_opts(opts: AppBuilderOpts) -> Self {
		AppBuilder { opts, meta_adapter: None, registry: None }
	}

	// Opts
	pub fn db_path(&mut self, db_path: impl Into<Box<Path>>) -> &mut Self {
		self.opts.db_path = db_path.into();
		self
	}
	pub fn strapi(
		&mut self,
		url: impl Into<Box<str>>,
		token: Option<impl Into<Box<str>>>,
	) -> &mut Self {
		self.opts.strapi_url = Some(url.into());
		self.opts.strapi_api_token = token.map(Into::into);
		self
	}
	pub fn permission_cache_ttl(&mut self, secs: i64) -> &mut Self {
		self.opts.permission_cache_ttl = secs;
		self
	}
	pub fn config_cache_ttl(&mut self, secs: i64) -> &mut Self {
		self.opts.config_cache_ttl = secs;
		self
	}
	pub fn cache_capacity(&mut self, capacity: usize) -> &mut Self {
		self.opts.cache_capacity = capacity;
		self
	}

	// Collaborators
	pub fn meta_adapter(&mut self, meta_adapter: Arc<dyn MetaAdapter>) -> &mut Self {
		self.meta_adapter = Some(meta_adapter);
		self
	}
	/// Overrides the registry source built from `strapi_url`
	pub fn registry(&mut self, registry: Arc<dyn RegistrySource>) -> &mut Self {
		self.registry = Some(registry);
		self
	}

	pub async fn build(self) -> PbResult<App> {
		let opts = self.opts;

		let meta_adapter: Arc<dyn MetaAdapter> = match self.meta_adapter {
			Some(meta_adapter) => meta_adapter,
			None => Arc::new(MetaAdapterSqlite::new(&opts.db_path).await?),
		};

		let registry: Option<Arc<dyn RegistrySource>> = match (self.registry, &opts.strapi_url) {
			(Some(registry), _) => Some(registry),
			(None, Some(url)) => {
				let registry =
					StrapiRegistry::new(url, opts.strapi_api_token.as_deref(), opts.registry_timeout)?;
				info!("Config registry: {}", registry.url());
				Some(Arc::new(registry))
			}
			(None, None) => {
				info!("No config registry configured, using defaults and overrides only");
				None
			}
		};

		let permissions = PermissionResolver::new(
			meta_adapter.clone(),
			Arc::new(PermissionCache::new(opts.cache_capacity, opts.permission_cache_ttl)),
		);
		let config = ConfigResolver::new(
			meta_adapter.clone(),
			registry,
			Arc::new(ConfigCache::new(opts.cache_capacity, opts.config_cache_ttl)),
			Arc::new(RegistryCache::new(opts.config_cache_ttl)),
		);

		info!(
			"Planbase core V{} ready (permission TTL {}s, config TTL {}s)",
			VERSION, opts.permission_cache_ttl, opts.config_cache_ttl
		);
		Ok(Arc::new(AppState { opts, meta_adapter, permissions, config }))
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> =
			vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
		move |name| vars.get(name).cloned()
	}

	#[test]
	fn test_defaults() {
		let opts = AppBuilderOpts::from_lookup(lookup(&[])).unwrap();
		assert_eq!(&*opts.db_path, Path::new("./data/planbase.db"));
		assert!(opts.strapi_url.is_none());
		assert_eq!(opts.permission_cache_ttl, 300);
		assert_eq!(opts.config_cache_ttl, 60);
		assert_eq!(opts.registry_timeout, Duration::from_secs(5));
		assert_eq!(opts.cache_capacity, 1000);
		assert_eq!(&*opts.log_filter, "info");
	}

	#[test]
	fn test_overrides() {
		let opts = AppBuilderOpts::from_lookup(lookup(&[
			("PLANBASE_DB", "/tmp/pb.db"),
			("STRAPI_URL", "https://cms.example.com"),
			("STRAPI_API_TOKEN", "secret"),
			("PLANBASE_PERMISSION_CACHE_TTL", "10"),
			("PLANBASE_CONFIG_CACHE_TTL", " 20 "),
			("PLANBASE_REGISTRY_TIMEOUT", "2"),
			("PLANBASE_CACHE_CAPACITY", "50"),
			("PLANBASE_LOG", "debug"),
		]))
		.unwrap();
		assert_eq!(&*opts.db_path, Path::new("/tmp/pb.db"));
		assert_eq!(opts.strapi_url.as_deref(), Some("https://cms.example.com"));
		assert_eq!(opts.strapi_api_token.as_deref(), Some("secret"));
		assert_eq!(opts.permission_cache_ttl, 10);
		assert_eq!(opts.config_cache_ttl, 20);
		assert_eq!(opts.registry_timeout, Duration::from_secs(2));
		assert_eq!(opts.cache_capacity, 50);
		assert_eq!(&*opts.log_filter, "debug");
	}

	#[test]
	fn test_empty_values_fall_back() {
		let opts =
			AppBuilderOpts::from_lookup(lookup(&[("STRAPI_URL", ""), ("PLANBASE_CACHE_CAPACITY", "")]))
				.unwrap();
		assert!(opts.strapi_url.is_none());
		assert_eq!(opts.cache_capacity, 1000);
	}

	#[test]
	fn test_invalid_values() {
		for vars in [
			[("PLANBASE_PERMISSION_CACHE_TTL", "five")],
			[("PLANBASE_CONFIG_CACHE_TTL", "-1")],
			[("PLANBASE_REGISTRY_TIMEOUT", "-3")],
			[("PLANBASE_CACHE_CAPACITY", "0")],
		] {
			let res = AppBuilderOpts::from_lookup(lookup(&vars));
			assert!(matches!(res, Err(Error::ConfigError(_))), "{:?}", vars);
		}
	}
}

// vim: ts=4
