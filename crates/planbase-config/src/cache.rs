//! Resolved-config cache and registry snapshot
//!
//! Resolved configurations are keyed by the (account, user, project) context.
//! Secondary indexes per account, user and project id make scope invalidation
//! exact.

use lru::LruCache;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::prelude::*;
use crate::resolver::ResolvedConfig;

const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Resolved configs and registry snapshots expire after 60 seconds
pub const DEFAULT_TTL_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigCacheKey {
	pub account_id: Option<Box<str>>,
	pub user_id: Option<Box<str>>,
	pub project_id: Option<Box<str>>,
}

impl ConfigCacheKey {
	pub fn new(account_id: Option<&str>, user_id: Option<&str>, project_id: Option<&str>) -> Self {
		Self {
			account_id: account_id.map(Into::into),
			user_id: user_id.map(Into::into),
			project_id: project_id.map(Into::into),
		}
	}
}

impl fmt::Display for ConfigCacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}:{}:{}",
			self.account_id.as_deref().unwrap_or("system"),
			self.user_id.as_deref().unwrap_or("none"),
			self.project_id.as_deref().unwrap_or("none")
		)
	}
}

#[derive(Debug)]
struct CacheEntry {
	config: Arc<ResolvedConfig>,
	cached_at: Timestamp,
}

type ScopeIndex = HashMap<Box<str>, HashSet<ConfigCacheKey>>;

#[derive(Debug)]
struct ConfigCacheInner {
	entries: LruCache<ConfigCacheKey, CacheEntry>,
	by_account: ScopeIndex,
	by_user: ScopeIndex,
	by_project: ScopeIndex,
}

fn index_add(index: &mut ScopeIndex, id: Option<&Box<str>>, key: &ConfigCacheKey) {
	if let Some(id) = id {
		index.entry(id.clone()).or_default().insert(key.clone());
	}
}

fn index_remove(index: &mut ScopeIndex, id: Option<&Box<str>>, key: &ConfigCacheKey) {
	if let Some(id) = id
		&& let Some(keys) = index.get_mut(id)
	{
		keys.remove(key);
		if keys.is_empty() {
			index.remove(id);
		}
	}
}

impl ConfigCacheInner {
	fn index(&mut self, key: &ConfigCacheKey) {
		index_add(&mut self.by_account, key.account_id.as_ref(), key);
		index_add(&mut self.by_user, key.user_id.as_ref(), key);
		index_add(&mut self.by_project, key.project_id.as_ref(), key);
	}

	fn unindex(&mut self, key: &ConfigCacheKey) {
		index_remove(&mut self.by_account, key.account_id.as_ref(), key);
		index_remove(&mut self.by_user, key.user_id.as_ref(), key);
		index_remove(&mut self.by_project, key.project_id.as_ref(), key);
	}

	fn remove(&mut self, key: &ConfigCacheKey) {
		self.entries.pop(key);
		self.unindex(key);
	}

	fn clear(&mut self) {
		self.entries.clear();
		self.by_account.clear();
		self.by_user.clear();
		self.by_project.clear();
	}
}

#[derive(Debug)]
pub struct ConfigCache {
	inner: parking_lot::RwLock<ConfigCacheInner>,
	ttl_secs: i64,
}

impl ConfigCache {
	pub fn new(max_entries: usize, ttl_secs: i64) -> Self {
		let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
		Self {
			inner: parking_lot::RwLock::new(ConfigCacheInner {
				entries: LruCache::new(capacity),
				by_account: HashMap::new(),
				by_user: HashMap::new(),
				by_project: HashMap::new(),
			}),
			ttl_secs,
		}
	}

	pub fn ttl_secs(&self) -> i64 {
		self.ttl_secs
	}

	pub fn get(&self, key: &ConfigCacheKey) -> Option<Arc<ResolvedConfig>> {
		let mut inner = self.inner.write();
		let expired = {
			let entry = inner.entries.get(key)?;
			Timestamp::now() >= entry.cached_at.add_seconds(self.ttl_secs)
		};
		if expired {
			inner.remove(key);
			return None;
		}
		inner.entries.peek(key).map(|entry| entry.config.clone())
	}

	pub fn put(&self, key: ConfigCacheKey, config: Arc<ResolvedConfig>) {
		self.put_at(key, config, Timestamp::now());
	}

	/// Stores an entry as if it had been cached at `cached_at`
	pub fn put_at(&self, key: ConfigCacheKey, config: Arc<ResolvedConfig>, cached_at: Timestamp) {
		let mut inner = self.inner.write();
		inner.index(&key);
		let evicted = inner.entries.push(key.clone(), CacheEntry { config, cached_at });
		if let Some((evicted_key, _)) = evicted
			&& evicted_key != key
		{
			inner.unindex(&evicted_key);
		}
	}

	/// Removes every entry whose context contains the scope id.
	///
	/// SYSTEM scope, or a missing scope id, clears the whole cache.
	pub fn invalidate(&self, scope: Option<ConfigScope>, scope_id: Option<&str>) -> usize {
		let mut inner = self.inner.write();
		let (scope, scope_id) = match (scope, scope_id) {
			(Some(scope), Some(id)) if scope != ConfigScope::System => (scope, id),
			_ => {
				let count = inner.entries.len();
				inner.clear();
				return count;
			}
		};

		let index = match scope {
			ConfigScope::Account => &inner.by_account,
			ConfigScope::User => &inner.by_user,
			ConfigScope::Project | ConfigScope::System => &inner.by_project,
		};
		let keys: Vec<ConfigCacheKey> =
			index.get(scope_id).map(|keys| keys.iter().cloned().collect()).unwrap_or_default();
		for key in &keys {
			inner.remove(key);
		}
		keys.len()
	}

	pub fn len(&self) -> usize {
		self.inner.read().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.read().entries.is_empty()
	}

	pub fn clear(&self) {
		self.inner.write().clear();
	}
}

impl Default for ConfigCache {
	fn default() -> Self {
		Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
	}
}

// Registry snapshot //
//*******************//
#[derive(Debug, Default)]
struct RegistrySnapshot {
	values: Arc<ConfigMap>,
	fetched_at: Option<Timestamp>,
}

/// Last successful registry fetch
///
/// A stale snapshot is still served as a fallback while the registry is
/// unreachable.
#[derive(Debug)]
pub struct RegistryCache {
	snapshot: parking_lot::RwLock<RegistrySnapshot>,
	ttl_secs: i64,
}

impl RegistryCache {
	pub fn new(ttl_secs: i64) -> Self {
		Self { snapshot: parking_lot::RwLock::new(RegistrySnapshot::default()), ttl_secs }
	}

	/// The snapshot, if it was fetched within the TTL
	pub fn fresh(&self) -> Option<Arc<ConfigMap>> {
		let snapshot = self.snapshot.read();
		let fetched_at = snapshot.fetched_at?;
		(Timestamp::now() < fetched_at.add_seconds(self.ttl_secs)).then(|| snapshot.values.clone())
	}

	/// The last snapshot regardless of age, empty before the first fetch
	pub fn last(&self) -> Arc<ConfigMap> {
		self.snapshot.read().values.clone()
	}

	pub fn store(&self, values: ConfigMap) -> Arc<ConfigMap> {
		self.store_at(values, Timestamp::now())
	}

	pub fn store_at(&self, values: ConfigMap, fetched_at: Timestamp) -> Arc<ConfigMap> {
		let values = Arc::new(values);
		*self.snapshot.write() =
			RegistrySnapshot { values: values.clone(), fetched_at: Some(fetched_at) };
		values
	}

	pub fn clear(&self) {
		*self.snapshot.write() = RegistrySnapshot::default();
	}
}

impl Default for RegistryCache {
	fn default() -> Self {
		Self::new(DEFAULT_TTL_SECS)
	}
}


// vim: ts=4
