//! Permission read cache
//!
//! Entries are keyed by (organization, member, module filter). A query for all
//! modules and a query for a single module live in separate entries, so the
//! invalidation helpers clear every filter variant of a member at once.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use planbase_types::meta_adapter::Permission;

use crate::prelude::*;

const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Permission entries expire after 5 minutes
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
	org_id: Box<str>,
	member_id: Box<str>,
	/// `None` caches the unfiltered ("all") query
	module: Option<Module>,
}

impl CacheKey {
	fn new(org_id: &str, member_id: &str, module: Option<Module>) -> Self {
		Self { org_id: org_id.into(), member_id: member_id.into(), module }
	}
}

#[derive(Debug, Clone)]
struct CacheEntry {
	permissions: Arc<[Permission]>,
	cached_at: Timestamp,
}

#[derive(Debug)]
pub struct PermissionCache {
	entries: parking_lot::RwLock<LruCache<CacheKey, CacheEntry>>,
	ttl_secs: i64,
}

impl PermissionCache {
	pub fn new(max_entries: usize, ttl_secs: i64) -> Self {
		let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
		Self { entries: parking_lot::RwLock::new(LruCache::new(capacity)), ttl_secs }
	}

	pub fn ttl_secs(&self) -> i64 {
		self.ttl_secs
	}

	/// Returns the cached permissions unless missing or expired
	pub fn get(
		&self,
		org_id: &str,
		member_id: &str,
		module: Option<Module>,
	) -> Option<Arc<[Permission]>> {
		let key = CacheKey::new(org_id, member_id, module);
		let mut cache = self.entries.write();

		let entry = cache.get(&key)?;
		if Timestamp::now() >= entry.cached_at.add_seconds(self.ttl_secs) {
			cache.pop(&key);
			return None;
		}
		Some(entry.permissions.clone())
	}

	pub fn put(
		&self,
		org_id: &str,
		member_id: &str,
		module: Option<Module>,
		permissions: Arc<[Permission]>,
	) {
		self.put_at(org_id, member_id, module, permissions, Timestamp::now());
	}

	/// Stores an entry as if it had been cached at `cached_at`
	pub fn put_at(
		&self,
		org_id: &str,
		member_id: &str,
		module: Option<Module>,
		permissions: Arc<[Permission]>,
		cached_at: Timestamp,
	) {
		let key = CacheKey::new(org_id, member_id, module);
		self.entries.write().put(key, CacheEntry { permissions, cached_at });
	}

	/// Drops every module filter variant cached for a member
	pub fn invalidate_member(&self, org_id: &str, member_id: &str) {
		let mut cache = self.entries.write();
		cache.pop(&CacheKey::new(org_id, member_id, None));
		for module in Module::ALL {
			cache.pop(&CacheKey::new(org_id, member_id, Some(*module)));
		}
	}

	/// Drops every entry of an organization
	pub fn invalidate_organization(&self, org_id: &str) {
		let mut cache = self.entries.write();
		let keys: Vec<CacheKey> =
			cache.iter().filter(|(k, _)| &*k.org_id == org_id).map(|(k, _)| k.clone()).collect();
		for key in &keys {
			cache.pop(key);
		}
		debug!("Permission cache cleared for organization {} ({} entries)", org_id, keys.len());
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	pub fn clear(&self) {
		self.entries.write().clear();
	}
}

impl Default for PermissionCache {
	fn default() -> Self {
		Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
	}
}


// vim: ts=4
