//! External configuration registry
//!
//! The registry is a Strapi collection of `{key, value, is_active}` entries,
//! fetched over HTTP with a bearer token.

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;

use crate::prelude::*;

/// Default bound on a registry fetch
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const CONFIGS_PATH: &str = "/api/configs?pagination%5BpageSize%5D=200";

#[async_trait]
pub trait RegistrySource: Debug + Send + Sync {
	/// Fetches every active registry entry
	async fn fetch(&self) -> PbResult<ConfigMap>;
}

#[derive(Debug, Deserialize)]
struct RegistryResponse {
	#[serde(default)]
	data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
	key: String,
	#[serde(default)]
	value: Option<Value>,
	#[serde(default)]
	is_active: Option<bool>,
}

/// Extracts the active entries of a registry response.
///
/// Entries may be wrapped in an `attributes` object. Entries marked inactive,
/// or without a value, are left out.
pub fn parse_registry_response(body: &[u8]) -> PbResult<ConfigMap> {
	let res: RegistryResponse = serde_json::from_slice(body)?;

	let mut map = ConfigMap::new();
	for item in res.data {
		let item = match item {
			Value::Object(mut obj) => match obj.remove("attributes") {
				Some(attributes @ Value::Object(_)) => attributes,
				_ => Value::Object(obj),
			},
			other => other,
		};
		let entry: RegistryEntry = match serde_json::from_value(item) {
			Ok(entry) => entry,
			Err(err) => {
				debug!("Skipping malformed registry entry: {}", err);
				continue;
			}
		};
		if entry.is_active == Some(false) {
			continue;
		}
		if let Some(value) = entry.value {
			map.insert(entry.key, value);
		}
	}
	Ok(map)
}

/// Connector chosen by the scheme of the registry URL
enum RegistryClient {
	Http(Client<HttpConnector, Empty<Bytes>>),
	Https(Client<HttpsConnector<HttpConnector>, Empty<Bytes>>),
}

/// Strapi registry client
pub struct StrapiRegistry {
	url: Box<str>,
	token: Option<Box<str>>,
	timeout: Duration,
	client: RegistryClient,
}

impl StrapiRegistry {
	/// `https` URLs need the native root certificates, plain `http` ones do not
	pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> PbResult<Self> {
		let client = if base_url.starts_with("https://") {
			let connector = HttpsConnectorBuilder::new()
				.with_native_roots()
				.map_err(|_| Error::ConfigError("no native root CA certificates found".into()))?
				.https_only()
				.enable_http1()
				.build();
			RegistryClient::Https(Client::builder(TokioExecutor::new()).build(connector))
		} else {
			RegistryClient::Http(Client::builder(TokioExecutor::new()).build(HttpConnector::new()))
		};

		Ok(Self {
			url: format!("{}{}", base_url.trim_end_matches('/'), CONFIGS_PATH).into(),
			token: token.filter(|t| !t.is_empty()).map(Into::into),
			timeout,
			client,
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	async fn request(&self) -> PbResult<Bytes> {
		let mut req = hyper::Request::builder()
			.method(hyper::Method::GET)
			.uri(&*self.url)
			.header(hyper::header::ACCEPT, "application/json");
		if let Some(token) = &self.token {
			req = req.header(hyper::header::AUTHORIZATION, format!("Bearer {}", token));
		}
		let req = req
			.body(Empty::<Bytes>::new())
			.map_err(|err| Error::Internal(format!("registry request: {}", err)))?;

		let res = match &self.client {
			RegistryClient::Http(client) => client.request(req).await,
			RegistryClient::Https(client) => client.request(req).await,
		}
		.map_err(|err| Error::NetworkError(format!("registry unreachable: {}", err)))?;
		let status = res.status();
		if !status.is_success() {
			return Err(Error::NetworkError(format!("registry responded {}", status)));
		}

		let body = res
			.into_body()
			.collect()
			.await
			.map_err(|err| Error::NetworkError(format!("registry body: {}", err)))?;
		Ok(body.to_bytes())
	}
}

impl Debug for StrapiRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StrapiRegistry")
			.field("url", &self.url)
			.field("token", &self.token.as_ref().map(|_| "***"))
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl RegistrySource for StrapiRegistry {
	async fn fetch(&self) -> PbResult<ConfigMap> {
		let body = match tokio::time::timeout(self.timeout, self.request()).await {
			Ok(res) => res?,
			Err(_) => return Err(Error::Timeout),
		};
		parse_registry_response(&body)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_plain_entries() {
		let body = json!({
			"data": [
				{"key": "task.priorities", "value": ["low", "high"], "is_active": true},
				{"key": "thresholds", "value": {"warningDays": 1}},
			]
		});
		let map = parse_registry_response(body.to_string().as_bytes()).unwrap();
		assert_eq!(map.len(), 2);
		assert_eq!(map["task.priorities"], json!(["low", "high"]));
	}

	#[test]
	fn test_parse_attribute_wrapped_entries() {
		let body = json!({
			"data": [
				{"id": 1, "attributes": {"key": "task.statuses", "value": ["open"], "is_active": true}},
			]
		});
		let map = parse_registry_response(body.to_string().as_bytes()).unwrap();
		assert_eq!(map.get("task.statuses"), Some(&json!(["open"])));
	}

	#[test]
	fn test_parse_skips_inactive_and_valueless() {
		let body = json!({
			"data": [
				{"key": "task.statuses", "value": ["open"], "is_active": false},
				{"key": "billing.statuses"},
				{"key": "time.categories", "value": null},
				{"value": ["no key"]},
				"garbage",
				{"key": "project.stages", "value": ["a"]},
			]
		});
		let map = parse_registry_response(body.to_string().as_bytes()).unwrap();
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["project.stages"]);
	}

	#[test]
	fn test_parse_errors() {
		assert!(matches!(parse_registry_response(b"not json"), Err(Error::Parse)));
		assert!(parse_registry_response(b"{}").unwrap().is_empty());
	}
}

// vim: ts=4
