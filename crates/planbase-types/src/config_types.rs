//! Config override scopes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Applicability level of a setting override.
///
/// Variants are declared in increasing precedence order; the derived `Ord`
/// follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfigScope {
	System,
	Account,
	User,
	Project,
}

impl ConfigScope {
	/// Merge order, lowest precedence first
	pub const PRECEDENCE: [ConfigScope; 4] =
		[ConfigScope::System, ConfigScope::Account, ConfigScope::User, ConfigScope::Project];

	pub fn as_str(&self) -> &'static str {
		match self {
			ConfigScope::System => "SYSTEM",
			ConfigScope::Account => "ACCOUNT",
			ConfigScope::User => "USER",
			ConfigScope::Project => "PROJECT",
		}
	}
}

impl fmt::Display for ConfigScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ConfigScope {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"SYSTEM" => Ok(ConfigScope::System),
			"ACCOUNT" => Ok(ConfigScope::Account),
			"USER" => Ok(ConfigScope::User),
			"PROJECT" => Ok(ConfigScope::Project),
			_ => Err(Error::ValidationError(format!("unknown config scope: {}", s))),
		}
	}
}


// vim: ts=4
