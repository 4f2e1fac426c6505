//! Role, module and action vocabularies of the access-control matrix
//!
//! All three are closed sets. They render to and parse from their lowercase
//! names, which is also how they are stored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! string_enum {
	($(#[$meta:meta])* $name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(rename_all = "lowercase")]
		pub enum $name {
			$($variant),+
		}

		impl $name {
			pub const ALL: &'static [$name] = &[$($name::$variant),+];

			pub fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $str),+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s {
					$($str => Ok($name::$variant),)+
					_ => Err(Error::ValidationError(format!(
						concat!("unknown ", stringify!($name), ": {}"),
						s
					))),
				}
			}
		}
	};
}

string_enum!(
	/// Organization member role
	Role {
		Owner => "owner",
		Admin => "admin",
		Member => "member",
		Guest => "guest",
	}
);

string_enum!(
	/// Top-level functional area, the unit of permission granularity
	Module {
		Crm => "crm",
		Projects => "projects",
		Product => "product",
		Roadmap => "roadmap",
		Tasks => "tasks",
		Notes => "notes",
		Documents => "documents",
		Profitability => "profitability",
	}
);

string_enum!(
	Action {
		Read => "read",
		Create => "create",
		Update => "update",
		Delete => "delete",
	}
);

string_enum!(
	/// Whether a permission row applies to the whole module or to one subview
	PermissionScope {
		Module => "module",
		Subview => "subview",
	}
);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_and_render() {
		for role in Role::ALL {
			assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
		}
		assert_eq!("profitability".parse::<Module>().unwrap(), Module::Profitability);
		assert_eq!(Action::Delete.to_string(), "delete");
	}

	#[test]
	fn test_unknown_name() {
		let err = "superuser".parse::<Role>().unwrap_err();
		assert!(matches!(err, Error::ValidationError(msg) if msg == "unknown Role: superuser"));
		assert!("CRM".parse::<Module>().is_err());
	}

	#[test]
	fn test_serde_lowercase() {
		assert_eq!(serde_json::to_string(&Module::Roadmap).unwrap(), "\"roadmap\"");
		let action: Action = serde_json::from_str("\"update\"").unwrap();
		assert_eq!(action, Action::Update);
	}

	#[test]
	fn test_cardinality() {
		assert_eq!(Role::ALL.len(), 4);
		assert_eq!(Module::ALL.len(), 8);
		assert_eq!(Action::ALL.len(), 4);
	}
}

// vim: ts=4
