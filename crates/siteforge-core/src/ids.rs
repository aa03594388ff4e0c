//! Strongly Typed Identifiers
//!
//! Newtype wrappers around [`Uuid`] so that a deployment identifier can never
//! be passed where a client identifier is expected.
//!
//! # Example
//!
//! ```
//! use siteforge_core::{ClientId, DeploymentId};
//!
//! let client = ClientId::new();
//! let deployment = DeploymentId::new();
//!
//! fn requires_client(id: ClientId) -> String {
//!     id.to_string()
//! }
//!
//! let _ = requires_client(client);
//! // requires_client(deployment); // does not compile
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The underlying UUID parse error message.
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the underlying UUID by value.
            #[must_use]
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for a provisioned client site.
    ///
    /// # Example
    ///
    /// ```
    /// use siteforge_core::ClientId;
    ///
    /// let id = ClientId::new();
    /// let parsed: ClientId = id.to_string().parse().unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    ClientId
);

define_id!(
    /// Strongly typed identifier for a deployment history entry.
    DeploymentId
);

#[cfg(test)]
mod tests {
    use super::*;

    mod client_id_tests {
        use super::*;

        #[test]
        fn test_new_creates_valid_id() {
            let id = ClientId::new();
            let id_str = id.to_string();
            // UUID format: 8-4-4-4-12 hex digits
            assert_eq!(id_str.len(), 36);
            assert!(id_str.contains('-'));
        }

        #[test]
        fn test_from_uuid_preserves_value() {
            let uuid = Uuid::new_v4();
            let id = ClientId::from_uuid(uuid);
            assert_eq!(id.as_uuid(), &uuid);
        }

        #[test]
        fn test_default_creates_new_id() {
            let id1 = ClientId::default();
            let id2 = ClientId::default();
            assert_ne!(id1, id2);
        }
    }

    mod from_str_tests {
        use super::*;

        #[test]
        fn test_parse_valid_uuid() {
            let id: ClientId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
            assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        }

        #[test]
        fn test_parse_invalid_uuid_returns_error() {
            let result: std::result::Result<ClientId, _> = "not-a-uuid".parse();
            assert!(result.is_err());
            let err = result.unwrap_err();
            assert_eq!(err.id_type, "ClientId");
            assert!(!err.message.is_empty());
        }

        #[test]
        fn test_error_display_names_the_type() {
            let result: std::result::Result<DeploymentId, _> = "invalid".parse();
            let err = result.unwrap_err();
            let display = err.to_string();
            assert!(display.contains("DeploymentId"));
            assert!(display.contains("Failed to parse"));
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_serializes_as_plain_string() {
            let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
            let id = ClientId::from_uuid(uuid);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
        }

        #[test]
        fn test_roundtrip() {
            let original = DeploymentId::new();
            let json = serde_json::to_string(&original).unwrap();
            let deserialized: DeploymentId = serde_json::from_str(&json).unwrap();
            assert_eq!(original, deserialized);
        }
    }
}
