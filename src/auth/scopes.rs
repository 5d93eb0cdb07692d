//! OAuth scope lists.
//!
//! Shopify sends and receives scopes as a comma-separated string. Both the
//! scopes requested at install time and the scopes granted in the token
//! response go through [`AuthScopes`].

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An ordered, de-duplicated list of OAuth scopes.
///
/// Order is preserved as given, so the list forwarded to the front end reads
/// exactly like the one Shopify granted.
///
/// # Example
///
/// ```rust
/// use shopify_gateway::AuthScopes;
///
/// let scopes: AuthScopes = "read_products, write_products,,read_products".parse().unwrap();
/// assert_eq!(scopes.to_string(), "read_products,write_products");
/// assert_eq!(scopes.into_vec(), vec!["read_products", "write_products"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// Creates an empty scope list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the `scope` field of a token response.
    ///
    /// Shopify controls this value, so it is split and trimmed but not
    /// validated; a missing field yields an empty list.
    #[must_use]
    pub fn from_granted(scope: Option<&str>) -> Self {
        let mut scopes = Self::new();
        for scope in scope.unwrap_or_default().split(',') {
            scopes.push(scope.trim());
        }
        scopes
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if `scope` is in the list.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Returns an iterator over the scopes in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Consumes the list, returning the scopes in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.scopes
    }

    fn push(&mut self, scope: &str) {
        if !scope.is_empty() && !self.contains(scope) {
            self.scopes.push(scope.to_string());
        }
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Self::new();

        for scope in s.split(',').map(str::trim) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            scopes.push(scope);
        }

        Ok(scopes)
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.scopes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let scopes = Vec::<String>::deserialize(deserializer)?;
        scopes.join(",").parse().map_err(de::Error::custom)
    }
}
