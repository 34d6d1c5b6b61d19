//! Dotted numeric version specifications.
//!
//! A [`VersionSpec`] is an arbitrary-length tuple of numeric components
//! such as `16.0.24310.12000`. Versions compare component by component,
//! left to right, with missing trailing components treated as `0`, so
//! `2.0` and `2.0.0` are equal.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// The input was empty (or only whitespace / a bare `v`).
    #[error("version string is empty")]
    Empty,

    /// A component between dots was empty, e.g. `1..2`.
    #[error("version '{input}' has an empty component")]
    EmptyComponent { input: String },

    /// A component was not a non-negative integer.
    #[error("version '{input}' has a non-numeric component '{component}'")]
    InvalidComponent { input: String, component: String },
}

/// A dotted numeric version with zero-padded total ordering.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    components: Vec<u64>,
}

impl VersionSpec {
    /// Parse a version string like `1.2.3` or `v16.0.24310.12000`.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if body.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut components = Vec::new();
        for part in body.split('.') {
            if part.is_empty() {
                return Err(VersionParseError::EmptyComponent {
                    input: input.to_string(),
                });
            }
            let value = part
                .parse::<u64>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    input: input.to_string(),
                    component: part.to_string(),
                })?;
            components.push(value);
        }

        Ok(Self { components })
    }

    /// Build a version directly from its components.
    pub fn from_components(components: Vec<u64>) -> Self {
        Self { components }
    }

    /// The components as parsed, without padding.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Whether this version meets an inclusive minimum.
    pub fn satisfies(&self, minimum: &VersionSpec) -> bool {
        self >= minimum
    }

    /// Components with trailing zeros removed; the canonical form used
    /// for equality and hashing.
    fn significant(&self) -> &[u64] {
        let len = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..len]
    }
}

impl Ord for VersionSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionSpec {}

impl Hash for VersionSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for VersionSpec {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VersionVisitor)
    }
}

struct VersionVisitor;

impl<'de> Visitor<'de> for VersionVisitor {
    type Value = VersionSpec;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a dotted numeric version string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        VersionSpec::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(VersionSpec::from_components(vec![v]))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(|v| VersionSpec::from_components(vec![v]))
            .map_err(|_| E::custom(format!("version {} is negative", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // 1.10 and 1.1 are the same float; refuse to guess.
        Err(E::custom(format!(
            "version {} was read as a number; quote it as a string",
            v
        )))
    }
}
