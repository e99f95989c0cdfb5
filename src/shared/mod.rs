//! Shared newtypes used across the wire codec, dispatch, and client.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw string form used on the wire, so they can be
//! embedded in host-side configuration or persisted state without
//! conversion overhead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SdkError;

// ─── CommandName ─────────────────────────────────────────────────────────────

/// Well-known name of a command type (e.g. `"sign-message"`).
///
/// Used as the URL host on both the outbound request and the inbound
/// callback, which is what routes a callback to the right command type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandName(String);

impl CommandName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommandName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CommandName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for CommandName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CommandName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(CommandName(s))
    }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// Signer address in the wallet's own string form.
///
/// The SDK treats addresses as opaque; validating one is the wallet's
/// job, and a bad address comes back as a wallet-side error code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Address(s))
    }
}

// ─── Scheme ──────────────────────────────────────────────────────────────────

/// A validated URL scheme.
///
/// Accepts the RFC 3986 shape `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
/// and normalizes to lowercase. Validated once at construction so URL
/// emission downstream never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scheme(String);

impl Scheme {
    pub fn new(s: impl Into<String>) -> Result<Self, SdkError> {
        let s = s.into();
        let mut chars = s.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            }
            _ => false,
        };
        if valid {
            Ok(Scheme(s.to_ascii_lowercase()))
        } else {
            Err(SdkError::InvalidScheme(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Scheme {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::new(s)
    }
}

impl Serialize for Scheme {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Scheme::new(s).map_err(serde::de::Error::custom)
    }
}

// ─── RequestId ───────────────────────────────────────────────────────────────

/// Per-command correlation token.
///
/// Carried as the `request` query parameter on the emitted callback URL
/// and required to be echoed verbatim by the wallet on the inbound
/// callback. This is what lets two same-type commands be in flight at
/// once without their callbacks crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// A fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated string form. Returns `None` on anything else.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RequestId::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid request id {s:?}")))
    }
}
