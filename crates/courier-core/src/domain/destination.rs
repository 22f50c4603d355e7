//! Destination records: channels and interests.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ChannelId, DestinationId};

/// Sub-partition of the content source to search within.
///
/// `All` is the distinguished "search everywhere" value. A `Named` scope is
/// never `all` in any casing, so the two cannot alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    All,
    Named(ScopeName),
}

/// Name of a specific scope. Only built through [`Scope::named`] / [`Scope::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeName(String);

impl ScopeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Scope {
    pub const ALL: &'static str = "all";

    /// Scope exactly as given (e.g. by the content provider). Empty or `all`
    /// in any casing means `All`; other names keep their casing.
    pub fn named(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::ALL) {
            Scope::All
        } else {
            Scope::Named(ScopeName(trimmed.to_string()))
        }
    }

    /// Parse a user-supplied scope: like [`named`](Self::named), but lowercased.
    pub fn parse(raw: &str) -> Self {
        Self::named(raw).normalized()
    }

    /// Case-folded form used for interest identity.
    pub fn normalized(self) -> Self {
        match self {
            Scope::All => Scope::All,
            Scope::Named(ScopeName(name)) => Scope::Named(ScopeName(name.to_lowercase())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scope::All => Self::ALL,
            Scope::Named(name) => name.as_str(),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Scope::named(&value)
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        Scope::named(value)
    }
}

impl From<Scope> for String {
    fn from(value: Scope) -> Self {
        value.as_str().to_string()
    }
}

/// A search query plus the scope it runs in.
///
/// Unique within a destination by `(query, scope)`; the scope is lowercased on
/// construction so `SpaceX` and `spacex` are the same interest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interest {
    pub query: String,
    pub scope: Scope,
}

impl Interest {
    pub fn new(query: impl Into<String>, scope: impl Into<Scope>) -> Self {
        Self {
            query: query.into(),
            scope: scope.into().normalized(),
        }
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in {}", self.query, self.scope)
    }
}

/// Persisted per-destination record.
///
/// - `channels` keeps insertion order; duplicates are allowed
/// - `interests` may be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub channels: Vec<ChannelId>,
    pub interests: Vec<Interest>,
}

impl Destination {
    pub fn new(id: DestinationId, channels: Vec<ChannelId>) -> Self {
        Self {
            id,
            channels,
            interests: Vec::new(),
        }
    }

    pub fn has_interest(&self, interest: &Interest) -> bool {
        self.interests.iter().any(|i| i == interest)
    }

    pub fn has_channel(&self, channel: &ChannelId) -> bool {
        self.channels.iter().any(|c| c == channel)
    }
}
