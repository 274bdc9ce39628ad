//! Composite game identifiers.
//!
//! A [`GameId`] pairs a [`SourceKind`] with a positive numeric id and is the
//! only reference to a title that crosses component boundaries. Its string
//! form is `"<SOURCE_TAG>_<id>"`, e.g. `CUSTOM_GAME_184467` or `STEAM_620`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::source::SourceKind;

/// Errors produced when parsing a composite identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameIdError {
    /// The string does not start with any known source tag followed by `_`.
    #[error("unknown source prefix in game id '{0}'")]
    UnknownSource(String),

    /// The part after the source tag is not a number that fits in `u32`.
    #[error("invalid numeric part in game id '{0}'")]
    InvalidNumber(String),

    /// Zero is reserved to mean "no id".
    #[error("game id '{0}' uses the reserved value 0")]
    Zero(String),
}

/// A source-qualified game identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId {
    source: SourceKind,
    id: u32,
}

impl GameId {
    /// Build an identifier. Returns `None` for the reserved id 0.
    pub fn new(source: SourceKind, id: u32) -> Option<Self> {
        (id != 0).then_some(Self { source, id })
    }

    /// Shorthand for a scanner-discovered title.
    pub fn custom(id: u32) -> Option<Self> {
        Self::new(SourceKind::CustomGame, id)
    }

    /// Shorthand for a Steam title.
    pub fn steam(id: u32) -> Option<Self> {
        Self::new(SourceKind::Steam, id)
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// The numeric part, always non-zero.
    pub fn numeric(&self) -> u32 {
        self.id
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.source.tag(), self.id)
    }
}

impl std::str::FromStr for GameId {
    type Err = GameIdError;

    /// Parse `"<SOURCE_TAG>_<id>"`.
    ///
    /// Tags are matched as whole prefixes because a tag may itself contain
    /// an underscore (`CUSTOM_GAME`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, rest) = SourceKind::all()
            .iter()
            .find_map(|&source| {
                s.strip_prefix(source.tag())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| (source, rest))
            })
            .ok_or_else(|| GameIdError::UnknownSource(s.to_string()))?;

        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GameIdError::InvalidNumber(s.to_string()));
        }
        let id: u32 = rest
            .parse()
            .map_err(|_| GameIdError::InvalidNumber(s.to_string()))?;

        GameId::new(source, id).ok_or_else(|| GameIdError::Zero(s.to_string()))
    }
}

impl Serialize for GameId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GameId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "tests/game_id_tests.rs"]
mod tests;
