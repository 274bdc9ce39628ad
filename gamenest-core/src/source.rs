use serde::{Deserialize, Serialize};

/// Where a library title comes from.
///
/// Each variant owns a fixed tag used in composite identifiers
/// (`STEAM_123`, `CUSTOM_GAME_456`) and a small table of per-source
/// behaviour, replacing per-source subclassing with one `match` per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    /// A title owned through the Steam account and managed by the Steam service.
    Steam,
    /// A folder on disk discovered by the library scanner.
    CustomGame,
}

/// All source variants, in the order prefixes are tried when parsing.
const ALL_SOURCES: &[SourceKind] = &[SourceKind::CustomGame, SourceKind::Steam];

impl SourceKind {
    /// Tag used as the prefix of composite identifiers.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Steam => "STEAM",
            Self::CustomGame => "CUSTOM_GAME",
        }
    }

    /// Human-readable name for listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Steam => "Steam",
            Self::CustomGame => "Custom Game",
        }
    }

    /// Whether titles from this source are kept in sync with a cloud save store.
    ///
    /// Sources without cloud saves skip the launch-time synchronization step.
    pub fn has_cloud_saves(&self) -> bool {
        match self {
            Self::Steam => true,
            Self::CustomGame => false,
        }
    }

    /// Whether titles from this source live in folders found by the scanner.
    pub fn is_locally_discovered(&self) -> bool {
        match self {
            Self::Steam => false,
            Self::CustomGame => true,
        }
    }

    /// Titles from this source count as installed as soon as they are listed.
    pub fn installed_when_listed(&self) -> bool {
        self.is_locally_discovered()
    }

    /// All source variants.
    pub fn all() -> &'static [SourceKind] {
        ALL_SOURCES
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Error returned when a string is not a known source tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game source: '{0}'")]
pub struct SourceParseError(pub String);

impl std::str::FromStr for SourceKind {
    type Err = SourceParseError;

    /// Parse a source from its tag (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_SOURCES
            .iter()
            .copied()
            .find(|source| source.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| SourceParseError(s.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
