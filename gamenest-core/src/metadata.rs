/// Per-folder metadata persisted next to a discovered game.
///
/// `id` is the source of truth for the title's identity once written;
/// the other fields record what background enrichment has already done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameMetadata {
    /// Stable numeric identifier, never 0.
    pub id: u32,
    /// Artwork has already been fetched for this folder.
    pub steam_grid_fetched: bool,
    /// Release date in unix seconds, when one has been discovered.
    pub release_date: Option<i64>,
}

impl GameMetadata {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            steam_grid_fetched: false,
            release_date: None,
        }
    }

    pub fn with_steam_grid_fetched(mut self, fetched: bool) -> Self {
        self.steam_grid_fetched = fetched;
        self
    }

    pub fn with_release_date(mut self, release_date: Option<i64>) -> Self {
        self.release_date = release_date.filter(|&ts| ts > 0);
        self
    }

    /// Combine `self` (the incoming record) with what is already stored.
    ///
    /// The incoming id always wins, the fetched flag is sticky, and a
    /// missing release date falls back to the stored one.
    pub fn merged_over(self, existing: Option<&GameMetadata>) -> GameMetadata {
        match existing {
            None => self,
            Some(old) => GameMetadata {
                id: self.id,
                steam_grid_fetched: self.steam_grid_fetched || old.steam_grid_fetched,
                release_date: self.release_date.or(old.release_date),
            },
        }
    }
}

/// A partial update to a stored [`GameMetadata`] record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    pub id: Option<u32>,
    pub steam_grid_fetched: Option<bool>,
    pub release_date: Option<i64>,
}

impl MetadataPatch {
    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn steam_grid_fetched(mut self, fetched: bool) -> Self {
        self.steam_grid_fetched = Some(fetched);
        self
    }

    pub fn release_date(mut self, release_date: i64) -> Self {
        self.release_date = Some(release_date);
        self
    }

    /// Apply this patch over the stored record.
    ///
    /// Returns `None` when neither the patch nor the stored record supplies
    /// an id: a record without an id cannot be written.
    pub fn apply_to(&self, existing: Option<&GameMetadata>) -> Option<GameMetadata> {
        let id = self.id.filter(|&id| id != 0).or(existing.map(|m| m.id))?;
        Some(GameMetadata {
            id,
            steam_grid_fetched: self
                .steam_grid_fetched
                .or(existing.map(|m| m.steam_grid_fetched))
                .unwrap_or(false),
            release_date: self
                .release_date
                .filter(|&ts| ts > 0)
                .or(existing.and_then(|m| m.release_date)),
        })
    }
}
