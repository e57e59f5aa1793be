use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::Token;

/// Durable record for one tracked series, owned by the external store. The
/// engine reads everything and writes back only `last_read_token`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeriesRecord {
    /// Unique display key, compared case-insensitively.
    pub title: String,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    /// Normalized host -> handle used in that site's URL templates when the
    /// site's internal identifier diverges from the derived slug.
    #[serde(default)]
    pub site_overrides: HashMap<String, String>,
    /// Authoritative progress marker, shared across devices.
    pub last_read_token: Option<Token>,
}

impl SeriesRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            aliases: BTreeSet::new(),
            site_overrides: HashMap::new(),
            last_read_token: None,
        }
    }
}
