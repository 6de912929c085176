// src/names.rs
use std::collections::HashMap;

/// Canonicalizes free-text employee names to a stable identity key.
/// The same normalizer is applied to task collaborators, leave records
/// and the non-productive denylist, so the three sources agree on
/// identity.
pub struct NameNormalizer {
    aliases: HashMap<String, String>,
}

impl NameNormalizer {
    /// Builds a normalizer from a raw alias table. Keys and values are
    /// collapsed on the way in so that normalization stays idempotent
    /// even if the configured table carries stray casing or whitespace.
    pub fn new(aliases: HashMap<String, String>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(k, v)| (collapse(&k), collapse(&v)))
            .collect();
        Self { aliases }
    }

    /// Lowercase, trim, collapse whitespace runs, then resolve a known
    /// alias. Unknown names come back in collapsed-lowercase form.
    pub fn normalize(&self, raw: &str) -> String {
        let collapsed = collapse(raw);
        match self.aliases.get(&collapsed) {
            Some(canonical) => canonical.clone(),
            None => collapsed,
        }
    }
}

fn collapse(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
