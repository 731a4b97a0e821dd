//! Free-text location to area identifier resolution.
//!
//! The bundled resolver is a coarse postcode-prefix heuristic. A production
//! deployment replaces it with a resolver backed by the ONS postcode directory;
//! nothing else in the crate depends on how resolution is done.

use std::collections::BTreeMap;

/// Strategy for mapping a location string onto an area identifier.
pub trait LocationResolver: Send + Sync {
    /// Returns `None` whenever the location cannot be classified.
    fn resolve(&self, location: &str) -> Option<String>;
}

/// Maps the alphabetic postcode area (the letters before the first digit of
/// the outward code) to an area identifier.
#[derive(Debug, Clone, Default)]
pub struct PostcodePrefixResolver {
    areas: BTreeMap<String, String>,
}

const LONDON_BRMA: &str = "E09000002";
const LONDON_POSTCODE_AREAS: [&str; 6] = ["SW", "SE", "E", "W", "N", "NW"];

impl PostcodePrefixResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_area(mut self, postcode_area: &str, area_id: &str) -> Self {
        self.areas
            .insert(postcode_area.to_ascii_uppercase(), area_id.to_string());
        self
    }

    /// The London-only mapping the service ships with.
    pub fn london_default() -> Self {
        LONDON_POSTCODE_AREAS
            .iter()
            .fold(Self::new(), |resolver, area| {
                resolver.with_area(area, LONDON_BRMA)
            })
    }
}

impl LocationResolver for PostcodePrefixResolver {
    fn resolve(&self, location: &str) -> Option<String> {
        let normalized = location
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        let postcode_area = normalized
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>();
        if postcode_area.is_empty() || postcode_area.len() == normalized.len() {
            return None;
        }
        self.areas.get(&postcode_area).cloned()
    }
}
