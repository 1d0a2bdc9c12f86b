//! Configuration types for the statement-of-facts event profile.
//!
//! These strongly-typed structures are deserialized from the YAML files in
//! a profile directory.

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::CountBehavior;

/// Metadata about an event profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileMetadata {
    /// The human-readable name of the profile.
    pub name: String,
    /// The version or effective date of the profile.
    pub version: String,
    /// A description of where the profile's defaults come from.
    pub description: String,
}

/// The default counting rule for one recorded event type.
#[derive(Debug, Clone, Deserialize)]
pub struct EventTypeRule {
    /// A description of the event type.
    pub description: String,
    /// The counting behavior applied when an activity of this type does
    /// not carry an explicit one.
    pub count_behavior: CountBehavior,
}

/// Event types configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EventTypesConfig {
    /// Map of lowercase event type to its default counting rule.
    pub event_types: HashMap<String, EventTypeRule>,
}

/// A loaded statement-of-facts event profile.
#[derive(Debug, Clone)]
pub struct EventProfile {
    metadata: ProfileMetadata,
    event_types: HashMap<String, EventTypeRule>,
}

impl EventProfile {
    /// Creates a profile from already-parsed parts.
    pub fn new(metadata: ProfileMetadata, event_types: HashMap<String, EventTypeRule>) -> Self {
        Self {
            metadata,
            event_types,
        }
    }

    /// A profile with no event-type rules; every lookup falls back to
    /// [`CountBehavior::Full`].
    pub fn empty() -> Self {
        Self {
            metadata: ProfileMetadata {
                name: "empty".to_string(),
                version: "0".to_string(),
                description: "No event-type defaults".to_string(),
            },
            event_types: HashMap::new(),
        }
    }

    /// Returns the profile metadata.
    pub fn metadata(&self) -> &ProfileMetadata {
        &self.metadata
    }

    /// Returns the counting rules keyed by event type.
    pub fn event_types(&self) -> &HashMap<String, EventTypeRule> {
        &self.event_types
    }

    /// The default counting behavior for an event type.
    ///
    /// Lookup is case-insensitive. Unknown event types count in full:
    /// an unrecognized record is never silently dropped from the account.
    pub fn default_behavior(&self, event_type: &str) -> CountBehavior {
        self.event_types
            .get(event_type.trim().to_ascii_lowercase().as_str())
            .map(|rule| rule.count_behavior)
            .unwrap_or(CountBehavior::Full)
    }
}
