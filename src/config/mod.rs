//! Configuration loading for the laytime engine.
//!
//! This module loads the statement-of-facts event profile from YAML files:
//! profile metadata plus the default counting behavior per recorded event
//! type. Activities that arrive without an explicit counting behavior fall
//! back to this profile.
//!
//! # Example
//!
//! ```no_run
//! use laytime_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sof").unwrap();
//! println!("Loaded profile: {}", config.profile().metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EventProfile, EventTypeRule, EventTypesConfig, ProfileMetadata};
