//! Load cases

use serde::{Deserialize, Serialize};

/// A load case groups related loads under a common name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    /// Name of the load case
    pub name: String,
    /// Description of the load case
    #[serde(default)]
    pub description: Option<String>,
}

impl LoadCase {
    /// Create a new load case
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
        }
    }

    /// Create a load case with description
    pub fn with_description(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
        }
    }

    pub fn dead() -> Self {
        Self::with_description("D", "Dead loads (self-weight and permanent loads)")
    }

    pub fn live() -> Self {
        Self::with_description("L", "Live loads (occupancy, furniture, etc.)")
    }

    pub fn snow() -> Self {
        Self::with_description("S", "Snow loads")
    }

    pub fn wind() -> Self {
        Self::with_description("W", "Wind loads")
    }
}
