//! Load combinations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A load combination defines how load cases are combined for analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Name of the load combination
    pub name: String,
    /// Factors for each load case (case_name -> factor)
    pub factors: BTreeMap<String, f64>,
    /// Optional tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LoadCombination {
    /// Create a new load combination
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            factors: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Create a load combination with a single load case at factor 1.0
    pub fn single(name: &str, case: &str) -> Self {
        Self::new(name).with_case(case, 1.0)
    }

    /// Add a load case with a factor
    pub fn with_case(mut self, case: &str, factor: f64) -> Self {
        self.factors.insert(case.to_string(), factor);
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Get the factor for a load case (zero when the case is not part of the combination)
    pub fn factor(&self, case: &str) -> f64 {
        self.factors.get(case).copied().unwrap_or(0.0)
    }

    /// Check if this combination includes a specific load case
    pub fn includes(&self, case: &str) -> bool {
        self.factor(case).abs() > 1e-10
    }

    /// True if the combination carries any of the given tags
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    /// LRFD 1.4D
    pub fn lrfd_dead_only() -> Self {
        Self::new("1.4D").with_case("D", 1.4)
    }

    /// LRFD 1.2D + 1.6L
    pub fn lrfd_dead_live() -> Self {
        Self::new("1.2D+1.6L").with_case("D", 1.2).with_case("L", 1.6)
    }
}
