//! Explicit ownership inputs for the resolver
//!
//! Cardinality alone cannot decide which side of a one-to-one holds the
//! foreign key, nor which endpoint of a many-to-many exposes the
//! maintenance operation. Callers state both explicitly.

use std::collections::HashMap;
use std::str::FromStr;

use crate::core::DiagramError;

/// Unordered class pair
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipHints {
    owners: HashMap<(String, String), String>,
    maintainers: HashMap<(String, String), String>,
}

impl OwnershipHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// `holder` keeps the foreign key of the one-to-one between `a` and `b`
    pub fn with_owner(mut self, a: &str, b: &str, holder: &str) -> Self {
        self.owners.insert(pair_key(a, b), holder.to_string());
        self
    }

    /// `endpoint` receives the maintenance operation of the association
    /// between `a` and `b`
    pub fn with_maintainer(mut self, a: &str, b: &str, endpoint: &str) -> Self {
        self.maintainers.insert(pair_key(a, b), endpoint.to_string());
        self
    }

    pub fn owner(&self, a: &str, b: &str) -> Option<&str> {
        self.owners.get(&pair_key(a, b)).map(String::as_str)
    }

    pub fn maintainer(&self, a: &str, b: &str) -> Option<&str> {
        self.maintainers.get(&pair_key(a, b)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty() && self.maintainers.is_empty()
    }
}

/// Command-line form of a hint: `A:B=Holder`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairHint {
    pub class_a: String,
    pub class_b: String,
    pub chosen: String,
}

impl FromStr for PairHint {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DiagramError::invalid_command(format!("expected A:B=Holder, got '{}'", s));
        let (pair, chosen) = s.split_once('=').ok_or_else(invalid)?;
        let (class_a, class_b) = pair.split_once(':').ok_or_else(invalid)?;
        let (class_a, class_b, chosen) = (class_a.trim(), class_b.trim(), chosen.trim());
        if class_a.is_empty() || class_b.is_empty() || chosen.is_empty() {
            return Err(invalid());
        }
        if chosen != class_a && chosen != class_b {
            return Err(DiagramError::invalid_command(format!(
                "'{}' is not one of {} and {}",
                chosen, class_a, class_b
            )));
        }
        Ok(Self {
            class_a: class_a.to_string(),
            class_b: class_b.to_string(),
            chosen: chosen.to_string(),
        })
    }
}
