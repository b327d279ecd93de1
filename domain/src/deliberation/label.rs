//! Anonymous label assignment for the peer-ranking stage.
//!
//! Judges must not know which model wrote which answer, so every usable
//! stage-1 answer is presented under an opaque label ("Response A",
//! "Response B", ...). The mapping is a total bijection over exactly the
//! models being ranked, generated fresh for every run and never reused
//! across runs.

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session-scoped bijection between models and anonymous labels (Value Object)
///
/// Assignment order is the order of the `models` slice passed to
/// [`LabelMap::assign`] (stage-1 completion order in practice) and is
/// fixed before any judge is invoked, independent of any ranking outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMap {
    entries: Vec<(String, Model)>,
}

impl LabelMap {
    /// Maximum number of participants one label alphabet can cover
    pub const MAX_PARTICIPANTS: usize = 26;

    /// Build the bijection "Response A".."Response Z" over `models`.
    ///
    /// More than 26 participants is a configuration error, not a runtime
    /// condition the pipeline degrades around.
    pub fn assign(models: &[Model]) -> Result<Self, DomainError> {
        if models.len() > Self::MAX_PARTICIPANTS {
            return Err(DomainError::TooManyParticipants(models.len()));
        }

        let entries = models
            .iter()
            .enumerate()
            .map(|(i, m)| (format!("Response {}", (b'A' + i as u8) as char), m.clone()))
            .collect();

        Ok(Self { entries })
    }

    /// Rebuild a map from the wire representation carried by
    /// `stage2_complete` events. Label order ("Response A".."Response Z")
    /// is the assignment order, so the bijection round-trips.
    pub fn from_wire(wire: &BTreeMap<String, Model>) -> Self {
        Self {
            entries: wire.iter().map(|(l, m)| (l.clone(), m.clone())).collect(),
        }
    }

    pub fn label_for(&self, model: &Model) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, m)| m == model)
            .map(|(l, _)| l.as_str())
    }

    pub fn model_for(&self, label: &str) -> Option<&Model> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, m)| m)
    }

    /// Labels in assignment order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    /// (label, model) pairs in assignment order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.entries.iter().map(|(l, m)| (l.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every label occurrence in `text` with the model identifier.
    ///
    /// Display only. Text going back to a model always stays anonymized.
    pub fn deanonymize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (label, model) in &self.entries {
            out = out.replace(label.as_str(), model.as_str());
        }
        out
    }

    /// Label -> model map in the shape the event protocol carries
    pub fn to_wire(&self) -> BTreeMap<String, Model> {
        self.entries
            .iter()
            .map(|(l, m)| (l.clone(), m.clone()))
            .collect()
    }
}
