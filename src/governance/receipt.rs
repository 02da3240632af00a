//! Execution receipts for state-changing calls.

use super::expiration::BlockInfo;
use crate::actions::Effect;
use crate::serialization::{digest, SerializationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// What a state-changing call did.
///
/// `id` is hex(SHA-256) over the CBOR encoding of the block, action,
/// attributes and effects, so two receipts share an id only if they describe
/// the same effects at the same point in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
    pub action: String,
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Receipt {
    pub(crate) fn new(action: &str) -> Self {
        Self {
            id: String::new(),
            action: action.to_string(),
            attributes: vec![Attribute {
                key: "action".to_string(),
                value: action.to_string(),
            }],
            effects: Vec::new(),
        }
    }

    pub(crate) fn add_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push(Attribute {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub(crate) fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    pub(crate) fn seal(mut self, block: &BlockInfo) -> Result<Self, SerializationError> {
        self.id = digest(&(block, &self.action, &self.attributes, &self.effects))?;
        Ok(self)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Proposal the call acted on, if any.
    pub fn proposal_id(&self) -> Option<u64> {
        self.attribute("proposal_id")?.parse().ok()
    }
}
