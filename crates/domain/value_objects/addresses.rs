use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Postal address used for user profiles and order shipping. Stored as JSONB.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

impl Address {
    /// SQL NULL and a JSON `null` both read as no address.
    pub fn from_json(value: Option<serde_json::Value>) -> Result<Option<Self>> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .context("stored address is unreadable"),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).context("failed to encode address")
    }

    pub fn is_blank(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.pincode]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}
