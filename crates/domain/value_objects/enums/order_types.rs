use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Regular,
    Subscription,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Regular => "regular",
            OrderType::Subscription => "subscription",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "regular" => Some(OrderType::Regular),
            "subscription" => Some(OrderType::Subscription),
            _ => None,
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
