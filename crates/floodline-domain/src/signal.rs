use serde_json::Value;

pub const SIGNAL_MISSION_STARTED: &str = "MissionStarted";
pub const SIGNAL_VICTIM_PICKED_UP: &str = "VictimPickedUp";
pub const SIGNAL_VICTIM_DELIVERED: &str = "VictimDelivered";
pub const SIGNAL_RESPONDER_AVAILABLE: &str = "ResponderAvailable";

/// Named trigger delivered to a waiting workflow instance, optionally
/// carrying a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub name: String,
    pub value: Option<Value>,
}

impl Signal {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}
