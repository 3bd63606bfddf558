use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Kinds of platform objects an extension can react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Orders,
}

impl EventType {
    pub const ALL: [EventType; 1] = [EventType::Orders];

    /// Wire name, e.g. `"orders"`
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::Orders => "orders",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orders" => Ok(EventType::Orders),
            other => Err(format!("Unknown event type: {other}")),
        }
    }
}

/// A platform object queued for processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Platform object id, e.g. `ORD-1234-5678`
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub data: Value,
}

impl Event {
    pub fn new(id: impl Into<String>, event_type: EventType, data: Value) -> Self {
        Self {
            id: id.into(),
            event_type,
            data,
        }
    }

    /// Key that identifies in-flight work for this event
    pub fn key(&self) -> EventKey {
        (self.event_type, self.id.clone())
    }
}

/// `(type, id)` pair; at most one event per key is processed at a time
pub type EventKey = (EventType, String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_wire_name() {
        assert_eq!(EventType::Orders.to_string(), "orders");
        assert_eq!("orders".parse::<EventType>(), Ok(EventType::Orders));
        assert!("agreements".parse::<EventType>().is_err());
        assert_eq!(serde_json::to_value(EventType::Orders).unwrap(), json!("orders"));
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new("ORD-1", EventType::Orders, json!({"id": "ORD-1"}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "orders");
        assert_eq!(event.key(), (EventType::Orders, "ORD-1".to_string()));
    }
}
