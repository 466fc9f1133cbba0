use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HANDLER_SEND_MESSAGE: &str = "SendMessage";
pub const HANDLER_RESPONDERS: &str = "Responders";
pub const HANDLER_DISASTER_SERVICE: &str = "DisasterService";
pub const HANDLER_INCIDENT_PRIORITY: &str = "IncidentPriorityService";

pub const PARAM_MESSAGE_TYPE: &str = "MessageType";
pub const PARAM_PAYLOAD: &str = "Payload";

/// Side-effecting step delegated by the workflow engine. Arrives on the
/// work-item stream and is completed back through the engine once handled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    #[serde(default)]
    pub process_instance_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub parameters: Value,
}

impl WorkItem {
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_work_item_parameter_lookup() {
        let item: WorkItem = serde_json::from_value(json!({
            "id": "wi-9",
            "processInstanceId": 314,
            "name": "SendMessage",
            "parameters": {
                "MessageType": "CreateMission",
                "Payload": {"incidentId": "incident-1"}
            }
        }))
        .unwrap();

        assert_eq!(item.process_instance_id, Some(314));
        assert_eq!(
            item.parameter(PARAM_MESSAGE_TYPE),
            Some(&json!("CreateMission"))
        );
        assert_eq!(item.parameter("Missing"), None);
    }

    #[test]
    fn test_work_item_tolerates_missing_parameters() {
        let item: WorkItem = serde_json::from_value(json!({
            "id": "wi-10",
            "name": "Responders"
        }))
        .unwrap();

        assert_eq!(item.process_instance_id, None);
        assert_eq!(item.parameter(PARAM_PAYLOAD), None);
    }
}
