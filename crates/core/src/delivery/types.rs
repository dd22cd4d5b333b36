//! Types for the delivery module.

use serde::{Deserialize, Serialize};

/// Terminal result of one delivery, reported exactly once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The artifact bytes were handed to the chat platform directly.
    Delivered,
    /// The artifact was staged remotely; the user gets a URL.
    DeliveredViaRemote { url: String },
    /// Delivery failed; `reason` is shown to the requester.
    Failed { reason: String },
}

impl DeliveryOutcome {
    /// Whether the artifact reached the user in some form.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_classification() {
        assert!(DeliveryOutcome::Delivered.is_success());
        assert!(DeliveryOutcome::DeliveredViaRemote {
            url: "https://host/x".to_string()
        }
        .is_success());
        assert!(!DeliveryOutcome::Failed {
            reason: "nope".to_string()
        }
        .is_success());
    }

    #[test]
    fn test_serialization_tag() {
        let json = serde_json::to_string(&DeliveryOutcome::DeliveredViaRemote {
            url: "https://host/x".to_string(),
        })
        .unwrap();
        assert!(json.contains("\"outcome\":\"delivered_via_remote\""));
    }
}
