//! Status reporting for disallowed admission responses.
use serde::{Deserialize, Serialize};

/// A Kubernetes status object, reduced to the fields a webhook reply carries.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Status {
    /// Status of the operation
    ///
    /// One of: `Success` or `Failure` - [more info](https://git.k8s.io/community/contributors/devel/sig-architecture/api-conventions.md#spec-and-status)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusSummary>,

    /// Suggested HTTP return code (0 if unset)
    #[serde(default, skip_serializing_if = "is_u16_zero")]
    pub code: u16,

    /// A human-readable description of the status of this operation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// A machine-readable description of why this operation is in the "Failure" status.
    ///
    /// If this value is empty there is no information available.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl Status {
    /// Returns an unsuccessful `Status`
    pub fn failure(message: &str, reason: &str) -> Self {
        Status {
            status: Some(StatusSummary::Failure),
            code: 0,
            message: message.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Sets an explicit HTTP status code
    #[must_use]
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Checks if this `Status` represents failure
    pub fn is_failure(&self) -> bool {
        self.status == Some(StatusSummary::Failure)
    }
}

/// Overall status of the operation
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub enum StatusSummary {
    /// Operation succeeded
    Success,
    /// Operation failed
    Failure,
}

fn is_u16_zero(v: &u16) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_code_and_message() {
        let status = Status::failure("cannot parse object", "").with_code(400);
        assert!(status.is_failure());
        let js = serde_json::to_value(&status).unwrap();
        assert_eq!(
            js,
            serde_json::json!({"status": "Failure", "code": 400, "message": "cannot parse object"})
        );
    }

    #[test]
    fn empty_fields_stay_off_the_wire() {
        let js = serde_json::to_value(Status::default()).unwrap();
        assert_eq!(js, serde_json::json!({}));
    }
}
