use std::fmt;

use serde::Deserialize;
use serde::Serialize;

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Clone)]
pub enum Outcome {
    Success,
    Failure,
}

/// `Status` object the api server answers deletes and failed requests with
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaStatus {
    pub code: Option<u16>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub status: Option<Outcome>,
}

impl MetaStatus {
    pub fn failure<R, M>(code: u16, reason: R, message: M) -> Self
    where
        R: Into<String>,
        M: Into<String>,
    {
        Self {
            code: Some(code),
            reason: Some(reason.into()),
            message: Some(message.into()),
            status: Some(Outcome::Failure),
        }
    }

    pub fn success() -> Self {
        Self {
            status: Some(Outcome::Success),
            ..Default::default()
        }
    }

    pub fn not_found(kind: &str, name: &str) -> Self {
        Self::failure(
            STATUS_NOT_FOUND,
            "NotFound",
            format!("{} \"{}\" not found", kind, name),
        )
    }

    pub fn conflict(kind: &str, name: &str) -> Self {
        Self::failure(
            STATUS_CONFLICT,
            "AlreadyExists",
            format!("{} \"{}\" already exists", kind, name),
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Some(STATUS_NOT_FOUND)
    }

    pub fn is_conflict(&self) -> bool {
        self.code == Some(STATUS_CONFLICT)
    }
}

impl fmt::Display for MetaStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.code, &self.message, &self.reason) {
            (Some(code), Some(message), _) => write!(f, "{}: {}", code, message),
            (Some(code), None, _) => write!(f, "status code: {}", code),
            (None, Some(message), _) => write!(f, "{}", message),
            (None, None, Some(reason)) => write!(f, "{}", reason),
            (None, None, None) => write!(f, "unknown api status"),
        }
    }
}

impl std::error::Error for MetaStatus {}

#[cfg(test)]
mod test {

    use super::{MetaStatus, Outcome};

    #[test]
    fn test_decode_not_found_status() {
        let data = r#"
        {
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": "deployments.apps \"workspace-jdoe\" not found",
            "reason": "NotFound",
            "details": { "name": "workspace-jdoe", "group": "apps", "kind": "deployments" },
            "code": 404
        }"#;

        let status: MetaStatus = serde_json::from_str(data).expect("status");
        assert!(status.is_not_found());
        assert!(!status.is_conflict());
        assert_eq!(status.status, Some(Outcome::Failure));
        assert_eq!(
            status.to_string(),
            "404: deployments.apps \"workspace-jdoe\" not found"
        );
    }

    #[test]
    fn test_conflict_message() {
        let status = MetaStatus::conflict("Service", "workspace-jdoe-service");
        assert!(status.is_conflict());
        assert_eq!(status.reason.as_deref(), Some("AlreadyExists"));
    }
}
