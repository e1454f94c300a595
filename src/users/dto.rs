use serde::{Deserialize, Serialize};

/// Request body for user registration. All fields are optional at the serde
/// level so that missing values surface as a 400 instead of a reject.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    #[serde(rename = "studentID")]
    pub student_id: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "choiceType")]
    pub choice_type: Option<String>,
    pub topic: Option<String>,
}

/// Request body for the roster pre-check.
#[derive(Debug, Deserialize)]
pub struct QuipuCheckRequest {
    #[serde(rename = "studentID")]
    pub student_id: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "studentID")]
    pub student_id: Option<String>,
    pub password: Option<String>,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub name: String,
    #[serde(rename = "choiceType")]
    pub choice_type: String,
    pub token: String,
}

/// Public part of a profile returned from the store endpoints.
#[derive(Debug, Serialize)]
pub struct StoreProfile {
    pub username: String,
    #[serde(rename = "choiceType")]
    pub choice_type: String,
}

/// One row of the directory listing.
#[derive(Debug, Serialize)]
pub struct StoreEntry {
    pub userid: i64,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_uses_wire_field_names() {
        let body = r#"{"name":"길동 홍","studentID":"S1","password":"pw","choiceType":"A"}"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.student_id.as_deref(), Some("S1"));
        assert_eq!(req.choice_type.as_deref(), Some("A"));
        assert!(req.topic.is_none());
    }

    #[test]
    fn missing_fields_deserialize_to_none() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
        assert!(req.student_id.is_none());
        assert!(req.password.is_none());
        assert!(req.choice_type.is_none());
    }

    #[test]
    fn store_profile_serializes_choice_type_camel_case() {
        let profile = StoreProfile {
            username: "홍길동".into(),
            choice_type: "A".into(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"choiceType\":\"A\""));
    }
}
