use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Email and password, as sent to `/register` and `/login`.
#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_fail_validation() {
        let request = CredentialsRequest {
            email: String::new(),
            password: "secret".to_string(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let request = CredentialsRequest {
            email: "reader@example.com".to_string(),
            password: String::new(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn filled_credentials_pass_validation() {
        let request = CredentialsRequest {
            email: "reader@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn user_response_omits_password() {
        let user = User {
            id: 1,
            email: "reader@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "email": "reader@example.com"}));
    }
}
