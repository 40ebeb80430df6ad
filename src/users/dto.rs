use serde::{Deserialize, Serialize};

// Absent fields decode as empty strings and fail validation downstream.

/// Request body for signup.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for profile edit. `birthday` is `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditRequest {
    pub nickname: String,
    pub birthday: String,
    pub about_me: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub nickname: String,
    pub email: String,
    pub about_me: String,
    pub birthday: String,
}
