use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// -- News --

/// One form serves both news actions; fields not used by the submitted
/// action default to empty.
#[derive(Debug, Deserialize)]
pub struct NewsForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub news_id: String,
}

// -- Chat --

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

// -- Polls --

#[derive(Debug, Deserialize)]
pub struct PollForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub poll_name: String,
    #[serde(default)]
    pub poll_id: String,
    #[serde(default)]
    pub vote_type: String,
}

// -- Admin --

#[derive(Debug, Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub new_username: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub user_to_delete: String,
    #[serde(default)]
    pub user_to_change: String,
    #[serde(default)]
    pub new_password_value: String,
}

// -- Upload --

/// `/upload` answers with JSON rather than a rendered page: either
/// `{"success": true, "filename": ...}` or `{"error": ...}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Success { success: bool, filename: String },
    Error { error: String },
}

impl UploadResponse {
    pub fn success(filename: String) -> Self {
        Self::Success {
            success: true,
            filename,
        }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            error: message.to_string(),
        }
    }
}
