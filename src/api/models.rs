use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RemoteThread {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadList {
    pub threads: Vec<RemoteThread>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RemoteMessage {
    pub id: String,
    pub content: String,
    pub role: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadDetail {
    pub messages: Vec<RemoteMessage>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StreamRequest {
    pub user_input: String,
    pub thread_id: Option<String>,
    pub stream: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AuthData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub token: String,
}

/// `{ data, message, status }` wrapper used by the auth endpoints, which
/// report failures with `status: "error"` on a 200 response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StudentId {
    Number(i64),
    Text(String),
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentId::Number(n) => write!(f, "{n}"),
            StudentId::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StudentList {
    #[serde(rename = "Data", default)]
    pub data: Vec<Student>,
}
