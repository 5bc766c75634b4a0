//! Remote admin API: request contract, transport errors and credentials.
//!
//! The console talks to the backend only through [`AdminApi`], so the state
//! machine and dispatcher can be driven by a fake in tests while the binary
//! uses [`HttpAdminApi`].

pub mod credentials;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::model::{Course, EnrollRequest, NewUserDraft, User, UserPage, null_as_default};
use crate::search::SearchQuery;

pub use credentials::{CredentialProvider, StaticToken, TokenFile};
pub use http::HttpAdminApi;

pub const USERS_LIST_PATH: &str = "/api/admin/all-users-list";
pub const COURSES_LIST_PATH: &str = "/api/admin/all-courses-list";
pub const CREATE_USER_PATH: &str = "/api/admin/create-user";
pub const ENROLL_USER_PATH: &str = "/api/admin/enroll-user";
pub const REMOVE_ENROLLMENT_PATH: &str = "/api/admin/remove-enrollment";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server returned status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },
    #[error("request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message supplied by the server, when the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected { message } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Operator-facing text: the server's message, else the given fallback.
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_users(&self, query: &SearchQuery) -> Result<UserPage, ApiError>;

    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;

    /// Returns the server's confirmation message, if any.
    async fn create_user(&self, draft: &NewUserDraft) -> Result<Option<String>, ApiError>;

    /// Returns the server's confirmation message, if any.
    async fn enroll_user(&self, request: &EnrollRequest) -> Result<Option<String>, ApiError>;

    async fn remove_enrollment(&self, user_id: &str, course_id: &str) -> Result<(), ApiError>;
}

/// Common `{success, message, ...}` response shape.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsersBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(default = "one", deserialize_with = "null_as_one")]
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoursesBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub courses: Vec<Course>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NoBody {}

/// Body of a non-2xx response; only the message is of interest.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

fn one() -> u32 {
    1
}

fn null_as_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(1))
}
