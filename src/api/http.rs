use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{
    AdminApi, ApiError, COURSES_LIST_PATH, CREATE_USER_PATH, CoursesBody, CredentialProvider,
    ENROLL_USER_PATH, Envelope, ErrorBody, NoBody, REMOVE_ENROLLMENT_PATH, USERS_LIST_PATH,
    UsersBody,
};
use crate::model::{Course, EnrollRequest, NewUserDraft, UserPage};
use crate::search::SearchQuery;

/// Default client-side timeout for every admin request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// [`AdminApi`] over HTTP with JSON bodies.
#[derive(Clone)]
pub struct HttpAdminApi {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for HttpAdminApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAdminApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpAdminApi {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::info!(%base_url, timeout_secs = timeout.as_secs(), "admin api client ready");
        Ok(Self { client, base_url, credentials })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the `{success, message, ...}` envelope.
    ///
    /// Non-2xx statuses and `success: false` are both errors.
    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        tracing::debug!(path, "sending admin request");
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), "admin request failed");
            return Err(ApiError::Status { status: status.as_u16(), message: body.message });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        if !envelope.success {
            tracing::warn!(path, message = ?envelope.message, "admin request rejected");
            return Err(ApiError::Rejected { message: envelope.message });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn list_users(&self, query: &SearchQuery) -> Result<UserPage, ApiError> {
        let req = self.client.get(self.url(USERS_LIST_PATH)).query(&query.params());
        let env: Envelope<UsersBody> = self.execute(USERS_LIST_PATH, req).await?;
        Ok(UserPage { users: env.body.users, total_pages: env.body.total_pages })
    }

    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let req = self.client.get(self.url(COURSES_LIST_PATH));
        let env: Envelope<CoursesBody> = self.execute(COURSES_LIST_PATH, req).await?;
        Ok(env.body.courses)
    }

    async fn create_user(&self, draft: &NewUserDraft) -> Result<Option<String>, ApiError> {
        let req = self.client.post(self.url(CREATE_USER_PATH)).json(draft);
        let env: Envelope<NoBody> = self.execute(CREATE_USER_PATH, req).await?;
        Ok(env.message)
    }

    async fn enroll_user(&self, request: &EnrollRequest) -> Result<Option<String>, ApiError> {
        let req = self.client.post(self.url(ENROLL_USER_PATH)).json(request);
        let env: Envelope<NoBody> = self.execute(ENROLL_USER_PATH, req).await?;
        Ok(env.message)
    }

    async fn remove_enrollment(&self, user_id: &str, course_id: &str) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id, "courseId": course_id });
        let req = self.client.post(self.url(REMOVE_ENROLLMENT_PATH)).json(&body);
        let _: Envelope<NoBody> = self.execute(REMOVE_ENROLLMENT_PATH, req).await?;
        Ok(())
    }
}
