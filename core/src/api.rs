//! Async facade over the portal API.
//!
//! Each method issues exactly one request: build with `PortalClient`, execute
//! with the `Transport`, parse with `PortalClient`. Failures are returned
//! once, without retries.

use crate::client::PortalClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{AssignmentSummary, UserCode, UserRecord, UserUpdate};

#[derive(Debug, Clone)]
pub struct PortalApi<T = ReqwestTransport> {
    client: PortalClient,
    transport: T,
}

impl PortalApi<ReqwestTransport> {
    /// Facade over a fresh `ReqwestTransport`, seeded with the configured
    /// session cookie for the origin and the API base URL.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new()?;
        if let Some(cookie) = &config.session_cookie {
            transport.add_session_cookie(cookie, &config.origin)?;
            if !config.api_base_url.starts_with(&config.origin) {
                transport.add_session_cookie(cookie, &config.api_base_url)?;
            }
        }
        Ok(Self::new(PortalClient::new(&config.origin, &config.api_base_url), transport))
    }
}

impl<T: Transport> PortalApi<T> {
    pub fn new(client: PortalClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    /// Send `text` to the chat bot and return its reply.
    pub async fn send_chat_message(&self, text: &str) -> Result<String, ApiError> {
        let result: Result<String, ApiError> = async {
            let request = self.client.build_send_chat_message(text)?;
            let response = self.transport.execute(request).await?;
            self.client.parse_send_chat_message(response)
        }
        .await;
        if let Err(err) = &result {
            tracing::error!(error = %err, "chat message failed");
        }
        result
    }

    /// The user owning the ambient session.
    pub async fn get_current_user(&self) -> Result<UserRecord, ApiError> {
        let response = self.transport.execute(self.client.build_get_current_user()).await?;
        self.client.parse_get_current_user(response)
    }

    /// Every user. The backend only allows this for administrators.
    pub async fn list_all_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let response = self.transport.execute(self.client.build_list_all_users()).await?;
        self.client.parse_list_all_users(response)
    }

    /// Students linked to `teacher`; empty when the backend answers 404.
    #[tracing::instrument(skip(self))]
    pub async fn list_students_for_teacher(&self, teacher: UserCode) -> Result<Vec<UserRecord>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_list_students_for_teacher(teacher))
            .await?;
        self.client.parse_list_students_for_teacher(response)
    }

    #[tracing::instrument(skip(self))]
    pub async fn auto_assign_students(&self, teacher: UserCode) -> Result<AssignmentSummary, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_auto_assign_students(teacher))
            .await?;
        self.client.parse_auto_assign_students(response)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_user(&self, user: UserCode, update: &UserUpdate) -> Result<UserRecord, ApiError> {
        let request = self.client.build_update_user(user, update)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_user(response)
    }
}
