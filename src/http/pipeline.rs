use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::session::SessionStore;
use crate::utils::HobbyError;

/// Two-phase authenticated request pipeline.
///
/// Every outgoing call gets the latest bearer token attached at dispatch
/// time; every received response is inspected for authorization failure
/// before it is handed back. Detection and reaction are decoupled: the
/// pipeline only raises the expiry signal on the injected [`SessionStore`],
/// it never retries, suppresses or navigates.
pub struct AuthPipeline {
    client: Client,
    store: Arc<SessionStore>,
}

impl AuthPipeline {
    pub fn new(store: Arc<SessionStore>, timeout: Duration) -> Result<Self, HobbyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HobbyError::transport)?;
        Ok(Self { client, store })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Request-side transform: attach `Authorization: Bearer <token>` when a
    /// token is held; leave the request untouched otherwise (login, register
    /// and the OTP endpoints go out unauthenticated).
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.token() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Response-side inspection: a successfully received 401 or 403 marks
    /// the session expired. Runs for every response; the response itself is
    /// returned to the caller unchanged.
    pub fn inspect(&self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::debug!("received {}, marking session expired", status);
            self.store.mark_expired();
        }
    }

    /// Authorize, dispatch, inspect. Transport failures (timeout, DNS,
    /// connection refused) never reach the inspection step and never touch
    /// session state.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, HobbyError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(HobbyError::transport)?;
        self.inspect(response.status());
        Ok(response)
    }
}
