use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::http::AuthPipeline;
use crate::session::SessionStore;
use crate::utils::HobbyError;

use super::types::{
    Activity, ActivityForm, ChangePasswordRequest, Community, CommunityForm, CreateUserRequest,
    EmailRequest, GenericResponse, LoginRequest, LoginSession, ProfileForm, ProfileResponse,
    RegisterRequest, RequestAdminPayload, ResendOtpRequest, Upload, UpdateUserRequest, User,
    VerifyEmailRequest, VerifyOtpRequest,
};

/// Declarative client for the HobbyYK backend. One async method per
/// endpoint; every call is routed through the [`AuthPipeline`] so the
/// bearer token and the expiry inspection apply uniformly.
pub struct ApiClient {
    pipeline: AuthPipeline,
    base_url: String,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<SessionStore>,
        timeout: Duration,
    ) -> Result<Self, HobbyError> {
        let base_url: String = base_url.into();
        Ok(Self {
            pipeline: AuthPipeline::new(store, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn pipeline(&self) -> &AuthPipeline {
        &self.pipeline
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn into_api_error(response: Response) -> HobbyError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        HobbyError::Api { status, message }
    }

    async fn expect_success(response: Response) -> Result<Response, HobbyError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::into_api_error(response).await)
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, HobbyError> {
        let response = Self::expect_success(response).await?;
        // A well-formed status with a malformed body is a transport problem
        response.json().await.map_err(HobbyError::transport)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HobbyError> {
        let response = self
            .pipeline
            .execute(self.pipeline.client().get(self.url(path)))
            .await?;
        Self::read_json(response).await
    }

    async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), HobbyError> {
        let response = self
            .pipeline
            .execute(self.pipeline.client().post(self.url(path)).json(body))
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn delete_unit(&self, path: &str) -> Result<(), HobbyError> {
        let response = self
            .pipeline
            .execute(self.pipeline.client().delete(self.url(path)))
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    // ---- authentication ----

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), HobbyError> {
        self.post_unit("users", request).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), HobbyError> {
        let request = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        self.post_unit("verify-otp", &request).await
    }

    pub async fn resend_otp(&self, email: &str) -> Result<(), HobbyError> {
        let request = ResendOtpRequest {
            email: email.to_string(),
        };
        self.post_unit("resend-otp", &request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, HobbyError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .pipeline
            .execute(self.pipeline.client().post(self.url("login")).json(&request))
            .await?;
        Self::read_json(response).await
    }

    pub async fn request_admin_account(
        &self,
        payload: &RequestAdminPayload,
    ) -> Result<GenericResponse, HobbyError> {
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .post(self.url("request-admin"))
                    .json(payload),
            )
            .await?;
        Self::read_json(response).await
    }

    // ---- communities ----

    pub async fn list_communities(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Community>, HobbyError> {
        let mut request = self.pipeline.client().get(self.url("communities"));
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        let response = self.pipeline.execute(request).await?;
        Self::read_json(response).await
    }

    pub async fn community_detail(&self, id: i64) -> Result<Community, HobbyError> {
        self.get_json(&format!("communities/{}", id)).await
    }

    /// The community managed by the signed-in admin, if any. The backend
    /// answers 200 with a null body when there is none.
    pub async fn my_community(&self) -> Result<Option<Community>, HobbyError> {
        let response = self
            .pipeline
            .execute(self.pipeline.client().get(self.url("my-community")))
            .await?;
        let response = Self::expect_success(response).await?;
        let text = response.text().await.map_err(HobbyError::transport)?;
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| HobbyError::Transport(e.to_string()))
    }

    fn community_text_parts(form: &CommunityForm) -> multipart::Form {
        multipart::Form::new()
            .text("nama_komunitas", form.nama_komunitas.clone())
            .text("lokasi", form.lokasi.clone())
            .text("deskripsi", form.deskripsi.clone())
            .text("kategori", form.kategori.clone())
            .text("kontak", form.kontak.clone())
            .text("link_grup", form.link_grup.clone())
    }

    pub async fn create_community(
        &self,
        form: &CommunityForm,
        logo: Upload,
        banner: Option<Upload>,
    ) -> Result<(), HobbyError> {
        let mut parts = Self::community_text_parts(form).part("file", logo.into_part()?);
        if let Some(banner) = banner {
            parts = parts.part("banner", banner.into_part()?);
        }
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .post(self.url("communities"))
                    .multipart(parts),
            )
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    pub async fn update_community(
        &self,
        id: i64,
        form: &CommunityForm,
        new_logo: Option<Upload>,
        new_banner: Option<Upload>,
    ) -> Result<(), HobbyError> {
        let mut parts = Self::community_text_parts(form);
        if let Some(logo) = new_logo {
            parts = parts.part("newLogo", logo.into_part()?);
        }
        if let Some(banner) = new_banner {
            parts = parts.part("newBanner", banner.into_part()?);
        }
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .patch(self.url(&format!("communities/{}", id)))
                    .multipart(parts),
            )
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    pub async fn delete_community(&self, id: i64) -> Result<(), HobbyError> {
        self.delete_unit(&format!("communities/{}", id)).await
    }

    pub async fn toggle_like(&self, community_id: i64) -> Result<(), HobbyError> {
        self.post_unit("like", &json!({ "communityId": community_id }))
            .await
    }

    pub async fn toggle_join(&self, community_id: i64) -> Result<(), HobbyError> {
        self.post_unit("join", &json!({ "communityId": community_id }))
            .await
    }

    // ---- activities ----

    pub async fn activity_feed(&self) -> Result<Vec<Activity>, HobbyError> {
        self.get_json("activities/feed").await
    }

    pub async fn activities_by_community(
        &self,
        community_id: i64,
    ) -> Result<Vec<Activity>, HobbyError> {
        self.get_json(&format!("activities/community/{}", community_id))
            .await
    }

    pub async fn activity_by_id(&self, id: i64) -> Result<Activity, HobbyError> {
        self.get_json(&format!("activities/{}", id)).await
    }

    fn activity_text_parts(form: &ActivityForm) -> multipart::Form {
        multipart::Form::new()
            .text("judul_kegiatan", form.judul_kegiatan.clone())
            .text("deskripsi", form.deskripsi.clone())
            .text("lokasi", form.lokasi.clone())
            .text("tanggal", form.tanggal.clone())
            .text("waktu", form.waktu.clone())
    }

    pub async fn create_activity(
        &self,
        community_id: i64,
        form: &ActivityForm,
        photos: Vec<Upload>,
    ) -> Result<GenericResponse, HobbyError> {
        let mut parts =
            Self::activity_text_parts(form).text("communityId", community_id.to_string());
        for photo in photos {
            parts = parts.part("foto_kegiatan", photo.into_part()?);
        }
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .post(self.url("activities"))
                    .multipart(parts),
            )
            .await?;
        Self::read_json(response).await
    }

    pub async fn update_activity(
        &self,
        id: i64,
        form: &ActivityForm,
        photos: Option<Vec<Upload>>,
    ) -> Result<GenericResponse, HobbyError> {
        let mut parts = Self::activity_text_parts(form);
        if let Some(photos) = photos {
            for photo in photos {
                parts = parts.part("foto_kegiatan", photo.into_part()?);
            }
        }
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .patch(self.url(&format!("activities/{}", id)))
                    .multipart(parts),
            )
            .await?;
        Self::read_json(response).await
    }

    pub async fn delete_activity(&self, id: i64) -> Result<GenericResponse, HobbyError> {
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .delete(self.url(&format!("activities/{}", id))),
            )
            .await?;
        Self::read_json(response).await
    }

    // ---- users & profile ----

    pub async fn list_users(&self) -> Result<Vec<User>, HobbyError> {
        self.get_json("users").await
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<(), HobbyError> {
        self.post_unit("users/admin", request).await
    }

    pub async fn update_user(
        &self,
        id: i64,
        request: &UpdateUserRequest,
    ) -> Result<(), HobbyError> {
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .patch(self.url(&format!("users/{}", id)))
                    .json(request),
            )
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), HobbyError> {
        self.delete_unit(&format!("users/{}", id)).await
    }

    pub async fn my_profile(&self) -> Result<ProfileResponse, HobbyError> {
        self.get_json("users/me").await
    }

    pub async fn update_profile(
        &self,
        form: &ProfileForm,
        photo: Option<Upload>,
    ) -> Result<GenericResponse, HobbyError> {
        let mut parts = multipart::Form::new()
            .text("username", form.username.clone())
            .text("bio", form.bio.clone())
            .text("no_hp", form.no_hp.clone());
        if let Some(photo) = photo {
            parts = parts.part("profile_pic", photo.into_part()?);
        }
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .patch(self.url("users/profile"))
                    .multipart(parts),
            )
            .await?;
        Self::read_json(response).await
    }

    pub async fn request_password_otp(&self) -> Result<GenericResponse, HobbyError> {
        let response = self
            .pipeline
            .execute(self.pipeline.client().post(self.url("users/me/password/otp")))
            .await?;
        Self::read_json(response).await
    }

    pub async fn verify_password_change(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<GenericResponse, HobbyError> {
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .patch(self.url("users/me/password/verify"))
                    .json(request),
            )
            .await?;
        Self::read_json(response).await
    }

    pub async fn request_email_otp(&self, new_email: &str) -> Result<GenericResponse, HobbyError> {
        let request = EmailRequest {
            new_email: new_email.to_string(),
        };
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .post(self.url("users/me/email/otp"))
                    .json(&request),
            )
            .await?;
        Self::read_json(response).await
    }

    pub async fn verify_email_change(
        &self,
        request: &VerifyEmailRequest,
    ) -> Result<GenericResponse, HobbyError> {
        let response = self
            .pipeline
            .execute(
                self.pipeline
                    .client()
                    .patch(self.url("users/me/email/verify"))
                    .json(request),
            )
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(
            base_url,
            Arc::new(SessionStore::ephemeral()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    /// One-shot HTTP server answering with a fixed status and JSON body
    async fn serve_json(status_line: &str, body: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = client("http://localhost:5000/");
        assert_eq!(client.url("communities"), "http://localhost:5000/communities");
    }

    #[tokio::test]
    async fn login_parses_the_session_payload() {
        let base = serve_json(
            "200 OK",
            r#"{"accessToken":"abc123","role":"super_admin","userId":1}"#,
        )
        .await;
        let client = client(&base);

        let session = client.login("admin@mail.com", "rahasia").await.unwrap();
        assert_eq!(session.access_token, "abc123");
        assert_eq!(session.role, Role::SuperAdmin);
        assert_eq!(session.user_id, 1);
    }

    #[tokio::test]
    async fn non_success_surfaces_status_and_body() {
        let base = serve_json("400 Bad Request", r#"{"msg":"Email sudah terdaftar"}"#).await;
        let client = client(&base);

        let err = client.resend_otp("ayu@mail.com").await.unwrap_err();
        match err {
            HobbyError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("Email sudah terdaftar"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
        // A plain 400 is not an authorization failure
        assert!(!client.pipeline().store().is_expired());
    }

    #[tokio::test]
    async fn my_community_tolerates_a_null_body() {
        let base = serve_json("200 OK", "null").await;
        let client = client(&base);
        assert!(client.my_community().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unauthorized_call_marks_the_session_expired() {
        let base = serve_json("401 Unauthorized", r#"{"msg":"Token tidak valid"}"#).await;
        let client = client(&base);
        client
            .pipeline()
            .store()
            .set_session("stale", Role::User, 7)
            .await
            .unwrap();

        let err = client.my_profile().await.unwrap_err();
        assert!(matches!(err, HobbyError::Api { status: 401, .. }));
        assert!(client.pipeline().store().is_expired());
    }
}
