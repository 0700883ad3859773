use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Role;
use crate::utils::HobbyError;

/// Successful login payload; the caller hands it to
/// `SessionStore::set_session` to open the session.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSession {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub role: Role,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confPassword")]
    pub conf_password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

/// Application to open a community-admin account, reviewed out of band
#[derive(Debug, Clone, Serialize)]
pub struct RequestAdminPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub otp: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
    #[serde(rename = "confPassword")]
    pub conf_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    #[serde(rename = "newEmail")]
    pub new_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    pub otp: String,
    #[serde(rename = "newEmail")]
    pub new_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "is_verified")]
    pub is_verified: bool,
}

/// Backend acknowledgment with an optional human-readable message
#[derive(Debug, Clone, Deserialize)]
pub struct GenericResponse {
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Community {
    pub id: i64,
    pub nama_komunitas: String,
    pub deskripsi: String,
    pub lokasi: String,
    pub foto_url: Option<String>,
    pub banner_url: Option<String>,
    pub link_grup: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunitySimple {
    pub id: i64,
    pub nama_komunitas: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub judul_kegiatan: String,
    pub deskripsi: String,
    pub lokasi: String,
    pub tanggal: String,
    pub waktu: String,
    pub foto_kegiatan: Option<String>,
    #[serde(rename = "communityId")]
    pub community_id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "is_verified")]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
    pub managed_community: Option<CommunitySimple>,
}

/// Text fields shared by community create and update
#[derive(Debug, Clone)]
pub struct CommunityForm {
    pub nama_komunitas: String,
    pub lokasi: String,
    pub deskripsi: String,
    pub kategori: String,
    pub kontak: String,
    pub link_grup: String,
}

/// Text fields shared by activity create and update
#[derive(Debug, Clone)]
pub struct ActivityForm {
    pub judul_kegiatan: String,
    pub deskripsi: String,
    pub lokasi: String,
    pub tanggal: String,
    pub waktu: String,
}

#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub username: String,
    pub bio: String,
    pub no_hp: String,
}

/// An image payload for the multipart endpoints
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl Upload {
    pub async fn from_path(path: &Path) -> Result<Self, HobbyError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
        .to_string();
        Ok(Self {
            file_name,
            bytes,
            mime,
        })
    }

    pub(crate) fn into_part(self) -> Result<reqwest::multipart::Part, HobbyError> {
        reqwest::multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| HobbyError::Config(format!("invalid mime type: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn login_session_parses_backend_field_names() {
        let json = r#"{"accessToken":"abc123","role":"admin_komunitas","userId":9}"#;
        let session: LoginSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "abc123");
        assert_eq!(session.role, Role::AdminKomunitas);
        assert_eq!(session.user_id, 9);
    }

    #[test]
    fn user_parses_is_verified() {
        let json = r#"{"id":1,"username":"ayu","email":"ayu@mail.com","role":"user","is_verified":true}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_verified);
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn register_request_serializes_conf_password() {
        let request = RegisterRequest {
            username: "ayu".to_string(),
            email: "ayu@mail.com".to_string(),
            password: "rahasia".to_string(),
            conf_password: "rahasia".to_string(),
            role: Role::User,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["confPassword"], "rahasia");
        assert_eq!(value["role"], "user");
    }

    #[test]
    fn activity_parses_timestamps() {
        let json = r#"{
            "id": 3,
            "judul_kegiatan": "Gathering",
            "deskripsi": "Kopdar bulanan",
            "lokasi": "Malioboro",
            "tanggal": "2024-06-01",
            "waktu": "19:00",
            "foto_kegiatan": null,
            "communityId": 2,
            "createdAt": "2024-05-20T09:30:00.000Z",
            "updatedAt": "2024-05-21T10:00:00.000Z"
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.community_id, 2);
        assert_eq!(activity.foto_kegiatan, None);
        assert_eq!(activity.created_at.timezone(), Utc);
    }

    #[tokio::test]
    async fn upload_guesses_mime_from_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logo.PNG");
        tokio::fs::write(&path, b"not a real png").await.unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.mime, "image/png");
        assert_eq!(upload.file_name, "logo.PNG");
        assert_eq!(upload.bytes, b"not a real png");
    }
}
