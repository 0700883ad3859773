// Gateway module for the backend API - all external access goes through
// this gateway

mod client;
mod types;

pub use client::ApiClient;
pub use types::{
    Activity, ActivityForm, ChangePasswordRequest, Community, CommunityForm, CommunitySimple,
    CreateUserRequest, EmailRequest, GenericResponse, LoginRequest, LoginSession, ProfileForm,
    ProfileResponse, RegisterRequest, RequestAdminPayload, ResendOtpRequest, UpdateUserRequest,
    Upload, User, VerifyEmailRequest, VerifyOtpRequest,
};
