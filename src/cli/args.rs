use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::session::Role;

#[derive(Parser, Debug)]
#[command(name = "hobbyyk")]
#[command(version = "0.1.0")]
#[command(about = "Command-line client for the HobbyYK community platform", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides configuration)
    #[arg(short, long, env = "HOBBYYK_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Show session and backend status
    Status,
    /// Show version information
    Version,
    /// Register a new account (the backend emails an OTP)
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Verify an email address with the OTP it received
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    /// Request a fresh OTP
    ResendOtp {
        #[arg(long)]
        email: String,
    },
    /// Apply for a community-admin account
    RequestAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        reason: String,
    },
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the persisted session
    Logout,
    /// Show the current session
    Whoami,
    /// Browse and manage communities
    Communities {
        #[command(subcommand)]
        action: CommunityAction,
    },
    /// Browse and manage activities
    Activities {
        #[command(subcommand)]
        action: ActivityAction,
    },
    /// View and manage the signed-in profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Administer platform users (super admin)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CommunityAction {
    /// List communities, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one community
    Show { id: i64 },
    /// Show the community managed by the signed-in admin
    Mine,
    /// Create a community (community admin)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        contact: String,
        #[arg(long)]
        group_link: String,
        /// Logo image file
        #[arg(long)]
        logo: PathBuf,
        /// Banner image file
        #[arg(long)]
        banner: Option<PathBuf>,
    },
    /// Update a community
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        contact: String,
        #[arg(long)]
        group_link: String,
        /// Replacement logo image file
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Replacement banner image file
        #[arg(long)]
        banner: Option<PathBuf>,
    },
    /// Delete a community
    Delete { id: i64 },
    /// Toggle a like on a community
    Like { id: i64 },
    /// Toggle membership of a community
    Join { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ActivityAction {
    /// Show the cross-community activity feed
    Feed,
    /// List a community's activities
    List { community_id: i64 },
    /// Show one activity
    Show { id: i64 },
    /// Schedule an activity (community admin)
    Create {
        #[arg(long)]
        community_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
        /// Date, e.g. 2024-06-01
        #[arg(long)]
        date: String,
        /// Time, e.g. 19:00
        #[arg(long)]
        time: String,
        /// Photo files
        #[arg(long)]
        photo: Vec<PathBuf>,
    },
    /// Update an activity
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        /// Replacement photo files (existing photos kept when omitted)
        #[arg(long)]
        photo: Vec<PathBuf>,
    },
    /// Delete an activity
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Show the signed-in profile
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        bio: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Profile picture file
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Request an OTP to change the password
    RequestPasswordOtp,
    /// Change the password with the OTP received
    ChangePassword {
        #[arg(long)]
        otp: String,
        #[arg(long)]
        new_password: String,
    },
    /// Request an OTP to change the email address
    RequestEmailOtp {
        #[arg(long)]
        new_email: String,
    },
    /// Change the email address with the OTP received
    ChangeEmail {
        #[arg(long)]
        otp: String,
        #[arg(long)]
        new_email: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// List platform users
    List,
    /// Create a user account directly
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
    },
    /// Update a user account
    Update {
        id: i64,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum)]
        role: RoleArg,
        #[arg(long)]
        verified: bool,
    },
    /// Delete a user account
    Delete { id: i64 },
}

/// Role as a CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    /// Regular member
    User,
    /// Community administrator
    AdminKomunitas,
    /// Platform administrator
    SuperAdmin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Role::User,
            RoleArg::AdminKomunitas => Role::AdminKomunitas,
            RoleArg::SuperAdmin => Role::SuperAdmin,
        }
    }
}
