use anyhow::Result;
use colored::Colorize;

use crate::api::{
    Activity, ActivityForm, ChangePasswordRequest, Community, CommunityForm, CreateUserRequest,
    GenericResponse, ProfileForm, RegisterRequest, RequestAdminPayload, UpdateUserRequest, Upload,
    User, VerifyEmailRequest,
};
use crate::app::{get_config_dir, init_config};
use crate::runtime::{route_for_role, AppContext};

use super::{ActivityAction, Commands, CommunityAction, ProfileAction, UserAction};

/// Handle CLI subcommands
pub async fn handle_command(command: &Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Initializing HobbyYK configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(())
        }
        Commands::Version => {
            show_version();
            Ok(())
        }
        Commands::Status => show_status(ctx).await,
        Commands::Register {
            username,
            email,
            password,
        } => {
            let request = RegisterRequest {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
                conf_password: password.clone(),
                role: crate::session::Role::User,
            };
            ctx.client.register(&request).await?;
            println!(
                "Registered. An OTP was sent to {}; verify with {}.",
                email.green(),
                "hobbyyk verify-otp".cyan()
            );
            Ok(())
        }
        Commands::VerifyOtp { email, otp } => {
            ctx.client.verify_otp(email, otp).await?;
            println!("{} is verified. You can log in now.", email.green());
            Ok(())
        }
        Commands::ResendOtp { email } => {
            ctx.client.resend_otp(email).await?;
            println!("A fresh OTP was sent to {}.", email.green());
            Ok(())
        }
        Commands::RequestAdmin {
            username,
            email,
            password,
            reason,
        } => {
            let payload = RequestAdminPayload {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
                reason: reason.clone(),
            };
            let response = ctx.client.request_admin_account(&payload).await?;
            print_msg(&response, "Admin account request submitted.");
            Ok(())
        }
        Commands::Login { email, password } => {
            let session = ctx.client.login(email, password).await?;
            ctx.store
                .set_session(session.access_token, session.role, session.user_id)
                .await?;
            println!(
                "Logged in as {} ({})",
                email.green().bold(),
                session.role
            );
            println!("  route: {}", route_for_role(Some(session.role)).cyan());
            Ok(())
        }
        Commands::Logout => {
            ctx.store.clear_session().await?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => {
            let session = ctx.store.snapshot();
            if session.is_authenticated() {
                println!(
                    "user id {} ({})",
                    session.user_id.map_or("?".to_string(), |id| id.to_string()),
                    session
                        .role
                        .map_or("unknown role".to_string(), |r| r.to_string())
                );
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
        Commands::Communities { action } => handle_community(action, ctx).await,
        Commands::Activities { action } => handle_activity(action, ctx).await,
        Commands::Profile { action } => handle_profile(action, ctx).await,
        Commands::Users { action } => handle_users(action, ctx).await,
    }
}

async fn handle_community(action: &CommunityAction, ctx: &AppContext) -> Result<()> {
    match action {
        CommunityAction::List { search, category } => {
            let communities = ctx
                .client
                .list_communities(search.as_deref(), category.as_deref())
                .await?;
            if communities.is_empty() {
                println!("No communities found.");
            }
            for community in &communities {
                print_community_line(community);
            }
            Ok(())
        }
        CommunityAction::Show { id } => {
            let community = ctx.client.community_detail(*id).await?;
            print_community(&community);
            Ok(())
        }
        CommunityAction::Mine => {
            match ctx.client.my_community().await? {
                Some(community) => print_community(&community),
                None => println!("You are not managing a community."),
            }
            Ok(())
        }
        CommunityAction::Create {
            name,
            location,
            description,
            category,
            contact,
            group_link,
            logo,
            banner,
        } => {
            let form = CommunityForm {
                nama_komunitas: name.clone(),
                lokasi: location.clone(),
                deskripsi: description.clone(),
                kategori: category.clone(),
                kontak: contact.clone(),
                link_grup: group_link.clone(),
            };
            let logo = Upload::from_path(logo).await?;
            let banner = match banner {
                Some(path) => Some(Upload::from_path(path).await?),
                None => None,
            };
            ctx.client.create_community(&form, logo, banner).await?;
            println!("Community {} created.", name.green());
            Ok(())
        }
        CommunityAction::Update {
            id,
            name,
            location,
            description,
            category,
            contact,
            group_link,
            logo,
            banner,
        } => {
            let form = CommunityForm {
                nama_komunitas: name.clone(),
                lokasi: location.clone(),
                deskripsi: description.clone(),
                kategori: category.clone(),
                kontak: contact.clone(),
                link_grup: group_link.clone(),
            };
            let logo = match logo {
                Some(path) => Some(Upload::from_path(path).await?),
                None => None,
            };
            let banner = match banner {
                Some(path) => Some(Upload::from_path(path).await?),
                None => None,
            };
            ctx.client.update_community(*id, &form, logo, banner).await?;
            println!("Community #{} updated.", id);
            Ok(())
        }
        CommunityAction::Delete { id } => {
            ctx.client.delete_community(*id).await?;
            println!("Community #{} deleted.", id);
            Ok(())
        }
        CommunityAction::Like { id } => {
            ctx.client.toggle_like(*id).await?;
            println!("Toggled like on community #{}.", id);
            Ok(())
        }
        CommunityAction::Join { id } => {
            ctx.client.toggle_join(*id).await?;
            println!("Toggled membership of community #{}.", id);
            Ok(())
        }
    }
}

async fn handle_activity(action: &ActivityAction, ctx: &AppContext) -> Result<()> {
    match action {
        ActivityAction::Feed => {
            let activities = ctx.client.activity_feed().await?;
            if activities.is_empty() {
                println!("The feed is empty.");
            }
            for activity in &activities {
                print_activity_line(activity);
            }
            Ok(())
        }
        ActivityAction::List { community_id } => {
            let activities = ctx.client.activities_by_community(*community_id).await?;
            if activities.is_empty() {
                println!("No activities scheduled for community #{}.", community_id);
            }
            for activity in &activities {
                print_activity_line(activity);
            }
            Ok(())
        }
        ActivityAction::Show { id } => {
            let activity = ctx.client.activity_by_id(*id).await?;
            print_activity(&activity);
            Ok(())
        }
        ActivityAction::Create {
            community_id,
            title,
            description,
            location,
            date,
            time,
            photo,
        } => {
            let form = ActivityForm {
                judul_kegiatan: title.clone(),
                deskripsi: description.clone(),
                lokasi: location.clone(),
                tanggal: date.clone(),
                waktu: time.clone(),
            };
            let photos = load_uploads(photo).await?;
            let response = ctx
                .client
                .create_activity(*community_id, &form, photos)
                .await?;
            print_msg(&response, "Activity scheduled.");
            Ok(())
        }
        ActivityAction::Update {
            id,
            title,
            description,
            location,
            date,
            time,
            photo,
        } => {
            let form = ActivityForm {
                judul_kegiatan: title.clone(),
                deskripsi: description.clone(),
                lokasi: location.clone(),
                tanggal: date.clone(),
                waktu: time.clone(),
            };
            let photos = if photo.is_empty() {
                None
            } else {
                Some(load_uploads(photo).await?)
            };
            let response = ctx.client.update_activity(*id, &form, photos).await?;
            print_msg(&response, "Activity updated.");
            Ok(())
        }
        ActivityAction::Delete { id } => {
            let response = ctx.client.delete_activity(*id).await?;
            print_msg(&response, "Activity deleted.");
            Ok(())
        }
    }
}

async fn handle_profile(action: &ProfileAction, ctx: &AppContext) -> Result<()> {
    match action {
        ProfileAction::Show => {
            let profile = ctx.client.my_profile().await?;
            print_user(&profile.user);
            if let Some(community) = profile.managed_community {
                println!("  managing: {} (#{})", community.nama_komunitas, community.id);
            }
            Ok(())
        }
        ProfileAction::Update {
            username,
            bio,
            phone,
            photo,
        } => {
            let form = ProfileForm {
                username: username.clone(),
                bio: bio.clone(),
                no_hp: phone.clone(),
            };
            let photo = match photo {
                Some(path) => Some(Upload::from_path(path).await?),
                None => None,
            };
            let response = ctx.client.update_profile(&form, photo).await?;
            print_msg(&response, "Profile updated.");
            Ok(())
        }
        ProfileAction::RequestPasswordOtp => {
            let response = ctx.client.request_password_otp().await?;
            print_msg(&response, "An OTP was sent to your email address.");
            Ok(())
        }
        ProfileAction::ChangePassword { otp, new_password } => {
            let request = ChangePasswordRequest {
                otp: otp.clone(),
                new_password: new_password.clone(),
                conf_password: new_password.clone(),
            };
            let response = ctx.client.verify_password_change(&request).await?;
            print_msg(&response, "Password changed.");
            Ok(())
        }
        ProfileAction::RequestEmailOtp { new_email } => {
            let response = ctx.client.request_email_otp(new_email).await?;
            print_msg(&response, "An OTP was sent to the new address.");
            Ok(())
        }
        ProfileAction::ChangeEmail { otp, new_email } => {
            let request = VerifyEmailRequest {
                otp: otp.clone(),
                new_email: new_email.clone(),
            };
            let response = ctx.client.verify_email_change(&request).await?;
            print_msg(&response, "Email address changed.");
            Ok(())
        }
    }
}

async fn handle_users(action: &UserAction, ctx: &AppContext) -> Result<()> {
    match action {
        UserAction::List => {
            let users = ctx.client.list_users().await?;
            for user in &users {
                print_user(user);
            }
            Ok(())
        }
        UserAction::Create {
            username,
            email,
            role,
        } => {
            let request = CreateUserRequest {
                username: username.clone(),
                email: email.clone(),
                role: (*role).into(),
            };
            ctx.client.create_user(&request).await?;
            println!("User {} created.", username.green());
            Ok(())
        }
        UserAction::Update {
            id,
            username,
            email,
            role,
            verified,
        } => {
            let request = UpdateUserRequest {
                username: username.clone(),
                email: email.clone(),
                role: (*role).into(),
                is_verified: *verified,
            };
            ctx.client.update_user(*id, &request).await?;
            println!("User #{} updated.", id);
            Ok(())
        }
        UserAction::Delete { id } => {
            ctx.client.delete_user(*id).await?;
            println!("User #{} deleted.", id);
            Ok(())
        }
    }
}

async fn load_uploads(paths: &[std::path::PathBuf]) -> Result<Vec<Upload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(Upload::from_path(path).await?);
    }
    Ok(uploads)
}

fn print_msg(response: &GenericResponse, fallback: &str) {
    println!("{}", response.msg.as_deref().unwrap_or(fallback));
}

fn print_community_line(community: &Community) {
    println!(
        "  #{} {} — {}",
        community.id,
        community.nama_komunitas.green(),
        community.lokasi
    );
}

fn print_community(community: &Community) {
    println!("{} (#{})", community.nama_komunitas.green().bold(), community.id);
    println!("  location: {}", community.lokasi);
    println!("  {}", community.deskripsi);
    if let Some(link) = &community.link_grup {
        println!("  group: {}", link.cyan());
    }
}

fn print_activity_line(activity: &Activity) {
    println!(
        "  #{} {} — {} {} @ {}",
        activity.id,
        activity.judul_kegiatan.green(),
        activity.tanggal,
        activity.waktu,
        activity.lokasi
    );
}

fn print_activity(activity: &Activity) {
    println!("{} (#{})", activity.judul_kegiatan.green().bold(), activity.id);
    println!("  when: {} {}", activity.tanggal, activity.waktu);
    println!("  where: {}", activity.lokasi);
    println!("  {}", activity.deskripsi);
    println!("  community: #{}", activity.community_id);
}

fn print_user(user: &User) {
    let verified = if user.is_verified {
        "verified".green()
    } else {
        "unverified".yellow()
    };
    println!(
        "  #{} {} <{}> {} ({})",
        user.id,
        user.username.bold(),
        user.email,
        user.role,
        verified
    );
}

/// Show version information
pub fn show_version() {
    println!("HobbyYK v{}", env!("CARGO_PKG_VERSION"));
    println!("   Command-line client for the HobbyYK community platform");
}

/// Show status of session, configuration and backend
async fn show_status(ctx: &AppContext) -> Result<()> {
    println!("HobbyYK Status:");
    println!();

    let session = ctx.store.snapshot();
    if session.is_authenticated() {
        println!(
            "  [OK] Session: user id {}, role {}",
            session.user_id.map_or("?".to_string(), |id| id.to_string()),
            session
                .role
                .map_or("unknown".to_string(), |r| r.to_string())
        );
    } else {
        println!("  [WARNING] Session: not signed in");
    }

    match ctx.client.list_communities(None, None).await {
        Ok(communities) => println!(
            "  [OK] Backend: {} ({} communities)",
            ctx.config.api.base_url,
            communities.len()
        ),
        Err(err) => println!("  [ERROR] Backend: {} ({})", ctx.config.api.base_url, err),
    }

    if let Ok(config_dir) = get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            println!("  [OK] Configuration: {}", config_path.display());
        } else {
            println!("  [WARNING] Configuration: Not found (using defaults)");
        }
    }

    println!();
    Ok(())
}
