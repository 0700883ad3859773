/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{
    ActivityAction, Cli, Commands, CommunityAction, ProfileAction, RoleArg, UserAction,
};
pub use commands::{handle_command, show_version};
