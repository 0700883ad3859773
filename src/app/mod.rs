// Gateway module for app - all external access goes through this gateway

mod config;

pub use config::{get_config_dir, init_config, load_config, save_config, Config};
