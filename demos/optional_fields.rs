//! Example demonstrating Option<T> for optional fields

use envmix::EnvMix;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, EnvMix)]
struct Config {
    // Required field
    pub app_name: String,

    // Optional fields - None if not set
    pub api_key: Option<String>,
    pub port: Option<u16>,
    pub debug: Option<bool>,

    // Quoted JSON strings are unwrapped
    pub log_path: Option<PathBuf>,

    // Optional with a non-empty default
    #[envmix(default = Some(3))]
    pub retries: Option<u8>,
}

fn main() -> anyhow::Result<()> {
    // Set only some environment variables
    std::env::set_var("APP_NAME", "my-application");
    std::env::set_var("PORT", "8080");
    std::env::set_var("LOG_PATH", r#""/var/log/app.log""#);
    // API_KEY, DEBUG, RETRIES not set

    let config = Config::from_env()?;

    println!("Configuration:");
    println!("  App Name: {}", config.app_name);
    println!("  API Key: {:?}", config.api_key); // None
    println!("  Port: {:?}", config.port); // Some(8080)
    println!("  Debug: {:?}", config.debug); // None
    println!("  Log Path: {:?}", config.log_path); // Some("/var/log/app.log")
    println!("  Retries: {:?}", config.retries); // Some(3)

    Ok(())
}
