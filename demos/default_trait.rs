//! Example demonstrating #[envmix(default)] using Default trait

use envmix::EnvMix;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, EnvMix)]
struct Config {
    // Uses Default::default() if not set
    #[envmix(default)]
    pub host: String, // "" (empty string)

    #[envmix(default)]
    pub port: u16, // 0

    #[envmix(default)]
    pub enabled: bool, // false

    #[envmix(default)]
    pub labels: HashMap<String, String>, // {}

    // Explicit default values for comparison
    #[envmix(default = "localhost".to_string())]
    pub server: String,

    #[envmix(default = 8080)]
    pub api_port: u16,

    #[envmix(default = true)]
    pub verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // Don't set any environment variables
    for name in ["HOST", "PORT", "ENABLED", "LABELS", "SERVER", "API_PORT", "VERBOSE"] {
        std::env::remove_var(name);
    }

    let config = Config::from_env()?;

    println!("Configuration with defaults:");
    println!("  Host (Default trait): '{}'", config.host); // ""
    println!("  Port (Default trait): {}", config.port); // 0
    println!("  Enabled (Default trait): {}", config.enabled); // false
    println!("  Labels (Default trait): {:?}", config.labels); // {}
    println!("  Server (explicit): '{}'", config.server); // "localhost"
    println!("  API Port (explicit): {}", config.api_port); // 8080
    println!("  Verbose (explicit): {}", config.verbose); // true

    Ok(())
}
