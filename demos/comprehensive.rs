//! Comprehensive example showing multiple features combined

use envmix::{EnvLiteral, EnvMix, Overrides};
use serde::Deserialize;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

#[derive(Debug, EnvLiteral)]
enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "APP_")]
struct Config {
    // Required field
    pub name: String, // APP_NAME

    // Optional field
    pub version: Option<String>, // APP_VERSION

    // Default value
    #[envmix(default = 8080)]
    pub port: u16, // APP_PORT

    // Default trait
    #[envmix(default)]
    pub debug: bool, // APP_DEBUG

    // Custom name
    #[envmix(name = "DATABASE_CONNECTION_STRING")]
    pub database_url: String, // DATABASE_CONNECTION_STRING

    // Literal value
    #[envmix(default = Environment::Development)]
    pub environment: Environment, // APP_ENVIRONMENT

    // Comma-separated list
    #[envmix(default)]
    pub tags: Vec<String>, // APP_TAGS

    // Optional map
    pub metadata: Option<HashMap<String, String>>, // APP_METADATA
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Required fields
    std::env::set_var("APP_NAME", "my-application");
    std::env::set_var("DATABASE_CONNECTION_STRING", "postgres://localhost/db");
    std::env::set_var("APP_TAGS", "production,api");

    // Optional field - set this one
    std::env::set_var("APP_VERSION", "1.0.0");
    std::env::set_var("APP_ENVIRONMENT", "staging");

    // Port will use default (8080)
    // Debug will use Default::default() (false)
    // Metadata not set - will be None

    let config = Config::from_env()?;

    println!("Comprehensive Configuration:");
    println!("  Name: {}", config.name);
    println!("  Version: {:?}", config.version);
    println!("  Port: {}", config.port);
    println!("  Debug: {}", config.debug);
    println!("  Database URL: {}", config.database_url);
    println!("  Environment: {:?}", config.environment);
    println!("  Tags: {:?}", config.tags);
    println!("  Metadata: {:?}", config.metadata);

    // Overrides win over the environment
    let config = Config::from_env_with(Overrides::new().set("port", 9000).set("debug", true))?;
    println!("With overrides: port={} debug={}", config.port, config.debug);

    Ok(())
}
