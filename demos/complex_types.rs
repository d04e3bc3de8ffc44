//! Example demonstrating collection, literal and nested types

use envmix::{EnvLiteral, EnvMix};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Serialize, Deserialize, EnvMix)]
struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    #[envmix(default = "admin".to_string())]
    pub username: String,
}

impl DatabaseConfig {
    fn connection_string(&self) -> String {
        format!("{}:{} (user: {})", self.host, self.port, self.username)
    }
}

#[derive(Debug, EnvLiteral)]
enum Mode {
    Dev,
    Prod,
}

#[derive(Debug, Deserialize, EnvMix)]
struct Config {
    // Comma-separated or JSON array
    pub tags: Vec<String>,

    // Tuple with exact arity
    pub size: (u32, u32),

    // Nested lists must be JSON
    pub matrix: Vec<Vec<i32>>,

    // k=v pairs or JSON object
    pub limits: BTreeMap<String, u64>,

    // Duplicates removed
    pub regions: HashSet<String>,

    // One of the literal values
    pub mode: Mode,

    // Nested struct: JSON object only
    pub database: DatabaseConfig,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("TAGS", "production,api,v2");
    std::env::set_var("SIZE", "[800, 600]");
    std::env::set_var("MATRIX", "[[1,2],[3,4]]");
    std::env::set_var("LIMITS", "requests=100,burst=20");
    std::env::set_var("REGIONS", "eu,us,eu");
    std::env::set_var("MODE", "prod");
    std::env::set_var("DATABASE", r#"{"host":"localhost","port":5432}"#);

    // Load configuration
    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Tags: {:?}", config.tags);
    println!("  Size: {:?}", config.size);
    println!("  Matrix: {:?}", config.matrix);
    println!("  Limits: {:?}", config.limits);
    println!("  Regions: {:?}", config.regions);
    println!("  Mode: {}", config.mode.as_str());
    println!("  Database: {}", config.database.connection_string());

    Ok(())
}
