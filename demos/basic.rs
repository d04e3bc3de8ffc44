//! Minimal schema: scalars, a list and an override

use envmix::{EnvMix, Overrides};
use serde::Deserialize;

#[derive(Debug, Deserialize, EnvMix)]
struct ServiceConfig {
    pub service_name: String,

    #[envmix(default = 4)]
    pub workers: u16,

    // Accepts true/false, 1/0, yes/no, on/off
    #[envmix(default)]
    pub verbose: bool,

    // "a,b,c" and ["a","b","c"] are equivalent
    #[envmix(default)]
    pub allowed_origins: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("SERVICE_NAME", "billing");
    std::env::set_var("VERBOSE", "yes");
    std::env::set_var("ALLOWED_ORIGINS", "https://a.example, https://b.example");

    let from_env = ServiceConfig::from_env()?;
    println!("Service: {}", from_env.service_name);
    println!("  Verbose: {}", from_env.verbose);
    println!("  Allowed Origins: {:?}", from_env.allowed_origins);

    // Same list given as JSON
    std::env::set_var("ALLOWED_ORIGINS", r#"["https://a.example","https://b.example"]"#);
    let as_json = ServiceConfig::from_env()?;
    assert_eq!(from_env.allowed_origins, as_json.allowed_origins);

    // Overrides skip the environment entirely
    let pinned = ServiceConfig::from_env_with(Overrides::new().set("workers", 16))?;
    println!("workers: env default {} / override {}", from_env.workers, pinned.workers);

    // A malformed value names the variable, the shape and the text
    std::env::set_var("WORKERS", "many");
    if let Err(e) = ServiceConfig::from_env() {
        println!("error: {e}");
    }

    Ok(())
}
