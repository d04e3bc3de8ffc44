//! Example demonstrating the binding registry

use envmix::EnvMix;
use serde::Deserialize;

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "API_")]
struct ApiConfig {
    #[envmix(default = 8080)]
    pub port: u16,

    #[envmix(name = "SERVER_HOST", default = "0.0.0.0".to_string())]
    pub host: String,
}

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "WORKER_")]
struct WorkerConfig {
    #[envmix(default = 4)]
    pub threads: usize,

    #[envmix(name = "SERVER_HOST", default = "127.0.0.1".to_string())]
    pub upstream: String,
}

fn main() {
    ApiConfig::register();
    WorkerConfig::register();

    println!("Registered schemas:");
    for (schema, fields) in envmix::get_registered_models() {
        println!("  {schema}");
        for (field, env) in fields {
            println!("    {field} <- {env}");
        }
    }

    println!("Shared variables:");
    for (env, consumers) in envmix::registry::global().collisions() {
        let names: Vec<_> = consumers
            .iter()
            .map(|r| format!("{}.{}", r.schema, r.field))
            .collect();
        println!("  {env}: {}", names.join(", "));
    }

    println!();
    print!("{}", ApiConfig::env_template());
}
