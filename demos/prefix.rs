//! Two schemas sharing one environment through different prefixes

use envmix::EnvMix;
use serde::Deserialize;

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "PRIMARY_")]
struct PrimaryStore {
    pub endpoint: String, // PRIMARY_ENDPOINT
    #[envmix(default = (1, 3))]
    pub replicas: (u8, u8), // PRIMARY_REPLICAS="min,max"
}

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "REPLICA_")]
struct ReplicaStore {
    pub endpoint: String, // REPLICA_ENDPOINT
    #[envmix(default = (1, 3))]
    pub replicas: (u8, u8), // REPLICA_REPLICAS
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("PRIMARY_ENDPOINT", "10.0.0.1:9000");
    std::env::set_var("PRIMARY_REPLICAS", "2,5");
    std::env::set_var("REPLICA_ENDPOINT", "10.0.0.2:9000");

    let primary = PrimaryStore::from_env()?;
    let replica = ReplicaStore::from_env()?;
    println!("primary: {} replicas={:?}", primary.endpoint, primary.replicas);
    println!("replica: {} replicas={:?}", replica.endpoint, replica.replicas);

    // Tuples enforce their arity
    std::env::set_var("REPLICA_REPLICAS", "1,2,3");
    match ReplicaStore::from_env() {
        Ok(config) => println!("unexpected: {:?}", config.replicas),
        Err(e) => println!("error: {e}"),
    }

    Ok(())
}
