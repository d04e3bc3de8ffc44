//! Fields bound to fixed variable names, shared across schemas

use envmix::{EnvLiteral, EnvMix};
use serde::Deserialize;

#[derive(Debug, EnvLiteral)]
enum Region {
    #[envmix(value = "eu-west-1")]
    EuWest,
    #[envmix(value = "us-east-1")]
    UsEast,
}

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "UPLOADER_")]
struct UploaderConfig {
    // Read from CLOUD_REGION; the prefix is not applied
    #[envmix(name = "CLOUD_REGION")]
    pub region: Region,

    #[envmix(default = 8)]
    pub parallelism: u8, // UPLOADER_PARALLELISM
}

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "BILLING_")]
struct BillingConfig {
    #[envmix(name = "CLOUD_REGION")]
    pub home_region: Region,
}

fn main() -> anyhow::Result<()> {
    // Literal values may be bare or JSON-quoted
    std::env::set_var("CLOUD_REGION", r#""us-east-1""#);

    let uploader = UploaderConfig::from_env()?;
    let billing = BillingConfig::from_env()?;
    println!(
        "uploader: region={:?} parallelism={}",
        uploader.region, uploader.parallelism
    );
    println!("billing: region={:?}", billing.home_region);

    UploaderConfig::register();
    BillingConfig::register();
    for consumer in envmix::registry::global().consumers("CLOUD_REGION") {
        println!("CLOUD_REGION -> {}.{}", consumer.schema, consumer.field);
    }

    std::env::set_var("CLOUD_REGION", "mars-north-1");
    if let Err(e) = UploaderConfig::from_env() {
        println!("error: {e}");
    }

    Ok(())
}
