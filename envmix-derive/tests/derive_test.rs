//! Tests for the code generated by the derive macros

use envmix::{EnvLiteral, EnvMix, EnvShape, Overrides, ScalarKind, Shape};
use serde::Deserialize;
use serial_test::serial;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, EnvLiteral)]
enum Level {
    Debug,
    ReadOnly,
    #[envmix(value = "warning")]
    Warn,
}

#[derive(Debug, Deserialize, EnvMix)]
#[envmix(prefix = "DRV_")]
struct Config {
    pub r#type: String,

    #[envmix(name = "DRV_CUSTOM_LEVEL", default = Level::Debug)]
    pub level: Level,

    #[envmix(default = Some(3))]
    pub retries: Option<u8>,

    pub timeout: Option<u64>,
}

#[test]
fn test_literal_values() {
    assert_eq!(Level::LITERALS, ["debug", "read_only", "warning"]);
    assert_eq!(Level::Warn.as_str(), "warning");
    assert_eq!(Level::shape(), Shape::Tagged(&["debug", "read_only", "warning"]));
}

#[test]
fn test_literal_serde() {
    assert_eq!(serde_json::to_value(Level::ReadOnly).unwrap(), "read_only");
    let level: Level = serde_json::from_str(r#""warning""#).unwrap();
    assert_eq!(level, Level::Warn);
    assert!(serde_json::from_str::<Level>(r#""warn""#).is_err());
}

#[test]
fn test_generated_descriptor() {
    let schema = Config::schema();
    assert_eq!(schema.prefix(), "DRV_");

    let ty = schema.field("type").unwrap();
    assert_eq!(schema.env_key(ty), "DRV_TYPE");
    assert!(!ty.has_default());
    assert_eq!(ty.shape(), &Shape::Scalar(ScalarKind::String));

    let level = schema.field("level").unwrap();
    assert_eq!(level.custom_env(), Some("DRV_CUSTOM_LEVEL"));
    assert_eq!(schema.env_key(level), "DRV_CUSTOM_LEVEL");

    let retries = schema.field("retries").unwrap();
    assert_eq!(retries.default_value().unwrap().unwrap(), serde_json::json!(3));

    let timeout = schema.field("timeout").unwrap();
    assert_eq!(timeout.default_value().unwrap().unwrap(), serde_json::Value::Null);
}

#[test]
fn test_nested_shape_points_at_schema() {
    match Config::shape() {
        Shape::Nested(schema) => assert!(std::ptr::eq(schema, Config::schema())),
        other => panic!("Expected Nested shape, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_from_env() {
    env::set_var("DRV_TYPE", "worker");
    env::set_var("DRV_CUSTOM_LEVEL", "read_only");
    env::remove_var("DRV_LEVEL");
    env::remove_var("DRV_RETRIES");
    env::set_var("DRV_TIMEOUT", "30");

    let config = Config::from_env().unwrap();
    assert_eq!(config.r#type, "worker");
    assert_eq!(config.level, Level::ReadOnly);
    assert_eq!(config.retries, Some(3));
    assert_eq!(config.timeout, Some(30));

    let config = Config::from_env_with(Overrides::new().set("retries", serde_json::Value::Null))
        .unwrap();
    assert_eq!(config.retries, None);

    env::remove_var("DRV_TYPE");
    env::remove_var("DRV_CUSTOM_LEVEL");
    env::remove_var("DRV_TIMEOUT");
}

fn api_schema() -> &'static envmix::SchemaDescriptor {
    #[derive(Deserialize, EnvMix)]
    #[envmix(prefix = "API_")]
    struct Config {
        #[allow(dead_code)]
        port: u16,
    }
    Config::schema()
}

fn worker_schema() -> &'static envmix::SchemaDescriptor {
    #[derive(Deserialize, EnvMix)]
    #[envmix(prefix = "WORKER_")]
    struct Config {
        #[allow(dead_code)]
        port: u16,
    }
    Config::schema()
}

#[test]
fn test_same_named_local_schemas_stay_distinct() {
    let api = api_schema();
    let worker = worker_schema();
    assert_eq!(api.name(), "Config");
    assert_eq!(worker.name(), "Config");
    assert_ne!(api.id(), worker.id());

    let registry = envmix::Registry::new();
    registry.register(api);
    registry.register(worker);

    let models = registry.models();
    assert_eq!(models.len(), 2);
    assert_eq!(models[api.id()]["port"], "API_PORT");
    assert_eq!(models[worker.id()]["port"], "WORKER_PORT");

    let envs = registry.envs();
    assert!(envs.contains_key("API_PORT"));
    assert!(envs.contains_key("WORKER_PORT"));
}
