//! Tests for layered configuration loading.
//!
//! Each test writes `.env` layers into its own temp directory and loads from
//! there; the process environment is left alone so tests can run in parallel.

use std::fs;
use std::path::Path;

use orgstore::config::{ConfigError, ConfigLoader};
use tempfile::tempdir;

fn write_env(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn loads_config_from_env_file() {
    let dir = tempdir().unwrap();
    write_env(
        dir.path(),
        ".env",
        "ORGSTORE_JWT_SECRET=file-secret\n\
         ORGSTORE_DATABASE_URL=sqlite::memory:\n\
         ORGSTORE_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .unwrap();

    assert_eq!(config.jwt_secret, "file-secret");
    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.api_bind_addr, "127.0.0.1:4000");
    assert_eq!(config.profile, "local");
}

#[test]
fn defaults_fill_unset_values() {
    let dir = tempdir().unwrap();
    write_env(dir.path(), ".env", "ORGSTORE_JWT_SECRET=file-secret\n");

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .unwrap();

    assert_eq!(config.api_bind_addr, "0.0.0.0:3000");
    assert_eq!(config.db_max_connections, 10);
    assert_eq!(config.token_ttl_hours, 12);
    assert_eq!(config.log_format, "json");
}

#[test]
fn local_layer_overrides_base_layer() {
    let dir = tempdir().unwrap();
    write_env(
        dir.path(),
        ".env",
        "ORGSTORE_JWT_SECRET=base-secret\n\
         ORGSTORE_LOG_LEVEL=info\n",
    );
    write_env(
        dir.path(),
        ".env.local",
        "ORGSTORE_JWT_SECRET=local-secret\n",
    );

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .unwrap();

    assert_eq!(config.jwt_secret, "local-secret");
    assert_eq!(config.log_level, "info");
}

#[test]
fn profile_layer_overrides_local_layer() {
    let dir = tempdir().unwrap();
    write_env(
        dir.path(),
        ".env",
        "ORGSTORE_PROFILE=staging\n\
         ORGSTORE_JWT_SECRET=base-secret\n",
    );
    write_env(
        dir.path(),
        ".env.staging",
        "ORGSTORE_JWT_SECRET=staging-secret\n\
         ORGSTORE_LOG_FORMAT=plain\n",
    );

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .unwrap();

    assert_eq!(config.profile, "staging");
    assert_eq!(config.jwt_secret, "staging-secret");
    assert_eq!(config.log_format, "plain");
}

#[test]
fn missing_jwt_secret_fails_validation() {
    let dir = tempdir().unwrap();
    write_env(dir.path(), ".env", "ORGSTORE_LOG_LEVEL=debug\n");

    let err = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingJwtSecret));
}

#[test]
fn invalid_bind_addr_is_rejected() {
    let dir = tempdir().unwrap();
    write_env(
        dir.path(),
        ".env",
        "ORGSTORE_JWT_SECRET=file-secret\n\
         ORGSTORE_API_BIND_ADDR=not-an-address\n",
    );

    let err = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
}

#[test]
fn out_of_range_ttl_is_rejected() {
    let dir = tempdir().unwrap();
    write_env(
        dir.path(),
        ".env",
        "ORGSTORE_JWT_SECRET=file-secret\n\
         ORGSTORE_TOKEN_TTL_HOURS=500\n",
    );

    let err = ConfigLoader::with_base_dir(dir.path().to_path_buf())
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidTokenTtl { value: 500 }
    ));
}
