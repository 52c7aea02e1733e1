use std::env;

use darakbang::config::Config;
use pretty_assertions::assert_eq;
use serial_test::serial;

mod common;

use common::EnvGuard;

const KEYS: &[&str] = &[
    "DATABASE_URL",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "CLIENT_BASE_URL",
    "PUBLIC_BASE_URL",
    "SITE_PASSWORD",
    "ADMIN_PASSWORD",
    "SESSION_SECRET",
    "SESSION_TTL_HOURS",
    "PHOTO_DIR",
    "PHOTO_URL_TTL_SECS",
];

fn clear_env() -> EnvGuard {
    let guard = EnvGuard::new(KEYS);
    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
    guard
}

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    common::setup_test_env();
    let _guard = clear_env();

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://@localhost:5432/darakbang");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.client_base_url, "http://localhost:5173");
    assert_eq!(config.public_base_url, "http://127.0.0.1:8080");
    assert_eq!(config.session_ttl_hours, 12);
    assert_eq!(config.photo_dir, "./photos");
    assert_eq!(config.photo_url_ttl_secs, 3600);
    assert_eq!(config.photo_url_ttl().as_secs(), 3600);
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    let _guard = clear_env();
    unsafe {
        env::set_var("DATABASE_URL", "postgres://db:5432/prayers");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "3000");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("PUBLIC_BASE_URL", "https://prayers.example.org");
        env::set_var("SITE_PASSWORD", "open-sesame");
        env::set_var("ADMIN_PASSWORD", "admin-sesame");
        env::set_var("SESSION_SECRET", "a-real-secret");
        env::set_var("SESSION_TTL_HOURS", "2");
        env::set_var("PHOTO_DIR", "/var/lib/photos");
        env::set_var("PHOTO_URL_TTL_SECS", "600");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://db:5432/prayers");
    assert_eq!(config.server_address(), "0.0.0.0:3000");
    assert!(config.is_production());
    assert_eq!(config.public_base_url, "https://prayers.example.org");
    assert_eq!(config.site_password, "open-sesame");
    assert_eq!(config.session_ttl().as_secs(), 2 * 3600);
    assert_eq!(config.photo_dir, "/var/lib/photos");
    assert_eq!(config.photo_url_ttl_secs, 600);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_config_invalid_numbers_fall_back_to_defaults() {
    let _guard = clear_env();
    unsafe {
        env::set_var("PORT", "invalid_port");
        env::set_var("SESSION_TTL_HOURS", "soon");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.session_ttl_hours, 12);
}

#[test]
fn test_config_environment_detection() {
    let mut config = Config::test_config();
    assert!(!config.is_production());
    assert!(!config.is_development());

    config.environment = "development".to_string();
    assert!(config.is_development());

    config.environment = "production".to_string();
    assert!(config.is_production());
}

#[test]
fn test_validate_requires_both_passwords() {
    let mut config = Config::test_config();
    assert!(config.validate().is_ok());

    config.admin_password.clear();
    assert!(config.validate().is_err());

    let mut config = Config::test_config();
    config.site_password.clear();
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn test_validate_rejects_default_secret_in_production() {
    let _guard = clear_env();
    unsafe {
        env::set_var("ENVIRONMENT", "production");
        env::set_var("SITE_PASSWORD", "open-sesame");
        env::set_var("ADMIN_PASSWORD", "admin-sesame");
    }

    let config = Config::from_env_only().unwrap();
    assert!(config.validate().is_err());
}
