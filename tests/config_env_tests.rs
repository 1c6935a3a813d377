use std::{collections::HashMap, env};

use aes_antiforgery::{
    config::{
        keys::{IV_ENV_VAR, KEY_ENV_VAR},
        AntiforgeryConfig, EnvironmentKeyProvider, KeyMaterialProvider,
    },
    error::{AntiforgeryError, ConfigError},
    test_utils::test_helpers::{sample_keys, SAMPLE_IV, SAMPLE_KEY},
    AntiforgeryService,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Duration;
use serial_test::serial;

#[derive(Default)]
struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::set_var(key, value.into());
    }

    fn remove(&mut self, key: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.original.drain() {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn keys_are_read_from_the_environment() {
    let mut env_guard = EnvGuard::default();
    env_guard.set(KEY_ENV_VAR, SAMPLE_KEY);
    env_guard.set(IV_ENV_VAR, SAMPLE_IV);

    let keys = EnvironmentKeyProvider::default().key_material().unwrap();

    assert_eq!(keys, sample_keys());
}

#[test]
#[serial]
fn missing_key_variable_is_reported_by_name() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove(KEY_ENV_VAR);
    env_guard.set(IV_ENV_VAR, SAMPLE_IV);

    let result = EnvironmentKeyProvider::default().key_material();

    assert!(matches!(
        result,
        Err(ConfigError::MissingVariable(name)) if name == KEY_ENV_VAR
    ));
}

#[test]
#[serial]
fn empty_iv_variable_counts_as_missing() {
    let mut env_guard = EnvGuard::default();
    env_guard.set(KEY_ENV_VAR, SAMPLE_KEY);
    env_guard.set(IV_ENV_VAR, "");

    let result = EnvironmentKeyProvider::default().key_material();

    assert!(matches!(
        result,
        Err(ConfigError::MissingVariable(name)) if name == IV_ENV_VAR
    ));
}

#[test]
#[serial]
fn non_base64_key_is_rejected() {
    let mut env_guard = EnvGuard::default();
    env_guard.set(KEY_ENV_VAR, "not base64!");
    env_guard.set(IV_ENV_VAR, SAMPLE_IV);

    let result = EnvironmentKeyProvider::default().key_material();

    assert!(matches!(result, Err(ConfigError::InvalidBase64 { .. })));
}

#[test]
#[serial]
fn short_key_is_rejected_with_its_length() {
    let mut env_guard = EnvGuard::default();
    env_guard.set(KEY_ENV_VAR, STANDARD.encode([7u8; 16]));
    env_guard.set(IV_ENV_VAR, SAMPLE_IV);

    let result = EnvironmentKeyProvider::default().key_material();

    assert!(matches!(
        result,
        Err(ConfigError::InvalidLength {
            expected: 32,
            actual: 16,
            ..
        })
    ));
}

#[test]
#[serial]
fn custom_variable_names_are_honoured() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("MY_APP_CSRF_KEY", SAMPLE_KEY);
    env_guard.set("MY_APP_CSRF_IV", SAMPLE_IV);

    let provider = EnvironmentKeyProvider::new("MY_APP_CSRF_KEY", "MY_APP_CSRF_IV");

    assert_eq!(provider.key_material().unwrap(), sample_keys());
}

#[test]
#[serial]
fn service_construction_fails_without_keys() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove(KEY_ENV_VAR);
    env_guard.remove(IV_ENV_VAR);

    let result = AntiforgeryService::from_provider(
        &EnvironmentKeyProvider::default(),
        AntiforgeryConfig::default(),
    );

    assert!(matches!(
        result,
        Err(AntiforgeryError::Config(ConfigError::MissingVariable(_)))
    ));
}

#[test]
#[serial]
fn validity_defaults_to_twelve_hours() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove("AES_CSRF_VALIDITY_HOURS");
    env_guard.remove("ENVIRONMENT");

    let config = AntiforgeryConfig::from_env().unwrap();

    assert_eq!(config.validity, Duration::hours(12));
    assert!(!config.cookie.secure);
}

#[test]
#[serial]
fn validity_is_read_in_hours() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("AES_CSRF_VALIDITY_HOURS", "2");

    let config = AntiforgeryConfig::from_env().unwrap();

    assert_eq!(config.validity, Duration::hours(2));
}

#[test]
#[serial]
fn invalid_validity_is_rejected() {
    let mut env_guard = EnvGuard::default();

    for value in ["0", "-3", "soon", "3000000000000000"] {
        env_guard.set("AES_CSRF_VALIDITY_HOURS", value);
        let result = AntiforgeryConfig::from_env();
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { .. })),
            "{} should be rejected",
            value
        );
    }
}

#[test]
#[serial]
fn cookie_is_secure_in_production() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove("AES_CSRF_VALIDITY_HOURS");
    env_guard.set("ENVIRONMENT", "production");

    let config = AntiforgeryConfig::from_env().unwrap();

    assert!(config.cookie.secure);
    assert!(config.cookie.http_only);
}
