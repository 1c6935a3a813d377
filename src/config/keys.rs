use std::env;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::error::ConfigError;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

pub const KEY_ENV_VAR: &str = "AES_CSRF_KEY";
pub const IV_ENV_VAR: &str = "AES_CSRF_IV";

/// AES-256 key and CBC initialization vector shared by every token of one service.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

impl KeyMaterial {
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, ConfigError> {
        let key: [u8; KEY_LEN] = key.try_into().map_err(|_| ConfigError::InvalidLength {
            name: "key",
            expected: KEY_LEN,
            actual: key.len(),
        })?;
        let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| ConfigError::InvalidLength {
            name: "iv",
            expected: IV_LEN,
            actual: iv.len(),
        })?;

        Ok(Self { key, iv })
    }

    pub fn from_base64(key: &str, iv: &str) -> Result<Self, ConfigError> {
        let key = decode("key", key)?;
        let iv = decode("iv", iv)?;
        Self::new(&key, &iv)
    }

    /// Fresh random key material from the OS random source.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut key);
        OsRng.fill_bytes(&mut iv);
        Self { key, iv }
    }

    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn key_base64(&self) -> String {
        BASE64.encode(self.key)
    }

    pub fn iv_base64(&self) -> String {
        BASE64.encode(self.iv)
    }
}

/// Source of the key material a service is built with.
pub trait KeyMaterialProvider {
    fn key_material(&self) -> Result<KeyMaterial, ConfigError>;
}

/// Key material fixed at construction, e.g. from static configuration.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl StaticKeyProvider {
    pub fn new(key: impl Into<Vec<u8>>, iv: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            iv: iv.into(),
        }
    }
}

impl KeyMaterialProvider for StaticKeyProvider {
    fn key_material(&self) -> Result<KeyMaterial, ConfigError> {
        KeyMaterial::new(&self.key, &self.iv)
    }
}

/// Reads base64 key material from environment variables.
#[derive(Debug, Clone)]
pub struct EnvironmentKeyProvider {
    key_var: String,
    iv_var: String,
}

impl Default for EnvironmentKeyProvider {
    fn default() -> Self {
        Self::new(KEY_ENV_VAR, IV_ENV_VAR)
    }
}

impl EnvironmentKeyProvider {
    pub fn new(key_var: impl Into<String>, iv_var: impl Into<String>) -> Self {
        Self {
            key_var: key_var.into(),
            iv_var: iv_var.into(),
        }
    }
}

impl KeyMaterialProvider for EnvironmentKeyProvider {
    fn key_material(&self) -> Result<KeyMaterial, ConfigError> {
        let key = read_base64_var(&self.key_var)?;
        let iv = read_base64_var(&self.iv_var)?;
        KeyMaterial::new(&key, &iv)
    }
}

fn read_base64_var(name: &str) -> Result<Vec<u8>, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => decode(name, &value),
        _ => Err(ConfigError::MissingVariable(name.to_string())),
    }
}

fn decode(name: &str, value: &str) -> Result<Vec<u8>, ConfigError> {
    BASE64
        .decode(value.trim())
        .map_err(|source| ConfigError::InvalidBase64 {
            name: name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{SAMPLE_IV, SAMPLE_KEY};

    #[test]
    fn test_key_material_from_base64() {
        let material = KeyMaterial::from_base64(SAMPLE_KEY, SAMPLE_IV).unwrap();
        assert_eq!(material.key_base64(), SAMPLE_KEY);
        assert_eq!(material.iv_base64(), SAMPLE_IV);
    }

    #[test]
    fn test_wrong_lengths_are_rejected() {
        assert!(matches!(
            KeyMaterial::new(&[0u8; 16], &[0u8; 16]),
            Err(ConfigError::InvalidLength { name: "key", .. })
        ));
        assert!(matches!(
            KeyMaterial::new(&[0u8; 32], &[0u8; 32]),
            Err(ConfigError::InvalidLength { name: "iv", .. })
        ));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        assert!(matches!(
            KeyMaterial::from_base64("not base64!", SAMPLE_IV),
            Err(ConfigError::InvalidBase64 { .. })
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = KeyMaterial::generate();
        let b = KeyMaterial::generate();
        assert_ne!(a, b);
        assert_eq!(BASE64.decode(a.key_base64()).unwrap().len(), KEY_LEN);
        assert_eq!(BASE64.decode(a.iv_base64()).unwrap().len(), IV_LEN);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let material = KeyMaterial::generate();
        let debug = format!("{:?}", material);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&material.key_base64()));
    }

    #[test]
    fn test_static_provider_validates_lengths() {
        let provider = StaticKeyProvider::new(vec![1u8; 32], vec![2u8; 16]);
        assert!(provider.key_material().is_ok());

        let provider = StaticKeyProvider::new(vec![1u8; 31], vec![2u8; 16]);
        assert!(provider.key_material().is_err());
    }
}
