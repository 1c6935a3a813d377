use aes::cipher::{
    block_padding::Pkcs7, generic_array::GenericArray, BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::{config::KeyMaterial, error::CipherError};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypts and decrypts the cookie half of a token.
pub trait SymmetricCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

/// AES-256-CBC with PKCS#7 padding, output as standard base64.
///
/// Security note: the IV is fixed for the lifetime of the key, so equal
/// plaintexts encrypt to equal ciphertexts and plaintexts sharing a leading
/// block share a leading ciphertext block. Tokens start with a random
/// identifier, which limits what this reveals, but it is a known weakness of
/// the cookie format. A random per-message IV would break every cookie already
/// issued.
#[derive(Clone)]
pub struct AesCipher {
    keys: KeyMaterial,
}

impl std::fmt::Debug for AesCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesCipher")
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl AesCipher {
    pub fn new(keys: KeyMaterial) -> Self {
        Self { keys }
    }

    fn encryptor(&self) -> Aes256CbcEnc {
        Aes256CbcEnc::new(
            GenericArray::from_slice(self.keys.key()),
            GenericArray::from_slice(self.keys.iv()),
        )
    }

    fn decryptor(&self) -> Aes256CbcDec {
        Aes256CbcDec::new(
            GenericArray::from_slice(self.keys.key()),
            GenericArray::from_slice(self.keys.iv()),
        )
    }
}

impl SymmetricCipher for AesCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let ciphertext = self
            .encryptor()
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Ok(BASE64.encode(ciphertext))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let bytes = BASE64.decode(ciphertext)?;
        let plaintext = self
            .decryptor()
            .decrypt_padded_vec_mut::<Pkcs7>(&bytes)
            .map_err(|_| CipherError::Decryption)?;

        Ok(String::from_utf8(plaintext)?)
    }
}
