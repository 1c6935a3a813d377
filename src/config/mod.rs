pub mod antiforgery;
pub mod keys;

pub use antiforgery::{AntiforgeryConfig, CookieOptions};
pub use keys::{EnvironmentKeyProvider, KeyMaterial, KeyMaterialProvider, StaticKeyProvider};
