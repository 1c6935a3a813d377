pub mod antiforgery_service;
pub mod cipher;
pub mod clock;
pub mod cookie_setter;
pub mod request_validator;

pub use antiforgery_service::AntiforgeryService;
pub use cipher::{AesCipher, SymmetricCipher};
pub use clock::{Clock, FixedClock, SystemClock};
pub use cookie_setter::{CookieSetter, DefaultCookieSetter};
pub use request_validator::{is_safe_method, RequestValidator, SAFE_METHODS};
