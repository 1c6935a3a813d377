pub mod request_token;
pub mod token_set;

pub use request_token::RequestToken;
pub use token_set::{TokenSet, COOKIE_NAME, FORM_FIELD_NAME, HEADER_NAME};
