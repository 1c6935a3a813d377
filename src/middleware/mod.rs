pub mod antiforgery;

pub use antiforgery::{antiforgery_middleware, MAX_BODY_BYTES};
