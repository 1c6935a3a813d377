use serde::Serialize;

/// Name of the cookie carrying the encrypted token.
pub const COOKIE_NAME: &str = "csrf_requestid_cookie";

/// Name of the hidden form field carrying the plaintext token.
pub const FORM_FIELD_NAME: &str = "csrf_requestid";

/// Header used instead of the form field for JSON / AJAX posts.
pub const HEADER_NAME: &str = "X-Csrf-RequestId";

/// The two halves of one antiforgery token plus the names they travel under.
///
/// `request_token` goes to the page (form field or script), `cookie_token`
/// goes to the browser cookie. The cookie half is never serialized so it can
/// not leak into a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSet {
    pub request_token: String,
    #[serde(skip_serializing)]
    pub cookie_token: String,
    pub cookie_name: String,
    pub form_field_name: String,
    pub header_name: String,
}

impl TokenSet {
    pub fn new(request_token: String, cookie_token: String) -> Self {
        Self {
            request_token,
            cookie_token,
            cookie_name: COOKIE_NAME.to_string(),
            form_field_name: FORM_FIELD_NAME.to_string(),
            header_name: HEADER_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_set_uses_fixed_names() {
        let set = TokenSet::new("plain".to_string(), "cipher".to_string());
        assert_eq!(set.cookie_name, "csrf_requestid_cookie");
        assert_eq!(set.form_field_name, "csrf_requestid");
        assert_eq!(set.header_name, "X-Csrf-RequestId");
    }

    #[test]
    fn test_cookie_token_is_not_serialized() {
        let set = TokenSet::new("plain".to_string(), "cipher".to_string());
        let json = serde_json::to_value(&set).unwrap();

        assert_eq!(json["request_token"], "plain");
        assert_eq!(json["header_name"], "X-Csrf-RequestId");
        assert!(json.get("cookie_token").is_none());
    }
}
