use http::header::AUTHORIZATION;
use http::HeaderMap;

const SCHEMES: &[&str] = &["Bearer", "JWT"];

/// Token from an `Authorization: <scheme> <token>` header.
///
/// The scheme is matched case-insensitively. A header without a scheme is
/// taken as the token itself.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }

    match value.split_once(' ') {
        Some((scheme, token)) => {
            let token = token.trim();
            let allowed = SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme.trim()));
            (allowed && !token.is_empty()).then_some(token)
        }
        None => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn accepts_known_schemes() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer_token(&headers("bearer  abc ")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("JWT abc")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers("abc")), Some("abc"));
    }

    #[test]
    fn rejects_other_schemes_and_blanks() {
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers("   ")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
