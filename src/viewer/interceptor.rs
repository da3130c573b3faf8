use std::collections::BTreeMap;

/// Header the widget's requests carry the anti-forgery token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// An outgoing request the widget is about to dispatch.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

#[allow(dead_code)]
impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Stamps the page's CSRF token onto every request. The token is captured
/// when the interceptor is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfInterceptor {
    token: String,
}

impl CsrfInterceptor {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn header_name(&self) -> &'static str {
        CSRF_HEADER
    }

    /// Set `X-CSRFToken` on the request, replacing any value already present
    /// under any casing of the header name.
    #[allow(dead_code)]
    pub fn apply(&self, mut request: RequestDescriptor) -> RequestDescriptor {
        request
            .headers
            .retain(|key, _| !key.eq_ignore_ascii_case(CSRF_HEADER));
        request
            .headers
            .insert(CSRF_HEADER.to_string(), self.token.clone());
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_header_on_bare_request() {
        let interceptor = CsrfInterceptor::new("tok-123");
        let request = interceptor.apply(RequestDescriptor::new("GET", "/v1/things/"));
        assert_eq!(request.header("x-csrftoken"), Some("tok-123"));
        assert_eq!(request.method, "GET");
        assert_eq!(request.url, "/v1/things/");
    }

    #[test]
    fn test_overrides_existing_token_in_any_case() {
        let interceptor = CsrfInterceptor::new("tok-123");
        let request = RequestDescriptor::new("POST", "/v1/things/")
            .with_header("x-csrftoken", "forged")
            .with_header("Accept", "application/json");

        let request = interceptor.apply(request);

        let csrf: Vec<_> = request
            .headers
            .keys()
            .filter(|k| k.eq_ignore_ascii_case(CSRF_HEADER))
            .collect();
        assert_eq!(csrf, vec!["X-CSRFToken"]);
        assert_eq!(request.header(CSRF_HEADER), Some("tok-123"));
        assert_eq!(request.header("accept"), Some("application/json"));
    }

    #[test]
    fn test_every_request_carries_token() {
        let interceptor = CsrfInterceptor::new("tok-123");
        let requests = [
            RequestDescriptor::new("GET", "/v1/openapi.json"),
            RequestDescriptor::new("POST", "/v1/a/").with_header("Content-Type", "application/json"),
            RequestDescriptor::new("DELETE", "/v1/a/1/").with_header("X-CSRFToken", ""),
        ];
        for request in requests {
            assert_eq!(interceptor.apply(request).header(CSRF_HEADER), Some("tok-123"));
        }
    }
}
