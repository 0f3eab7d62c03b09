//! Outbound request descriptors.
//!
//! An [`ApiRequest`] is immutable once built. The client may send the same
//! descriptor twice (original send and one retry after a token refresh), so
//! the body is held as an owned JSON value rather than a one-shot stream.

use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::Result;

/// Ordered query parameters.
///
/// Array values are encoded with repeated keys (`role=a&role=b`), which is
/// what the API's query parser expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single key/value pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Append a pair only when the value is present.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append one pair per value, all under the same key.
    pub fn push_all<I, V>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self.push(key, value);
        }
        self
    }

    /// Check if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The raw pairs, in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Write the parameters into a URL's query string.
    pub(crate) fn apply(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut serializer = url.query_pairs_mut();
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
    }
}

/// An immutable description of one API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Query,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request with the given method and API-relative path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Replace the query parameters.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_uses_repeated_keys() {
        let mut query = Query::new();
        query
            .push("page", 1)
            .push_all("role_systeme", ["admin", "user"])
            .push_opt::<bool>("est_actif", None);

        let mut url = Url::parse("http://localhost/api/v1/users/").unwrap();
        query.apply(&mut url);

        assert_eq!(url.query(), Some("page=1&role_systeme=admin&role_systeme=user"));
    }

    #[test]
    fn test_empty_query_leaves_url_untouched() {
        let mut url = Url::parse("http://localhost/api/v1/users/").unwrap();
        Query::new().apply(&mut url);
        assert_eq!(url.as_str(), "http://localhost/api/v1/users/");
    }

    #[test]
    fn test_query_escapes_values() {
        let mut query = Query::new();
        query.push("search", "jean & co");

        let mut url = Url::parse("http://localhost/").unwrap();
        query.apply(&mut url);
        assert_eq!(url.query(), Some("search=jean+%26+co"));
    }

    #[test]
    fn test_request_holds_json_body() {
        let request = ApiRequest::post("auth/login")
            .with_json(&serde_json::json!({ "email": "a@b.c" }))
            .unwrap();

        assert_eq!(*request.method(), Method::POST);
        assert_eq!(request.path(), "auth/login");
        assert_eq!(request.body().unwrap()["email"], "a@b.c");
    }
}
