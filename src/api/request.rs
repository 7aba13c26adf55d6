//! Request construction.
//!
//! A [`Route`] composes an endpoint path from a base and child segments; the
//! [`ApiRequestBuilder`] assembles the full request. A request missing its
//! method or route is malformed by construction and fails fatally: that is a
//! wiring bug, not a runtime condition.

use std::collections::HashMap;

use serde::Serialize;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Whether requests with this method may carry a body.
    pub fn allows_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

/// An endpoint path, composed from a base path and nested segments.
///
/// ```
/// use flowstate::api::Route;
///
/// let api = Route::new("https://example.com/api");
/// let posts = api.child("posts");
/// assert_eq!(posts.child("42").path(), "https://example.com/api/posts/42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    path: String,
}

impl Route {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            path: base_path.into(),
        }
    }

    /// A route one segment below this one.
    pub fn child(&self, segment: &str) -> Route {
        Route {
            path: format!("{}/{}", self.path, segment),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A fully assembled request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub route: Route,
    pub headers: HashMap<String, String>,
    pub parameters: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn builder() -> ApiRequestBuilder {
        ApiRequestBuilder::default()
    }
}

/// Builder for [`ApiRequest`].
#[derive(Debug, Default)]
pub struct ApiRequestBuilder {
    method: Option<Method>,
    route: Option<Route>,
    headers: HashMap<String, String>,
    parameters: HashMap<String, String>,
    body: Option<serde_json::Value>,
}

impl ApiRequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Attach a JSON body.
    ///
    /// # Panics
    /// Panics when `body` cannot be encoded; a request DTO that does not
    /// serialize is a programming error.
    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        let value = serde_json::to_value(body)
            .unwrap_or_else(|err| panic!("request body failed to encode: {err}"));
        self.body = Some(value);
        self
    }

    /// Assemble the request.
    ///
    /// # Panics
    /// Panics when the method or route is missing, or when a body is attached
    /// to a bodyless method (`Get`/`Delete`).
    pub fn build(self) -> ApiRequest {
        let method = self.method.expect("request is missing its method");
        let route = self.route.expect("request is missing its route");
        if self.body.is_some() && !method.allows_body() {
            panic!("{method:?} request to '{}' cannot carry a body", route.path());
        }
        ApiRequest {
            method,
            route,
            headers: self.headers,
            parameters: self.parameters,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_composes_segments() {
        let api = Route::new("https://example.com/api");
        let detail = api.child("posts").child("7");
        assert_eq!(detail.path(), "https://example.com/api/posts/7");
        // Parents are unaffected by children.
        assert_eq!(api.path(), "https://example.com/api");
    }

    #[test]
    fn test_builder_assembles_request() {
        let request = ApiRequest::builder()
            .method(Method::Get)
            .route(Route::new("https://example.com").child("health"))
            .header("accept", "application/json")
            .parameter("verbose", "1")
            .build();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.route.path(), "https://example.com/health");
        assert_eq!(request.headers.get("accept").map(String::as_str), Some("application/json"));
        assert_eq!(request.parameters.get("verbose").map(String::as_str), Some("1"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_post_carries_json_body() {
        #[derive(Serialize)]
        struct NewPost {
            title: &'static str,
        }

        let request = ApiRequest::builder()
            .method(Method::Post)
            .route(Route::new("https://example.com").child("posts"))
            .json_body(&NewPost { title: "hello" })
            .build();

        assert_eq!(request.body, Some(serde_json::json!({ "title": "hello" })));
    }

    #[test]
    #[should_panic(expected = "missing its method")]
    fn test_build_without_method_panics() {
        let _ = ApiRequest::builder().route(Route::new("https://x")).build();
    }

    #[test]
    #[should_panic(expected = "missing its route")]
    fn test_build_without_route_panics() {
        let _ = ApiRequest::builder().method(Method::Get).build();
    }

    #[test]
    #[should_panic(expected = "cannot carry a body")]
    fn test_get_with_body_panics() {
        let _ = ApiRequest::builder()
            .method(Method::Get)
            .route(Route::new("https://x"))
            .json_body(&serde_json::json!({}))
            .build();
    }
}
