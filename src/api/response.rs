//! Response taxonomy and combinators.

use std::future::Future;

use thiserror::Error;

/// Normalized failure classes for transport operations.
///
/// Every variant carries the numeric code reported by the transport and a
/// human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("http error {code}: {reason}")]
    Http { code: u16, reason: String },

    #[error("network error {code}: {reason}")]
    Network { code: u16, reason: String },

    #[error("serialization error {code}: {reason}")]
    Serialization { code: u16, reason: String },

    #[error("unspecified error {code}: {reason}")]
    Unspecified { code: u16, reason: String },
}

impl ApiError {
    pub fn code(&self) -> u16 {
        match self {
            ApiError::Http { code, .. }
            | ApiError::Network { code, .. }
            | ApiError::Serialization { code, .. }
            | ApiError::Unspecified { code, .. } => *code,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            ApiError::Http { reason, .. }
            | ApiError::Network { reason, .. }
            | ApiError::Serialization { reason, .. }
            | ApiError::Unspecified { reason, .. } => reason,
        }
    }
}

/// Result of a transport operation: a body with its status code, or a
/// normalized [`ApiError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { body: T, code: u16 },
    Error(ApiError),
}

impl<T> ApiResponse<T> {
    /// A success with status 200.
    pub fn success(body: T) -> Self {
        ApiResponse::Success { body, code: 200 }
    }

    pub fn success_with_code(body: T, code: u16) -> Self {
        ApiResponse::Success { body, code }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn code(&self) -> u16 {
        match self {
            ApiResponse::Success { code, .. } => *code,
            ApiResponse::Error(error) => error.code(),
        }
    }

    /// Transform the success body, passing errors through.
    pub fn map<U>(self, transform: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success { body, code } => ApiResponse::Success {
                body: transform(body),
                code,
            },
            ApiResponse::Error(error) => ApiResponse::Error(error),
        }
    }

    /// Chain a dependent call on the success body, passing errors through.
    pub async fn flat_map<U, Fut>(self, transform: impl FnOnce(T) -> Fut) -> ApiResponse<U>
    where
        Fut: Future<Output = ApiResponse<U>>,
    {
        match self {
            ApiResponse::Success { body, .. } => transform(body).await,
            ApiResponse::Error(error) => ApiResponse::Error(error),
        }
    }

    /// Run a side effect on the success body and hand the response back.
    pub fn on_success(self, block: impl FnOnce(&T)) -> Self {
        if let ApiResponse::Success { body, .. } = &self {
            block(body);
        }
        self
    }
}

/// Run two calls concurrently and combine their bodies.
///
/// Returns the first error encountered when either call fails.
pub async fn zip2<T1, T2, R, Fut1, Fut2>(
    call1: Fut1,
    call2: Fut2,
    transform: impl FnOnce(T1, T2) -> R,
) -> ApiResponse<R>
where
    Fut1: Future<Output = ApiResponse<T1>>,
    Fut2: Future<Output = ApiResponse<T2>>,
{
    let (response1, response2) = tokio::join!(call1, call2);
    match (response1, response2) {
        (
            ApiResponse::Success { body: body1, .. },
            ApiResponse::Success { body: body2, .. },
        ) => ApiResponse::success(transform(body1, body2)),
        (ApiResponse::Error(error), _) => ApiResponse::Error(error),
        (_, ApiResponse::Error(error)) => ApiResponse::Error(error),
    }
}

/// Run three calls concurrently and combine their bodies.
///
/// Returns the first error encountered when any call fails.
pub async fn zip3<T1, T2, T3, R, Fut1, Fut2, Fut3>(
    call1: Fut1,
    call2: Fut2,
    call3: Fut3,
    transform: impl FnOnce(T1, T2, T3) -> R,
) -> ApiResponse<R>
where
    Fut1: Future<Output = ApiResponse<T1>>,
    Fut2: Future<Output = ApiResponse<T2>>,
    Fut3: Future<Output = ApiResponse<T3>>,
{
    let (response1, response2, response3) = tokio::join!(call1, call2, call3);
    match (response1, response2, response3) {
        (
            ApiResponse::Success { body: body1, .. },
            ApiResponse::Success { body: body2, .. },
            ApiResponse::Success { body: body3, .. },
        ) => ApiResponse::success(transform(body1, body2, body3)),
        (ApiResponse::Error(error), _, _) => ApiResponse::Error(error),
        (_, ApiResponse::Error(error), _) => ApiResponse::Error(error),
        (_, _, ApiResponse::Error(error)) => ApiResponse::Error(error),
    }
}
