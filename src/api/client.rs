//! Transport seam.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::request::ApiRequest;
use super::response::{ApiError, ApiResponse};

/// Opaque transport capability.
///
/// Implementations execute the request however they like (real HTTP stack,
/// recorded fixtures, in-memory fakes) and must normalize every failure into
/// the [`ApiError`] taxonomy; nothing else crosses this boundary.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute a request, returning the raw JSON body on success.
    async fn execute_raw(&self, request: ApiRequest) -> ApiResponse<serde_json::Value>;
}

/// Typed execution on top of any [`HttpClient`].
#[async_trait]
pub trait HttpClientExt: HttpClient {
    /// Execute a request, decode the body as `Dto` and map it into the
    /// caller's domain type. Decode failures become
    /// [`ApiError::Serialization`].
    async fn execute<Dto, Output, Mapper>(
        &self,
        request: ApiRequest,
        mapper: Mapper,
    ) -> ApiResponse<Output>
    where
        Dto: DeserializeOwned + Send,
        Output: Send,
        Mapper: FnOnce(Dto) -> Output + Send,
    {
        match self.execute_raw(request).await {
            ApiResponse::Success { body, code } => match serde_json::from_value::<Dto>(body) {
                Ok(dto) => ApiResponse::Success {
                    body: mapper(dto),
                    code,
                },
                Err(err) => ApiResponse::Error(ApiError::Serialization {
                    code,
                    reason: err.to_string(),
                }),
            },
            ApiResponse::Error(error) => ApiResponse::Error(error),
        }
    }
}

impl<C: HttpClient + ?Sized> HttpClientExt for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Method, Route};
    use serde::Deserialize;

    struct CannedClient {
        response: ApiResponse<serde_json::Value>,
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        async fn execute_raw(&self, _request: ApiRequest) -> ApiResponse<serde_json::Value> {
            self.response.clone()
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct CountDto {
        count: u32,
    }

    fn request() -> ApiRequest {
        ApiRequest::builder()
            .method(Method::Get)
            .route(Route::new("https://example.com").child("count"))
            .build()
    }

    #[tokio::test]
    async fn test_execute_decodes_and_maps_body() {
        let client = CannedClient {
            response: ApiResponse::success(serde_json::json!({ "count": 5 })),
        };
        let response = client.execute(request(), |dto: CountDto| dto.count * 2).await;
        assert_eq!(response, ApiResponse::Success { body: 10, code: 200 });
    }

    #[tokio::test]
    async fn test_execute_normalizes_decode_failure() {
        let client = CannedClient {
            response: ApiResponse::success(serde_json::json!({ "unexpected": true })),
        };
        let response = client.execute(request(), |dto: CountDto| dto.count).await;
        match response {
            ApiResponse::Error(ApiError::Serialization { code, .. }) => assert_eq!(code, 200),
            other => panic!("expected serialization error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_passes_transport_error_through() {
        let error = ApiError::Network {
            code: 503,
            reason: "unreachable".to_string(),
        };
        let client = CannedClient {
            response: ApiResponse::Error(error.clone()),
        };
        let response = client.execute(request(), |dto: CountDto| dto.count).await;
        assert_eq!(response, ApiResponse::Error(error));
    }
}
