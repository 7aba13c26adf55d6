//! Streaming use cases specialized to outcome elements.

use std::future::Future;

use async_trait::async_trait;

use crate::api::{ApiError, ApiResponse};
use crate::dispatch::Dispatcher;
use crate::outcome::Outcome;

use super::flow::{FlowCollector, FlowStream};

/// Push side of an outcome flow, with emission helpers for the common cases.
pub struct OutcomeCollector<S, E> {
    inner: FlowCollector<Outcome<S, E>>,
}

impl<S: Send, E: Send> OutcomeCollector<S, E> {
    fn new(inner: FlowCollector<Outcome<S, E>>) -> Self {
        Self { inner }
    }

    pub async fn emit(&self, outcome: Outcome<S, E>) {
        self.inner.emit(outcome).await;
    }

    pub async fn emit_progress(&self) {
        self.emit(Outcome::progress()).await;
    }

    pub async fn emit_progress_with(&self, message: impl Into<String> + Send) {
        self.emit(Outcome::progress_with(message)).await;
    }

    pub async fn emit_success(&self, data: S) {
        self.emit(Outcome::Success(data)).await;
    }

    pub async fn emit_failure(&self, error: E) {
        self.emit(Outcome::Failure(error)).await;
    }

    /// Convert a transport response: body becomes `Success`, a transport
    /// error is mapped into the flow's error type and becomes `Failure`.
    pub async fn emit_from(
        &self,
        response: ApiResponse<S>,
        error_mapper: impl FnOnce(ApiError) -> E + Send,
    ) {
        match response {
            ApiResponse::Success { body, .. } => self.emit_success(body).await,
            ApiResponse::Error(error) => self.emit_failure(error_mapper(error)).await,
        }
    }

    /// Run a fallible operation: `Ok` emits `Success`, `Err` is mapped and
    /// emits `Failure`. Cancellation drops the whole producer and emits
    /// nothing.
    pub async fn emit_catching<Err, F>(
        &self,
        error_mapper: impl FnOnce(Err) -> E + Send,
        block: F,
    ) where
        F: Future<Output = Result<S, Err>> + Send,
    {
        match block.await {
            Ok(data) => self.emit_success(data).await,
            Err(error) => self.emit_failure(error_mapper(error)).await,
        }
    }
}

/// A streaming use case whose elements are [`Outcome`] values.
///
/// On invocation the flow prepends a single `Progress` marker (unless
/// [`FlowOutcomeUseCase::emit_progress_on_start`] says otherwise), so every
/// consumer can show a loading indicator from the first poll without the
/// implementation emitting it.
#[async_trait]
pub trait FlowOutcomeUseCase: Clone + Send + Sync + 'static {
    type Params: Send + 'static;
    type Success: Send + 'static;
    type Error: Send + 'static;

    /// Execution context the producer runs on.
    fn dispatcher(&self) -> &Dispatcher;

    /// Whether `invoke` prepends a `Progress` marker. Defaults to on.
    fn emit_progress_on_start(&self) -> bool {
        true
    }

    /// The operation body.
    async fn execute(
        &self,
        collector: &OutcomeCollector<Self::Success, Self::Error>,
        params: Self::Params,
    );

    /// Launch `execute` on the dispatcher and return its outcome stream.
    fn invoke(&self, params: Self::Params) -> FlowStream<Outcome<Self::Success, Self::Error>>
    where
        Self: Sized,
    {
        let this = self.clone();
        let progress_on_start = self.emit_progress_on_start();
        FlowStream::new(self.dispatcher().clone(), move |collector| {
            Box::pin(async move {
                let collector = OutcomeCollector::new(collector);
                if progress_on_start {
                    collector.emit_progress().await;
                }
                this.execute(&collector, params).await;
            })
        })
    }
}
