use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flowstate::api::{ApiError, ApiResponse};
use flowstate::dispatch::Dispatcher;
use flowstate::outcome::{Outcome, OutcomeStreamExt, ResultOutcome};
use flowstate::usecase::{FlowCollector, FlowOutcomeUseCase, FlowUseCase, OutcomeCollector};
use futures_util::StreamExt;

#[derive(Debug, Clone, PartialEq)]
enum FetchError {
    Backend(u16),
    Broken(String),
}

/// Doubles its input after the implicit progress marker.
#[derive(Clone)]
struct DoubleUseCase {
    dispatcher: Dispatcher,
}

#[async_trait]
impl FlowOutcomeUseCase for DoubleUseCase {
    type Params = u32;
    type Success = u32;
    type Error = FetchError;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, collector: &OutcomeCollector<u32, FetchError>, params: u32) {
        collector.emit_success(params * 2).await;
    }
}

/// Same operation with the progress prefix disabled.
#[derive(Clone)]
struct QuietDoubleUseCase {
    dispatcher: Dispatcher,
}

#[async_trait]
impl FlowOutcomeUseCase for QuietDoubleUseCase {
    type Params = u32;
    type Success = u32;
    type Error = FetchError;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn emit_progress_on_start(&self) -> bool {
        false
    }

    async fn execute(&self, collector: &OutcomeCollector<u32, FetchError>, params: u32) {
        collector.emit_success(params * 2).await;
    }
}

/// Forwards a canned transport response through `emit_from`.
#[derive(Clone)]
struct TransportUseCase {
    dispatcher: Dispatcher,
    response: ApiResponse<u32>,
}

#[async_trait]
impl FlowOutcomeUseCase for TransportUseCase {
    type Params = ();
    type Success = u32;
    type Error = FetchError;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, collector: &OutcomeCollector<u32, FetchError>, _params: ()) {
        collector
            .emit_from(self.response.clone(), |error| {
                FetchError::Backend(error.code())
            })
            .await;
    }
}

/// Runs a fallible block through `emit_catching`.
#[derive(Clone)]
struct CatchingUseCase {
    dispatcher: Dispatcher,
    fail: bool,
}

#[async_trait]
impl FlowOutcomeUseCase for CatchingUseCase {
    type Params = ();
    type Success = u32;
    type Error = FetchError;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, collector: &OutcomeCollector<u32, FetchError>, _params: ()) {
        let fail = self.fail;
        collector
            .emit_catching(
                |err: std::num::ParseIntError| FetchError::Broken(err.to_string()),
                async move {
                    let raw = if fail { "oops" } else { "7" };
                    raw.parse::<u32>()
                },
            )
            .await;
    }
}

/// Plain element stream without the outcome shape.
#[derive(Clone)]
struct TickUseCase {
    dispatcher: Dispatcher,
    finished: Arc<AtomicBool>,
}

#[async_trait]
impl FlowUseCase for TickUseCase {
    type Params = u32;
    type Output = u32;

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn execute(&self, collector: &FlowCollector<u32>, params: u32) {
        for n in 0..params {
            collector.emit(n).await;
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        collector.emit(params).await;
        self.finished.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn invoke_prepends_progress_marker() {
    let use_case = DoubleUseCase {
        dispatcher: Dispatcher::current(),
    };
    let outcomes: Vec<_> = use_case.invoke(21).collect().await;
    assert_eq!(
        outcomes,
        vec![Outcome::Progress(None), Outcome::Success(42)]
    );
}

#[tokio::test]
async fn progress_prefix_can_be_disabled() {
    let use_case = QuietDoubleUseCase {
        dispatcher: Dispatcher::current(),
    };
    let outcomes: Vec<_> = use_case.invoke(21).collect().await;
    assert_eq!(outcomes, vec![Outcome::Success(42)]);
}

#[tokio::test]
async fn first_result_skips_the_progress_marker() {
    let use_case = DoubleUseCase {
        dispatcher: Dispatcher::current(),
    };
    let result = use_case.invoke(5).first_result().await;
    assert_eq!(result, Ok(ResultOutcome::Success(10)));
}

#[tokio::test]
async fn emit_from_converts_transport_success() {
    let use_case = TransportUseCase {
        dispatcher: Dispatcher::current(),
        response: ApiResponse::success(9),
    };
    let result = use_case.invoke(()).first_result().await;
    assert_eq!(result, Ok(ResultOutcome::Success(9)));
}

#[tokio::test]
async fn emit_from_maps_transport_errors() {
    let use_case = TransportUseCase {
        dispatcher: Dispatcher::current(),
        response: ApiResponse::Error(ApiError::Http {
            code: 404,
            reason: "not found".to_string(),
        }),
    };
    let result = use_case.invoke(()).first_result().await;
    assert_eq!(result, Ok(ResultOutcome::Failure(FetchError::Backend(404))));
}

#[tokio::test]
async fn emit_catching_emits_success_on_ok() {
    let use_case = CatchingUseCase {
        dispatcher: Dispatcher::current(),
        fail: false,
    };
    let result = use_case.invoke(()).first_result().await;
    assert_eq!(result, Ok(ResultOutcome::Success(7)));
}

#[tokio::test]
async fn emit_catching_maps_errors_to_failure() {
    let use_case = CatchingUseCase {
        dispatcher: Dispatcher::current(),
        fail: true,
    };
    let result = use_case.invoke(()).first_result().await;
    match result {
        Ok(ResultOutcome::Failure(FetchError::Broken(_))) => {}
        other => panic!("expected broken failure, got {other:?}"),
    }
}

#[tokio::test]
async fn flow_use_case_emits_in_order() {
    let use_case = TickUseCase {
        dispatcher: Dispatcher::current(),
        finished: Arc::new(AtomicBool::new(false)),
    };
    let mut stream = use_case.invoke(3);
    assert_eq!(stream.next().await, Some(0));
    assert_eq!(stream.next().await, Some(1));
    assert_eq!(stream.next().await, Some(2));
}

#[tokio::test]
async fn dropping_the_stream_aborts_the_producer() {
    let finished = Arc::new(AtomicBool::new(false));
    let use_case = TickUseCase {
        dispatcher: Dispatcher::current(),
        finished: Arc::clone(&finished),
    };

    let mut stream = use_case.invoke(1);
    assert_eq!(stream.next().await, Some(0));
    drop(stream);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!finished.load(Ordering::SeqCst));
}
