//! Streaming use cases.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_core::Stream;
use tokio::sync::mpsc;

use crate::dispatch::{DispatchedTask, Dispatcher};

/// One element in flight between producer and consumer; the producer suspends
/// until the consumer pulls.
const FLOW_CHANNEL_CAPACITY: usize = 1;

type ProducerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Producer<T> = Box<dyn FnOnce(FlowCollector<T>) -> ProducerFuture + Send>;

/// Push side of a flow: the use case body emits elements through this.
pub struct FlowCollector<T> {
    tx: mpsc::Sender<T>,
}

impl<T: Send> FlowCollector<T> {
    /// Emit one element, suspending until the consumer has room for it.
    pub async fn emit(&self, value: T) {
        // A failed send means the consumer dropped the stream; the producer
        // task is being aborted with it, so the value can be discarded.
        let _ = self.tx.send(value).await;
    }
}

/// Pull side of a flow.
///
/// The producer is launched on its dispatcher at the first poll and aborted
/// when the stream is dropped, so an abandoned flow does no further work.
pub struct FlowStream<T> {
    dispatcher: Dispatcher,
    producer: Option<Producer<T>>,
    rx: Option<mpsc::Receiver<T>>,
    _task: Option<DispatchedTask<()>>,
}

impl<T: Send + 'static> FlowStream<T> {
    /// Build a flow from a producer. Most callers get one from
    /// [`FlowUseCase::invoke`] instead.
    pub fn new(
        dispatcher: Dispatcher,
        producer: impl FnOnce(FlowCollector<T>) -> ProducerFuture + Send + 'static,
    ) -> Self {
        Self {
            dispatcher,
            producer: Some(Box::new(producer)),
            rx: None,
            _task: None,
        }
    }
}

impl<T: Send + 'static> Stream for FlowStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(producer) = this.producer.take() {
            let (tx, rx) = mpsc::channel(FLOW_CHANNEL_CAPACITY);
            this._task = Some(this.dispatcher.run(producer(FlowCollector { tx })));
            this.rx = Some(rx);
        }

        match this.rx.as_mut() {
            Some(rx) => rx.poll_recv(cx),
            None => Poll::Ready(None),
        }
    }
}

/// A streaming asynchronous operation.
///
/// `execute` pushes elements through the collector; `invoke` applies the
/// dispatcher and hands the caller the element stream.
#[async_trait]
pub trait FlowUseCase: Clone + Send + Sync + 'static {
    type Params: Send + 'static;
    type Output: Send + 'static;

    /// Execution context the producer runs on.
    fn dispatcher(&self) -> &Dispatcher;

    /// The operation body.
    async fn execute(&self, collector: &FlowCollector<Self::Output>, params: Self::Params);

    /// Launch `execute` on the dispatcher and return its element stream.
    fn invoke(&self, params: Self::Params) -> FlowStream<Self::Output>
    where
        Self: Sized,
    {
        let this = self.clone();
        FlowStream::new(self.dispatcher().clone(), move |collector| {
            Box::pin(async move {
                this.execute(&collector, params).await;
            })
        })
    }
}
