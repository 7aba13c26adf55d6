//! Stream combinators over [`Outcome`] sequences.
//!
//! Everything here operates on `Stream<Item = Outcome<S, E>>`. Terminal
//! extraction (`first_result`) takes the first `Success`/`Failure` and stops;
//! the tap combinators route each value to a callback while forwarding the
//! stream unchanged. Progress callbacks are debounced so a short-lived
//! operation never flashes a loading indicator.

use std::future::Future;
use std::pin::{pin, Pin};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_core::Stream;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::time::{sleep, Instant, Sleep};

use super::{Outcome, ResultOutcome};

/// Debounce applied to progress callbacks unless a call site overrides it.
pub const DEFAULT_PROGRESS_DELAY: Duration = Duration::from_millis(500);

/// The stream completed without ever producing a terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("outcome stream completed without a terminal value")]
pub struct EmptyStream;

/// Combinators available on any stream of [`Outcome`] values.
pub trait OutcomeStreamExt<S, E>: Stream<Item = Outcome<S, E>> {
    /// Transform `Success` data, passing `Progress` and `Failure` through.
    fn map_success<T, F>(self, transform: F) -> MapSuccess<Self, F>
    where
        Self: Sized,
        F: FnMut(S) -> T,
    {
        MapSuccess {
            inner: self,
            transform,
        }
    }

    /// Substitute a sub-stream for each `Success`, switching to the latest.
    ///
    /// A new upstream `Success` drops the previous sub-stream; `Progress` and
    /// `Failure` pass through as single values and also cancel any active
    /// sub-stream.
    fn flat_map_latest_success<T, F, Sub>(self, transform: F) -> FlatMapLatestSuccess<Self, F, Sub>
    where
        Self: Sized,
        F: FnMut(S) -> Sub,
        Sub: Stream<Item = Outcome<T, E>>,
    {
        FlatMapLatestSuccess {
            upstream: self,
            transform,
            inner: None,
            upstream_done: false,
        }
    }

    /// Route each value to a callback while forwarding the stream unchanged.
    ///
    /// `on_progress` fires only after `progress_delay` elapses without a newer
    /// value; `Success`/`Failure` callbacks fire immediately and cancel any
    /// armed progress callback.
    fn on_each_outcome<FP, FS, FF>(
        self,
        progress_delay: Duration,
        on_progress: FP,
        on_success: FS,
        on_failure: FF,
    ) -> OnEachOutcome<Self, FP, FS, FF>
    where
        Self: Sized,
        FP: FnMut(),
        FS: FnMut(&S),
        FF: FnMut(&E),
    {
        OnEachOutcome {
            inner: self,
            on_progress,
            on_success,
            on_failure,
            progress_delay,
            pending: None,
        }
    }

    /// First terminal value in the stream, or `None` if it completes without
    /// one. Values after the first terminal are never awaited.
    async fn first_result_or_none(self) -> Option<ResultOutcome<S, E>>
    where
        Self: Sized,
    {
        let mut stream = pin!(self);
        while let Some(outcome) = stream.next().await {
            if let Some(result) = outcome.into_result() {
                return Some(result);
            }
        }
        None
    }

    /// First terminal value in the stream; [`EmptyStream`] if it completes
    /// without one.
    async fn first_result(self) -> Result<ResultOutcome<S, E>, EmptyStream>
    where
        Self: Sized,
    {
        self.first_result_or_none().await.ok_or(EmptyStream)
    }
}

impl<St, S, E> OutcomeStreamExt<S, E> for St where St: Stream<Item = Outcome<S, E>> {}

/// Stream returned by [`OutcomeStreamExt::map_success`].
pub struct MapSuccess<St, F> {
    inner: St,
    transform: F,
}

impl<St, F, S, E, T> Stream for MapSuccess<St, F>
where
    St: Stream<Item = Outcome<S, E>> + Unpin,
    F: FnMut(S) -> T + Unpin,
{
    type Item = Outcome<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(outcome)) => Poll::Ready(Some(outcome.map_data(&mut this.transform))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Stream returned by [`OutcomeStreamExt::flat_map_latest_success`].
pub struct FlatMapLatestSuccess<St, F, Sub> {
    upstream: St,
    transform: F,
    inner: Option<Sub>,
    upstream_done: bool,
}

impl<St, F, Sub, S, E, T> Stream for FlatMapLatestSuccess<St, F, Sub>
where
    St: Stream<Item = Outcome<S, E>> + Unpin,
    F: FnMut(S) -> Sub + Unpin,
    Sub: Stream<Item = Outcome<T, E>> + Unpin,
{
    type Item = Outcome<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        // Drain the upstream first so a queued value always wins over the
        // active sub-stream (switch-to-latest).
        while !this.upstream_done {
            match Pin::new(&mut this.upstream).poll_next(cx) {
                Poll::Ready(Some(Outcome::Success(data))) => {
                    this.inner = Some((this.transform)(data));
                }
                Poll::Ready(Some(Outcome::Progress(message))) => {
                    this.inner = None;
                    return Poll::Ready(Some(Outcome::Progress(message)));
                }
                Poll::Ready(Some(Outcome::Failure(error))) => {
                    this.inner = None;
                    return Poll::Ready(Some(Outcome::Failure(error)));
                }
                Poll::Ready(None) => this.upstream_done = true,
                Poll::Pending => break,
            }
        }

        if let Some(inner) = this.inner.as_mut() {
            match Pin::new(inner).poll_next(cx) {
                Poll::Ready(Some(item)) => return Poll::Ready(Some(item)),
                Poll::Ready(None) => {
                    this.inner = None;
                    return if this.upstream_done {
                        Poll::Ready(None)
                    } else {
                        // Upstream already registered its waker above.
                        Poll::Pending
                    };
                }
                Poll::Pending => return Poll::Pending,
            }
        }

        if this.upstream_done {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}

/// Stream returned by [`OutcomeStreamExt::on_each_outcome`].
pub struct OnEachOutcome<St, FP, FS, FF> {
    inner: St,
    on_progress: FP,
    on_success: FS,
    on_failure: FF,
    progress_delay: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl<St, FP, FS, FF, S, E> Stream for OnEachOutcome<St, FP, FS, FF>
where
    St: Stream<Item = Outcome<S, E>> + Unpin,
    FP: FnMut() + Unpin,
    FS: FnMut(&S) + Unpin,
    FF: FnMut(&E) + Unpin,
{
    type Item = Outcome<S, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(outcome)) => {
                // Any newer value cancels an armed progress callback.
                this.pending = None;
                match &outcome {
                    Outcome::Progress(_) => {
                        this.pending = Some(Box::pin(sleep(this.progress_delay)));
                    }
                    Outcome::Success(data) => (this.on_success)(data),
                    Outcome::Failure(error) => (this.on_failure)(error),
                }
                Poll::Ready(Some(outcome))
            }
            Poll::Ready(None) => {
                this.pending = None;
                Poll::Ready(None)
            }
            Poll::Pending => {
                if let Some(delay) = this.pending.as_mut() {
                    if delay.as_mut().poll(cx).is_ready() {
                        (this.on_progress)();
                        this.pending = None;
                    }
                }
                Poll::Pending
            }
        }
    }
}

/// Consume an outcome stream, routing each value to the matching callback.
///
/// Terminal consumer form of [`OutcomeStreamExt::on_each_outcome`]: the same
/// debounce applies to `on_progress`, and callbacks receive owned values.
pub async fn collect_outcome<St, S, E>(
    stream: St,
    progress_delay: Duration,
    mut on_progress: impl FnMut(),
    mut on_success: impl FnMut(S),
    mut on_failure: impl FnMut(E),
) where
    St: Stream<Item = Outcome<S, E>>,
{
    let mut stream = pin!(stream);
    let mut delay = Box::pin(sleep(progress_delay));
    let mut armed = false;

    loop {
        tokio::select! {
            outcome = stream.next() => {
                armed = false;
                match outcome {
                    None => break,
                    Some(Outcome::Progress(_)) => {
                        delay.as_mut().reset(Instant::now() + progress_delay);
                        armed = true;
                    }
                    Some(Outcome::Success(data)) => on_success(data),
                    Some(Outcome::Failure(error)) => on_failure(error),
                }
            }
            () = delay.as_mut(), if armed => {
                on_progress();
                armed = false;
            }
        }
    }
}
