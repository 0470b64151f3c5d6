//! Download progress tracking
//!
//! [`ProgressStream`] sits between the transport's chunk stream and the
//! body reader. It reports the running byte count after each chunk and
//! forwards the chunk unchanged; nothing is buffered.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use pin_project_lite::pin_project;

use super::Response;
use crate::error::BoxError;

/// Snapshot of a body download
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Bytes read so far
    pub loaded: u64,
    /// Expected total from `Content-Length`, if the server sent one
    pub total: Option<u64>,
    /// `loaded / total` when the total is known and non-zero
    pub fraction: Option<f64>,
}

impl Progress {
    #[allow(clippy::cast_precision_loss)]
    fn new(loaded: u64, total: Option<u64>) -> Self {
        let fraction = total
            .filter(|total| *total > 0)
            .map(|total| loaded as f64 / total as f64);
        Self {
            loaded,
            total,
            fraction,
        }
    }
}

/// Callback receiving progress updates
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

pin_project! {
    /// Chunk stream that reports progress as it is consumed
    ///
    /// After the inner stream yields an error, the error is forwarded once
    /// and the stream ends.
    pub struct ProgressStream<S> {
        #[pin]
        inner: S,
        loaded: u64,
        total: Option<u64>,
        callback: ProgressCallback,
        errored: bool,
    }
}

impl<S> ProgressStream<S> {
    pub fn new(inner: S, total: Option<u64>, callback: ProgressCallback) -> Self {
        Self {
            inner,
            loaded: 0,
            total,
            callback,
            errored: false,
        }
    }

    /// Bytes forwarded so far.
    pub fn loaded(&self) -> u64 {
        self.loaded
    }
}

impl<S> fmt::Debug for ProgressStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStream")
            .field("loaded", &self.loaded)
            .field("total", &self.total)
            .field("errored", &self.errored)
            .finish_non_exhaustive()
    }
}

impl<S> Stream for ProgressStream<S>
where
    S: Stream<Item = Result<Bytes, BoxError>>,
{
    type Item = Result<Bytes, BoxError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.errored {
            return Poll::Ready(None);
        }

        match ready!(this.inner.poll_next(cx)) {
            Some(Ok(chunk)) => {
                *this.loaded += chunk.len() as u64;
                let progress = Progress::new(*this.loaded, *this.total);
                tracing::trace!(loaded = progress.loaded, total = ?progress.total, "body progress");
                (this.callback)(progress);
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(error)) => {
                *this.errored = true;
                Poll::Ready(Some(Err(error)))
            }
            None => Poll::Ready(None),
        }
    }
}

/// Wrap `response` so that reading its body reports progress to `callback`.
///
/// The total comes from the `Content-Length` header; without it `total`
/// and `fraction` stay `None` for every update.
#[must_use]
pub fn with_progress(response: Response, callback: ProgressCallback) -> Response {
    let total = response.content_length();
    response.map_body(|body| body.map_stream(|stream| ProgressStream::new(stream, total, callback).boxed()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;

    use super::*;

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<Progress>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |progress| {
            sink.lock().expect("progress recorder poisoned").push(progress);
        });
        (callback, seen)
    }

    #[tokio::test]
    async fn reports_running_prefix_sum() {
        let chunks = vec![3usize, 1, 6];
        let source = stream::iter(
            chunks
                .iter()
                .map(|len| Ok::<_, BoxError>(Bytes::from(vec![b'x'; *len])))
                .collect::<Vec<_>>(),
        );
        let (callback, seen) = recorder();

        let forwarded: Vec<Bytes> = ProgressStream::new(source, Some(10), callback)
            .map(|chunk| chunk.expect("no read errors"))
            .collect()
            .await;

        assert_eq!(forwarded.iter().map(Bytes::len).collect::<Vec<_>>(), chunks);
        let seen = seen.lock().expect("progress recorder poisoned");
        assert_eq!(seen.iter().map(|p| p.loaded).collect::<Vec<_>>(), vec![3, 4, 10]);
        assert_eq!(seen.last().and_then(|p| p.fraction), Some(1.0));
    }

    #[tokio::test]
    async fn unknown_total_leaves_fraction_unset() {
        let source = stream::iter(vec![Ok::<_, BoxError>(Bytes::from_static(b"abc"))]);
        let (callback, seen) = recorder();

        let _: Vec<_> = ProgressStream::new(source, None, callback).collect().await;

        let seen = seen.lock().expect("progress recorder poisoned");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].total, None);
        assert_eq!(seen[0].fraction, None);
    }

    #[tokio::test]
    async fn read_error_is_terminal() {
        let source = stream::iter(vec![
            Ok::<_, BoxError>(Bytes::from_static(b"ab")),
            Err::<Bytes, BoxError>("connection reset".into()),
            Ok(Bytes::from_static(b"never")),
        ]);
        let (callback, seen) = recorder();

        let items: Vec<_> = ProgressStream::new(source, Some(9), callback).collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
        let seen = seen.lock().expect("progress recorder poisoned");
        assert_eq!(seen.iter().map(|p| p.loaded).collect::<Vec<_>>(), vec![2]);
    }
}
