/// Errors that can occur while reading from a timed byte source.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying stream failed while the worker was reading from it.
    #[error("source read failed: {0}")]
    Read(#[source] std::io::Error),

    /// Closing the underlying stream failed.
    #[error("failed to close source: {0}")]
    Close(#[source] std::io::Error),

    /// The background reader could not be started.
    #[error("failed to start reader worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The source was used after `close()`.
    #[error("byte source is closed")]
    Closed,

    /// The background reader went away without reporting end-of-stream.
    #[error("reader worker exited unexpectedly")]
    WorkerLost,
}

pub type Result<T> = std::result::Result<T, TransportError>;
