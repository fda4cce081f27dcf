use std::io;

/// Failures on the consumer side of the snapshot. The audio thread has no error path.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("snapshot is being read by another consumer")]
    LockFailed,

    #[error("poll rate must be a positive number of Hz, got {0}")]
    InvalidRate(f32),

    #[error("failed to spawn snapshot feed thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("failed to serialize audio data: {0}")]
    Serialize(#[from] serde_json::Error),
}
