use thiserror::Error;

/// Terminal failures of a clip analysis run.
///
/// Every variant aborts the whole pipeline; partial results are discarded
/// and retrying is the caller's responsibility.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no balls detected for more than {0} consecutive frames")]
    DetectionGapExceeded(u32),

    #[error("clip exceeds the {0} frame limit")]
    ClipTooLong(u32),

    #[error("fewer than two balls produced a detectable movement onset")]
    InsufficientMovement,

    #[error("camera-to-table homography was never established")]
    HomographyUnavailable,

    #[error("detector failure: {0}")]
    Detector(#[source] Box<dyn std::error::Error + Send + Sync>),
}
