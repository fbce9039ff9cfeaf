#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    #[error("stop '{0}' has no cached geometry")]
    MissingStop(String),
    #[error("stop positions along trip are not monotonically increasing")]
    NonMonotonicPositions,
    #[error("stop time with stop_sequence {0} bounds the trip but has no arrival or departure time")]
    MissingEndpointTime(u32),
    #[error("interpolation bounds run backwards in time: {0} to {1}")]
    DecreasingTimes(u32, u32),
    #[error("line requires at least 2 points, found {0}")]
    InsufficientPoints(usize),
    #[error("expected {expected} positions, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}
