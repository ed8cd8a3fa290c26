use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("canvas must be at least 1x1 pixels, got {width}x{height}")]
    InvalidCanvas { width: i32, height: i32 },
    #[error("a channel needs at least one gate (the interface gate)")]
    NoGates,
    #[error("DAC capacity must be between 1 and {max}, got {actual}")]
    DacCapacity { max: usize, actual: usize },
    #[error("sample period must be greater than zero")]
    InvalidSamplePeriod,
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to render snapshot: {0}")]
    Snapshot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ScopeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ScopeError::Snapshot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ScopeError {
    fn from(value: image::ImageError) -> Self {
        ScopeError::Snapshot(value.to_string())
    }
}
