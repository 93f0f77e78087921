//! Error types for galaxy generation and the windowed viewer

use thiserror::Error;

/// Result type for galaxy operations
pub type GalaxyResult<T> = Result<T, GalaxyError>;

/// Errors that can occur while generating or displaying a galaxy
#[derive(Error, Debug)]
pub enum GalaxyError {
  #[error("invalid parameter `{field}`: {reason}")]
  InvalidParameter { field: &'static str, reason: String },

  #[error("invalid color `{0}`: expected #rrggbb")]
  InvalidColor(String),

  #[error("unknown parameter field `{0}`")]
  UnknownField(String),

  #[error("invalid value `{value}` for `{field}`")]
  InvalidValue { field: &'static str, value: String },

  #[error("no suitable graphics adapter found")]
  NoAdapter,

  #[error("surface error: {0}")]
  CreateSurface(#[from] wgpu::CreateSurfaceError),

  #[error("device request failed: {0}")]
  RequestDevice(#[from] wgpu::RequestDeviceError),

  #[error("surface has no supported configuration for this adapter")]
  UnsupportedSurface,

  #[error("window error: {0}")]
  Window(#[from] winit::error::OsError),

  #[error("event loop error: {0}")]
  EventLoop(#[from] winit::error::EventLoopError),
}

impl GalaxyError {
  pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
    GalaxyError::InvalidParameter {
      field,
      reason: reason.into(),
    }
  }
}
