pub mod camera;
pub mod color;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod generate;
pub mod params;
pub mod points;
pub mod render;
pub mod state;
pub mod ui;

pub use color::Rgb;
pub use error::{GalaxyError, GalaxyResult};

/// Inputs of one galaxy generation
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GalaxyParameters {
  pub count: u32,
  /// Point render size
  pub size: f32,
  /// Maximum galaxy radius
  pub radius: f32,
  pub branches: u32,
  /// Radians of twist per unit radius
  pub spin: f32,
  /// Jitter magnitude scale
  pub randomness: f32,
  /// Jitter concentration exponent, larger values pull points onto the arms
  pub randomness_power: f32,
  pub inside_color: Rgb,
  pub outside_color: Rgb,
}

impl Default for GalaxyParameters {
  fn default() -> Self {
    Self {
      count: 10_000,
      size: 0.02,
      radius: 5.0,
      branches: 2,
      spin: 1.0,
      randomness: 0.2,
      randomness_power: 3.0,
      inside_color: Rgb::from_hex(0xff6030),
      outside_color: Rgb::from_hex(0x1b3984),
    }
  }
}

pub struct CameraParams {
  pub fovy: f32,
  pub znear: f32,
  pub zfar: f32,
  pub eye: [f32; 3],
  pub damping_factor: f32,
  pub rotate_speed: f32,
  pub zoom_speed: f32,
  pub pan_speed: f32,
}

impl Default for CameraParams {
  fn default() -> Self {
    Self {
      fovy: 75.0,
      znear: 0.1,
      zfar: 100.0,
      eye: [3.0, 3.0, 3.0],
      damping_factor: 0.05,
      rotate_speed: 1.0,
      zoom_speed: 1.0,
      pan_speed: 1.0,
    }
  }
}
