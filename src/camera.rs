use crate::CameraParams;
use cgmath::{InnerSpace, Vector3};
use std::f32::consts::PI;
use winit::{
  dpi::PhysicalSize,
  event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Device pixel ratios above this are rendered at this ratio
pub const MAX_PIXEL_RATIO: f64 = 2.0;

pub struct Camera {
  pub eye: cgmath::Point3<f32>,
  pub target: cgmath::Point3<f32>,
  pub up: cgmath::Vector3<f32>,
  pub aspect: f32,
  pub fovy: f32,
  pub znear: f32,
  pub zfar: f32,
}

impl Camera {
  pub fn new(params: &CameraParams, aspect: f32) -> Self {
    Self {
      eye: params.eye.into(),
      target: (0.0, 0.0, 0.0).into(),
      up: cgmath::Vector3::unit_y(),
      aspect,
      fovy: params.fovy,
      znear: params.znear,
      zfar: params.zfar,
    }
  }

  fn view_matrix(&self) -> cgmath::Matrix4<f32> {
    cgmath::Matrix4::look_at_rh(self.eye, self.target, self.up)
  }

  fn projection_matrix(&self) -> cgmath::Matrix4<f32> {
    let proj = cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar);
    OPENGL_TO_WGPU_MATRIX * proj
  }

  pub fn distance(&self) -> f32 {
    (self.eye - self.target).magnitude()
  }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
  view: [[f32; 4]; 4],
  proj: [[f32; 4]; 4],
  /// Surface width, height (physical pixels) and pixel ratio
  viewport: [f32; 4],
}

impl CameraUniform {
  pub fn new() -> Self {
    use cgmath::SquareMatrix;
    Self {
      view: cgmath::Matrix4::identity().into(),
      proj: cgmath::Matrix4::identity().into(),
      viewport: [1.0, 1.0, 1.0, 0.0],
    }
  }

  pub fn update(&mut self, camera: &Camera, viewport: &Viewport) {
    self.view = camera.view_matrix().into();
    self.proj = camera.projection_matrix().into();
    let (width, height) = viewport.surface_size();
    self.viewport = [width as f32, height as f32, viewport.pixel_ratio as f32, 0.0];
  }
}

impl Default for CameraUniform {
  fn default() -> Self {
    Self::new()
  }
}

/// Drawable area in logical pixels plus the clamped pixel ratio.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
  pub width: f64,
  pub height: f64,
  pub pixel_ratio: f64,
}

impl Viewport {
  pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
    Self {
      width,
      height,
      pixel_ratio: device_pixel_ratio.min(MAX_PIXEL_RATIO),
    }
  }

  pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
    let logical = size.to_logical::<f64>(scale_factor);
    Self::new(logical.width, logical.height, scale_factor)
  }

  pub fn aspect(&self) -> f32 {
    if self.height > 0.0 {
      (self.width / self.height) as f32
    } else {
      1.0
    }
  }

  /// Size of the render surface in physical pixels, never zero.
  pub fn surface_size(&self) -> (u32, u32) {
    let scale = |v: f64| ((v * self.pixel_ratio).round() as u32).max(1);
    (scale(self.width), scale(self.height))
  }

  /// Resizes to `width` x `height` logical pixels and updates the camera aspect.
  pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64, camera: &mut Camera) {
    *self = Viewport::new(width, height, device_pixel_ratio);
    camera.aspect = self.aspect();
    log::debug!(
      "resized to {width}x{height} at pixel ratio {}, surface {:?}",
      self.pixel_ratio,
      self.surface_size()
    );
  }
}

const MIN_POLAR: f32 = 1e-4;

/// Damped orbit controls around the camera target.
///
/// Left drag rotates, right drag pans, the wheel zooms. Input accumulates
/// deltas that [`OrbitController::update_camera`] applies a fraction of per frame.
pub struct OrbitController {
  damping_factor: f32,
  rotate_speed: f32,
  zoom_speed: f32,
  pan_speed: f32,
  min_distance: f32,
  max_distance: f32,
  delta_theta: f32,
  delta_phi: f32,
  scale: f32,
  pan_pixels: (f32, f32),
  pan_offset: Vector3<f32>,
  is_rotating: bool,
  is_panning: bool,
  cursor: Option<(f32, f32)>,
  viewport_height: f32,
}

impl OrbitController {
  pub fn init(params: &CameraParams, zfar: f32) -> Self {
    Self {
      damping_factor: params.damping_factor,
      rotate_speed: params.rotate_speed,
      zoom_speed: params.zoom_speed,
      pan_speed: params.pan_speed,
      min_distance: 0.1,
      max_distance: zfar * 0.9,
      delta_theta: 0.0,
      delta_phi: 0.0,
      scale: 1.0,
      pan_pixels: (0.0, 0.0),
      pan_offset: Vector3::new(0.0, 0.0, 0.0),
      is_rotating: false,
      is_panning: false,
      cursor: None,
      viewport_height: 1.0,
    }
  }

  pub fn set_viewport_height(&mut self, height: f32) {
    self.viewport_height = height.max(1.0);
  }

  pub fn process_events(&mut self, event: &WindowEvent) -> bool {
    match event {
      WindowEvent::MouseInput { state, button, .. } => {
        let is_pressed = *state == ElementState::Pressed;
        match button {
          MouseButton::Left => {
            self.is_rotating = is_pressed;
            true
          }
          MouseButton::Right | MouseButton::Middle => {
            self.is_panning = is_pressed;
            true
          }
          _ => false,
        }
      }
      WindowEvent::CursorMoved { position, .. } => {
        let position = (position.x as f32, position.y as f32);
        if let Some((x, y)) = self.cursor.replace(position) {
          let (dx, dy) = (position.0 - x, position.1 - y);
          if self.is_rotating {
            self.rotate(dx, dy);
          }
          if self.is_panning {
            self.pan_pixels.0 += dx;
            self.pan_pixels.1 += dy;
          }
        }
        self.is_rotating || self.is_panning
      }
      WindowEvent::CursorLeft { .. } => {
        self.cursor = None;
        false
      }
      WindowEvent::MouseWheel { delta, .. } => {
        let lines = match delta {
          MouseScrollDelta::LineDelta(_, y) => *y,
          MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
        };
        self.zoom(lines);
        true
      }
      _ => false,
    }
  }

  /// Rotates by a cursor drag of `dx`, `dy` pixels.
  pub fn rotate(&mut self, dx: f32, dy: f32) {
    self.delta_theta -= 2.0 * PI * dx / self.viewport_height * self.rotate_speed;
    self.delta_phi -= 2.0 * PI * dy / self.viewport_height * self.rotate_speed;
  }

  /// Positive `lines` zoom in.
  pub fn zoom(&mut self, lines: f32) {
    self.scale *= 0.95f32.powf(self.zoom_speed * lines);
  }

  pub fn update_camera(&mut self, camera: &mut Camera) {
    let offset = camera.eye - camera.target;
    let radius = offset.magnitude().max(self.min_distance);
    let mut theta = offset.x.atan2(offset.z);
    let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

    if self.pan_pixels != (0.0, 0.0) {
      self.pan_offset += self.screen_pan(camera, radius);
      self.pan_pixels = (0.0, 0.0);
    }

    theta += self.delta_theta * self.damping_factor;
    phi += self.delta_phi * self.damping_factor;
    phi = phi.clamp(MIN_POLAR, PI - MIN_POLAR);
    let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

    camera.target += self.pan_offset * self.damping_factor;
    camera.eye = camera.target
      + Vector3::new(
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
        radius * phi.sin() * theta.cos(),
      );

    let decay = 1.0 - self.damping_factor;
    self.delta_theta *= decay;
    self.delta_phi *= decay;
    self.pan_offset *= decay;
    self.scale = 1.0;
  }

  fn screen_pan(&self, camera: &Camera, distance: f32) -> Vector3<f32> {
    let forward = (camera.target - camera.eye).normalize();
    let right = forward.cross(camera.up).normalize();
    let up = right.cross(forward);
    let visible = distance * (camera.fovy.to_radians() / 2.0).tan();
    let per_pixel = 2.0 * visible / self.viewport_height * self.pan_speed;
    -right * self.pan_pixels.0 * per_pixel + up * self.pan_pixels.1 * per_pixel
  }
}
