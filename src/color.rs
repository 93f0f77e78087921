use crate::error::GalaxyError;
use std::fmt;
use std::str::FromStr;

/// Linear RGB color with channels in `[0, 1]`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgb {
  pub r: f32,
  pub g: f32,
  pub b: f32,
}

impl Rgb {
  pub const fn new(r: f32, g: f32, b: f32) -> Self {
    Self { r, g, b }
  }

  pub fn from_hex(hex: u32) -> Self {
    Self {
      r: ((hex >> 16) & 0xff) as f32 / 255.0,
      g: ((hex >> 8) & 0xff) as f32 / 255.0,
      b: (hex & 0xff) as f32 / 255.0,
    }
  }

  /// Interpolates each channel from `self` towards `other`.
  ///
  /// `t` is not clamped here; callers pass a normalized factor.
  #[must_use]
  pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
    Rgb {
      r: self.r + (other.r - self.r) * t,
      g: self.g + (other.g - self.g) * t,
      b: self.b + (other.b - self.b) * t,
    }
  }

  pub fn to_array(self) -> [f32; 3] {
    [self.r, self.g, self.b]
  }

  pub fn is_normalized(self) -> bool {
    self
      .to_array()
      .iter()
      .all(|c| (0.0..=1.0).contains(c))
  }

  /// Rotates the hue by `degrees`, keeping saturation and value.
  #[must_use]
  pub fn rotate_hue(self, degrees: f32) -> Rgb {
    self.adjust_hsv(degrees, 0.0, 0.0)
  }

  /// Shifts hue by `degrees` and adds `saturation` and `value`, both clamped to `[0, 1]`.
  ///
  /// A grey has hue 0, so raising its saturation tints it red.
  #[must_use]
  pub fn adjust_hsv(self, degrees: f32, saturation: f32, value: f32) -> Rgb {
    let (h, s, v) = self.to_hsv();
    Rgb::from_hsv(
      (h + degrees).rem_euclid(360.0),
      (s + saturation).clamp(0.0, 1.0),
      (v + value).clamp(0.0, 1.0),
    )
  }

  fn to_hsv(self) -> (f32, f32, f32) {
    let max = self.r.max(self.g).max(self.b);
    let min = self.r.min(self.g).min(self.b);
    let delta = max - min;
    let h = if delta == 0.0 {
      0.0
    } else if max == self.r {
      60.0 * ((self.g - self.b) / delta).rem_euclid(6.0)
    } else if max == self.g {
      60.0 * ((self.b - self.r) / delta + 2.0)
    } else {
      60.0 * ((self.r - self.g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };
    (h, s, max)
  }

  fn from_hsv(h: f32, s: f32, v: f32) -> Rgb {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (h / 60.0) as u32 {
      0 => (c, x, 0.0),
      1 => (x, c, 0.0),
      2 => (0.0, c, x),
      3 => (0.0, x, c),
      4 => (x, 0.0, c),
      _ => (c, 0.0, x),
    };
    Rgb::new(
      (r + m).clamp(0.0, 1.0),
      (g + m).clamp(0.0, 1.0),
      (b + m).clamp(0.0, 1.0),
    )
  }
}

impl FromStr for Rgb {
  type Err = GalaxyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
      return Err(GalaxyError::InvalidColor(s.to_string()));
    }
    u32::from_str_radix(digits, 16)
      .map(Rgb::from_hex)
      .map_err(|_| GalaxyError::InvalidColor(s.to_string()))
  }
}

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    write!(
      f,
      "#{:02x}{:02x}{:02x}",
      to_byte(self.r),
      to_byte(self.g),
      to_byte(self.b)
    )
  }
}
