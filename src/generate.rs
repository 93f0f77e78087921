use crate::{GalaxyError, GalaxyParameters, GalaxyResult};
use rand::Rng;
use std::f32::consts::TAU;

/// Positions and colors of one generated galaxy.
///
/// Particle `i` occupies `[3i, 3i + 2]` in both vectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffer {
  pub positions: Vec<f32>,
  pub colors: Vec<f32>,
}

impl ParticleBuffer {
  pub fn len(&self) -> usize {
    self.positions.len() / 3
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn position(&self, i: usize) -> [f32; 3] {
    let i3 = i * 3;
    [self.positions[i3], self.positions[i3 + 1], self.positions[i3 + 2]]
  }

  pub fn color(&self, i: usize) -> [f32; 3] {
    let i3 = i * 3;
    [self.colors[i3], self.colors[i3 + 1], self.colors[i3 + 2]]
  }

  /// Axis-aligned bounds as `(min, max)`, `None` for an empty buffer.
  pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
    if self.is_empty() {
      return None;
    }
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in self.positions.chunks_exact(3) {
      for axis in 0..3 {
        min[axis] = min[axis].min(p[axis]);
        max[axis] = max[axis].max(p[axis]);
      }
    }
    Some((min, max))
  }
}

/// Checks the preconditions the generator itself depends on.
pub fn check_parameters(params: &GalaxyParameters) -> GalaxyResult<()> {
  if params.branches < 1 {
    return Err(GalaxyError::invalid("branches", "at least one branch is required"));
  }
  if !(params.radius >= 0.0 && params.radius.is_finite()) {
    return Err(GalaxyError::invalid(
      "radius",
      format!("must be a non-negative number, got {}", params.radius),
    ));
  }
  Ok(())
}

/// Samples a spiral galaxy of `params.count` particles.
pub fn generate(params: &GalaxyParameters, rng: &mut impl Rng) -> GalaxyResult<ParticleBuffer> {
  check_parameters(params)?;

  let count = params.count as usize;
  let mut positions = Vec::with_capacity(count * 3);
  let mut colors = Vec::with_capacity(count * 3);

  for i in 0..count {
    let radius = rng.gen::<f32>() * params.radius;
    let spin_angle = radius * params.spin;
    let branch_angle = (i as u32 % params.branches) as f32 / params.branches as f32 * TAU;

    let offset_x = jitter(rng, params, radius);
    let offset_y = jitter(rng, params, radius);
    let offset_z = jitter(rng, params, radius);

    let angle = branch_angle + spin_angle;
    positions.extend_from_slice(&[
      angle.cos() * radius + offset_x,
      offset_y,
      angle.sin() * radius + offset_z,
    ]);

    let t = if params.radius > 0.0 {
      (radius / params.radius).clamp(0.0, 1.0)
    } else {
      0.0
    };
    let color = params.inside_color.lerp(params.outside_color, t);
    colors.extend_from_slice(&color.to_array());
  }

  Ok(ParticleBuffer { positions, colors })
}

fn jitter(rng: &mut impl Rng, params: &GalaxyParameters, radius: f32) -> f32 {
  let magnitude = rng.gen::<f32>().powf(params.randomness_power);
  let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
  magnitude * sign * params.randomness * radius
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Rgb;
  use proptest::prelude::*;
  use rand::{rngs::SmallRng, SeedableRng};
  use std::f32::consts::PI;

  fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
  }

  fn flat(count: u32, branches: u32) -> GalaxyParameters {
    GalaxyParameters {
      count,
      branches,
      radius: 1.0,
      spin: 0.0,
      randomness: 0.0,
      ..GalaxyParameters::default()
    }
  }

  #[test]
  fn buffers_hold_three_floats_per_particle() {
    let params = GalaxyParameters::default();
    let buffer = generate(&params, &mut rng()).unwrap();
    assert_eq!(buffer.positions.len(), 3 * params.count as usize);
    assert_eq!(buffer.colors.len(), 3 * params.count as usize);
    assert_eq!(buffer.len(), params.count as usize);
  }

  #[test]
  fn zero_count_is_empty() {
    let buffer = generate(&flat(0, 3), &mut rng()).unwrap();
    assert!(buffer.is_empty());
    assert!(buffer.colors.is_empty());
    assert_eq!(buffer.bounds(), None);
  }

  #[test]
  fn rejects_zero_branches() {
    let err = generate(&flat(10, 0), &mut rng()).unwrap_err();
    assert!(matches!(
      err,
      GalaxyError::InvalidParameter {
        field: "branches",
        ..
      }
    ));
  }

  #[test]
  fn rejects_negative_radius() {
    let params = GalaxyParameters {
      radius: -1.0,
      ..GalaxyParameters::default()
    };
    assert!(generate(&params, &mut rng()).is_err());
    let params = GalaxyParameters {
      radius: f32::NAN,
      ..GalaxyParameters::default()
    };
    assert!(generate(&params, &mut rng()).is_err());
  }

  #[test]
  fn same_seed_same_galaxy() {
    let params = GalaxyParameters::default();
    let a = generate(&params, &mut SmallRng::seed_from_u64(7)).unwrap();
    let b = generate(&params, &mut SmallRng::seed_from_u64(7)).unwrap();
    let c = generate(&params, &mut SmallRng::seed_from_u64(8)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn arms_are_assigned_round_robin() {
    let buffer = generate(&flat(4, 2), &mut rng()).unwrap();
    for i in 0..4 {
      let [x, y, z] = buffer.position(i);
      assert_eq!(y, 0.0);
      assert!(z.abs() < 1e-5, "particle {i} left the x axis: z = {z}");
      assert!(x.abs() > 0.0 && x.abs() < 1.0, "particle {i} outside the radius: x = {x}");
      if i % 2 == 0 {
        assert!(x > 0.0, "particle {i} should sit on the branch at angle 0");
      } else {
        assert!(x < 0.0, "particle {i} should sit on the branch at angle pi");
      }
    }
    let [even, _, _] = buffer.position(0);
    let [odd, _, _] = buffer.position(1);
    assert!(even * odd < 0.0, "first two particles share a side: {even} {odd}");
  }

  #[test]
  fn without_randomness_points_lie_on_the_spiral() {
    let params = GalaxyParameters {
      count: 500,
      branches: 5,
      spin: 1.5,
      randomness: 0.0,
      ..GalaxyParameters::default()
    };
    let buffer = generate(&params, &mut rng()).unwrap();
    for i in 0..buffer.len() {
      let [x, y, z] = buffer.position(i);
      let radius = (x * x + z * z).sqrt();
      let branch_angle = (i as u32 % params.branches) as f32 / params.branches as f32 * 2.0 * PI;
      let angle = branch_angle + radius * params.spin;
      assert_eq!(y, 0.0);
      assert!((x - angle.cos() * radius).abs() < 1e-4);
      assert!((z - angle.sin() * radius).abs() < 1e-4);
    }
  }

  #[test]
  fn zero_radius_collapses_to_inside_color() {
    let params = GalaxyParameters {
      count: 10,
      radius: 0.0,
      ..GalaxyParameters::default()
    };
    let buffer = generate(&params, &mut rng()).unwrap();
    for i in 0..buffer.len() {
      assert_eq!(buffer.position(i), [0.0, 0.0, 0.0]);
      assert_eq!(buffer.color(i), params.inside_color.to_array());
    }
  }

  #[test]
  fn jitter_grows_with_randomness() {
    let spread = |randomness: f32| {
      let params = GalaxyParameters {
        count: 2000,
        randomness,
        randomness_power: 1.0,
        ..GalaxyParameters::default()
      };
      let buffer = generate(&params, &mut rng()).unwrap();
      let (min, max) = buffer.bounds().unwrap();
      max[1] - min[1]
    };
    assert_eq!(spread(0.0), 0.0);
    assert!(spread(1.0) > spread(0.1));
  }

  fn channel_between(value: f32, a: f32, b: f32) -> bool {
    let eps = 1e-6;
    value >= a.min(b) - eps && value <= a.max(b) + eps
  }

  proptest! {
    #[test]
    fn lengths_match_count(count in 0u32..2000, branches in 1u32..30, seed in any::<u64>()) {
      let params = GalaxyParameters { count, branches, ..GalaxyParameters::default() };
      let buffer = generate(&params, &mut SmallRng::seed_from_u64(seed)).unwrap();
      prop_assert_eq!(buffer.positions.len(), 3 * count as usize);
      prop_assert_eq!(buffer.colors.len(), 3 * count as usize);
    }

    #[test]
    fn colors_are_convex_combinations(
      inside in (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0),
      outside in (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0),
      radius in 0.001f32..30.0,
      seed in any::<u64>(),
    ) {
      let inside = Rgb::new(inside.0, inside.1, inside.2);
      let outside = Rgb::new(outside.0, outside.1, outside.2);
      let params = GalaxyParameters {
        count: 300,
        radius,
        inside_color: inside,
        outside_color: outside,
        ..GalaxyParameters::default()
      };
      let buffer = generate(&params, &mut SmallRng::seed_from_u64(seed)).unwrap();
      for i in 0..buffer.len() {
        let [r, g, b] = buffer.color(i);
        prop_assert!(channel_between(r, inside.r, outside.r));
        prop_assert!(channel_between(g, inside.g, outside.g));
        prop_assert!(channel_between(b, inside.b, outside.b));
      }
    }
  }
}
