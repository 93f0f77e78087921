use crate::generate::{generate, ParticleBuffer};
use crate::params::{ParamEdit, ParameterStore};
use crate::points::{PointCloudResource, PointsMaterial, SceneBackend};
use crate::{GalaxyParameters, GalaxyResult};
use rand::Rng;
use std::time::{Duration, Instant};

/// What a dispatched edit did
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatched {
  /// In-progress edit, nothing regenerated
  Pending,
  Regenerated(Regeneration),
}

/// Summary of one regeneration cycle
#[derive(Clone, Debug, PartialEq)]
pub struct Regeneration {
  pub points: usize,
  pub bounds: Option<([f32; 3], [f32; 3])>,
  pub elapsed: Duration,
}

impl Regeneration {
  fn new(buffer: &ParticleBuffer, elapsed: Duration) -> Self {
    Self {
      points: buffer.len(),
      bounds: buffer.bounds(),
      elapsed,
    }
  }
}

/// Owns the committed parameters and the installed galaxy, and turns each
/// committed edit into exactly one regeneration.
pub struct ChangeDispatcher<S: SceneBackend, R: Rng> {
  store: ParameterStore,
  points: PointCloudResource<S>,
  scene: S,
  rng: R,
}

impl<S: SceneBackend, R: Rng> ChangeDispatcher<S, R> {
  /// Validates `params` and installs the first galaxy into `scene`.
  pub fn new(params: GalaxyParameters, scene: S, rng: R) -> GalaxyResult<(Self, Regeneration)> {
    let store = ParameterStore::new(params)?;
    let mut dispatcher = Self {
      store,
      points: PointCloudResource::new(),
      scene,
      rng,
    };
    let regeneration = dispatcher.regenerate()?;
    Ok((dispatcher, regeneration))
  }

  pub fn parameters(&self) -> &GalaxyParameters {
    self.store.parameters()
  }

  pub fn scene(&self) -> &S {
    &self.scene
  }

  pub fn scene_mut(&mut self) -> &mut S {
    &mut self.scene
  }

  pub fn points(&self) -> &PointCloudResource<S> {
    &self.points
  }

  /// Applies an edit. Only committed edits regenerate; a rejected commit
  /// leaves both the stored parameters and the installed galaxy untouched.
  pub fn dispatch(&mut self, edit: ParamEdit) -> GalaxyResult<Dispatched> {
    match edit {
      ParamEdit::Changing { field, value } => {
        log::trace!("editing {field} = {value}");
        Ok(Dispatched::Pending)
      }
      ParamEdit::Committed { field, value } => {
        let candidate = self.store.with_edit(field, value).map_err(|err| {
          log::warn!("rejected {field} = {value}: {err}");
          err
        })?;
        let regeneration = self.install(&candidate)?;
        self.store.commit(candidate);
        log::info!("{field} = {value}");
        Ok(Dispatched::Regenerated(regeneration))
      }
    }
  }

  /// Regenerates from the current parameters with fresh randomness.
  pub fn regenerate(&mut self) -> GalaxyResult<Regeneration> {
    let params = *self.store.parameters();
    self.install(&params)
  }

  fn install(&mut self, params: &GalaxyParameters) -> GalaxyResult<Regeneration> {
    let start = Instant::now();
    let buffer = generate(params, &mut self.rng)?;
    self
      .points
      .install(&mut self.scene, &buffer, PointsMaterial::galaxy(params.size));
    let regeneration = Regeneration::new(&buffer, start.elapsed());
    log::info!(
      "generated {} points in {:.1?}",
      regeneration.points,
      regeneration.elapsed
    );
    Ok(regeneration)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::{ParamField, ParamValue};
  use crate::points::HeadlessScene;
  use crate::GalaxyError;
  use rand::{rngs::SmallRng, SeedableRng};

  fn dispatcher() -> ChangeDispatcher<HeadlessScene, SmallRng> {
    let params = GalaxyParameters {
      count: 100,
      ..GalaxyParameters::default()
    };
    ChangeDispatcher::new(params, HeadlessScene::new(), SmallRng::seed_from_u64(1))
      .unwrap()
      .0
  }

  #[test]
  fn startup_installs_one_galaxy() {
    let d = dispatcher();
    assert!(d.points().is_installed());
    assert_eq!(d.scene().attached_points(), vec![100]);
  }

  #[test]
  fn changing_never_regenerates() {
    let mut d = dispatcher();
    for count in 200..260 {
      let outcome = d
        .dispatch(ParamEdit::Changing {
          field: ParamField::Count,
          value: ParamValue::Int(count),
        })
        .unwrap();
      assert_eq!(outcome, Dispatched::Pending);
    }
    assert_eq!(d.points().installs(), 1);
    assert_eq!(d.parameters().count, 100);
  }

  #[test]
  fn each_commit_regenerates_once() {
    let mut d = dispatcher();
    let outcome = d
      .dispatch(ParamEdit::Committed {
        field: ParamField::Count,
        value: ParamValue::Int(250),
      })
      .unwrap();
    match outcome {
      Dispatched::Regenerated(r) => assert_eq!(r.points, 250),
      other => panic!("expected a regeneration, got {other:?}"),
    }
    assert_eq!(d.points().installs(), 2);
    assert_eq!(d.parameters().count, 250);
    assert_eq!(d.scene().attached_points(), vec![250]);
  }

  #[test]
  fn rejected_commit_keeps_the_previous_galaxy() {
    let mut d = dispatcher();
    let events_before = d.scene().events().len();
    let err = d
      .dispatch(ParamEdit::Committed {
        field: ParamField::Branches,
        value: ParamValue::Int(0),
      })
      .unwrap_err();
    assert!(matches!(err, GalaxyError::InvalidParameter { .. }));
    assert_eq!(d.scene().events().len(), events_before);
    assert_eq!(d.parameters().branches, 2);
    assert_eq!(d.points().installs(), 1);
  }

  #[test]
  fn invalid_startup_parameters_fail() {
    let params = GalaxyParameters {
      branches: 0,
      ..GalaxyParameters::default()
    };
    assert!(ChangeDispatcher::new(params, HeadlessScene::new(), SmallRng::seed_from_u64(1)).is_err());
  }

  #[test]
  fn size_commit_rebuilds_the_material() {
    let mut d = dispatcher();
    d.dispatch(ParamEdit::Committed {
      field: ParamField::Size,
      value: ParamValue::Float(0.05),
    })
    .unwrap();
    assert_eq!(d.scene().attached_material().map(|m| m.size), Some(0.05));
  }
}
