use crate::generate::ParticleBuffer;
use std::collections::HashMap;

/// How overlapping points combine with what is already drawn
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Blending {
  Normal,
  Additive,
}

/// Point material settings for a galaxy
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointsMaterial {
  pub size: f32,
  /// Shrink points with distance from the camera
  pub size_attenuation: bool,
  pub depth_write: bool,
  pub blending: Blending,
  pub vertex_colors: bool,
}

impl PointsMaterial {
  pub fn galaxy(size: f32) -> Self {
    Self {
      size,
      size_attenuation: true,
      depth_write: false,
      blending: Blending::Additive,
      vertex_colors: true,
    }
  }
}

/// A scene graph that can hold point clouds.
///
/// Releasing a resource twice or removing an unknown object violates the
/// ownership contract of [`PointCloudResource`] and implementations may panic.
pub trait SceneBackend {
  type Geometry;
  type Material;
  type Object;

  fn create_geometry(&mut self, buffer: &ParticleBuffer) -> Self::Geometry;
  fn create_material(&mut self, material: &PointsMaterial) -> Self::Material;
  fn release_geometry(&mut self, geometry: &Self::Geometry);
  fn release_material(&mut self, material: &Self::Material);
  fn add_points(&mut self, geometry: &Self::Geometry, material: &Self::Material) -> Self::Object;
  fn remove(&mut self, object: Self::Object);
}

struct Installed<S: SceneBackend> {
  geometry: S::Geometry,
  material: S::Material,
  object: S::Object,
}

/// Owns the single galaxy currently attached to a scene.
pub struct PointCloudResource<S: SceneBackend> {
  installed: Option<Installed<S>>,
  installs: u64,
}

impl<S: SceneBackend> Default for PointCloudResource<S> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S: SceneBackend> PointCloudResource<S> {
  pub fn new() -> Self {
    Self {
      installed: None,
      installs: 0,
    }
  }

  pub fn is_installed(&self) -> bool {
    self.installed.is_some()
  }

  /// Number of galaxies installed over the lifetime of this resource
  pub fn installs(&self) -> u64 {
    self.installs
  }

  pub fn object(&self) -> Option<&S::Object> {
    self.installed.as_ref().map(|installed| &installed.object)
  }

  /// Replaces the attached galaxy with one built from `buffer`.
  ///
  /// The previous geometry and material are released and its object is
  /// removed from the scene before anything new is created.
  pub fn install(&mut self, scene: &mut S, buffer: &ParticleBuffer, material: PointsMaterial) {
    self.release(scene);

    let geometry = scene.create_geometry(buffer);
    let material = scene.create_material(&material);
    let object = scene.add_points(&geometry, &material);
    self.installed = Some(Installed {
      geometry,
      material,
      object,
    });
    self.installs += 1;
    log::debug!("installed galaxy #{} with {} points", self.installs, buffer.len());
  }

  /// Detaches and releases the current galaxy, if any.
  pub fn release(&mut self, scene: &mut S) {
    if let Some(old) = self.installed.take() {
      scene.release_geometry(&old.geometry);
      scene.release_material(&old.material);
      scene.remove(old.object);
      log::debug!("released galaxy #{}", self.installs);
    }
  }
}

/// Scene graph kept in host memory.
///
/// Tracks every resource it hands out so leaks and double releases are
/// observable without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessScene {
  next_id: u64,
  live_geometries: HashMap<u64, usize>,
  live_materials: HashMap<u64, PointsMaterial>,
  attached: HashMap<u64, (u64, u64)>,
  released: u64,
  log: Vec<SceneEvent>,
}

/// One call made against a [`HeadlessScene`], in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
  CreateGeometry(u64),
  CreateMaterial(u64),
  ReleaseGeometry(u64),
  ReleaseMaterial(u64),
  Attach(u64),
  Remove(u64),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessGeometry(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessMaterial(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessObject(u64);

impl HeadlessScene {
  pub fn new() -> Self {
    Self::default()
  }

  fn next(&mut self) -> u64 {
    self.next_id += 1;
    self.next_id
  }

  pub fn attached_count(&self) -> usize {
    self.attached.len()
  }

  pub fn live_geometries(&self) -> usize {
    self.live_geometries.len()
  }

  pub fn live_materials(&self) -> usize {
    self.live_materials.len()
  }

  /// Total geometries and materials released so far
  pub fn released(&self) -> u64 {
    self.released
  }

  /// Point count of each attached object's geometry
  pub fn attached_points(&self) -> Vec<usize> {
    self
      .attached
      .values()
      .filter_map(|(geometry, _)| self.live_geometries.get(geometry).copied())
      .collect()
  }

  pub fn attached_material(&self) -> Option<PointsMaterial> {
    self
      .attached
      .values()
      .next()
      .and_then(|(_, material)| self.live_materials.get(material).copied())
  }

  pub fn events(&self) -> &[SceneEvent] {
    &self.log
  }
}

impl SceneBackend for HeadlessScene {
  type Geometry = HeadlessGeometry;
  type Material = HeadlessMaterial;
  type Object = HeadlessObject;

  fn create_geometry(&mut self, buffer: &ParticleBuffer) -> HeadlessGeometry {
    let id = self.next();
    self.live_geometries.insert(id, buffer.len());
    self.log.push(SceneEvent::CreateGeometry(id));
    HeadlessGeometry(id)
  }

  fn create_material(&mut self, material: &PointsMaterial) -> HeadlessMaterial {
    let id = self.next();
    self.live_materials.insert(id, *material);
    self.log.push(SceneEvent::CreateMaterial(id));
    HeadlessMaterial(id)
  }

  fn release_geometry(&mut self, geometry: &HeadlessGeometry) {
    assert!(
      self.live_geometries.remove(&geometry.0).is_some(),
      "geometry {} released twice",
      geometry.0
    );
    self.released += 1;
    self.log.push(SceneEvent::ReleaseGeometry(geometry.0));
  }

  fn release_material(&mut self, material: &HeadlessMaterial) {
    assert!(
      self.live_materials.remove(&material.0).is_some(),
      "material {} released twice",
      material.0
    );
    self.released += 1;
    self.log.push(SceneEvent::ReleaseMaterial(material.0));
  }

  fn add_points(&mut self, geometry: &HeadlessGeometry, material: &HeadlessMaterial) -> HeadlessObject {
    let id = self.next();
    self.attached.insert(id, (geometry.0, material.0));
    self.log.push(SceneEvent::Attach(id));
    HeadlessObject(id)
  }

  fn remove(&mut self, object: HeadlessObject) {
    assert!(
      self.attached.remove(&object.0).is_some(),
      "object {} is not in the scene",
      object.0
    );
    self.log.push(SceneEvent::Remove(object.0));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn buffer(points: usize) -> ParticleBuffer {
    ParticleBuffer {
      positions: vec![0.5; points * 3],
      colors: vec![1.0; points * 3],
    }
  }

  #[test]
  fn starts_empty() {
    let resource = PointCloudResource::<HeadlessScene>::new();
    assert!(!resource.is_installed());
    assert!(resource.object().is_none());
  }

  #[test]
  fn empty_buffer_still_installs_a_galaxy() {
    let mut scene = HeadlessScene::new();
    let mut resource = PointCloudResource::new();
    resource.install(&mut scene, &buffer(0), PointsMaterial::galaxy(0.02));
    assert!(resource.is_installed());
    assert_eq!(scene.attached_points(), vec![0]);
  }

  #[test]
  fn old_galaxy_is_released_before_the_new_one_is_built() {
    let mut scene = HeadlessScene::new();
    let mut resource = PointCloudResource::new();
    resource.install(&mut scene, &buffer(3), PointsMaterial::galaxy(0.02));
    resource.install(&mut scene, &buffer(5), PointsMaterial::galaxy(0.05));

    use SceneEvent::*;
    assert_eq!(
      scene.events(),
      &[
        CreateGeometry(1),
        CreateMaterial(2),
        Attach(3),
        ReleaseGeometry(1),
        ReleaseMaterial(2),
        Remove(3),
        CreateGeometry(4),
        CreateMaterial(5),
        Attach(6),
      ]
    );
    assert_eq!(scene.attached_points(), vec![5]);
    assert_eq!(scene.attached_material().map(|m| m.size), Some(0.05));
  }

  #[test]
  fn repeated_installs_keep_one_galaxy() {
    let mut scene = HeadlessScene::new();
    let mut resource = PointCloudResource::new();
    for n in 0..10 {
      resource.install(&mut scene, &buffer(n), PointsMaterial::galaxy(0.02));
    }
    assert_eq!(scene.attached_count(), 1);
    assert_eq!(scene.live_geometries(), 1);
    assert_eq!(scene.live_materials(), 1);
    assert_eq!(scene.released(), 18);
    assert_eq!(resource.installs(), 10);
  }

  #[test]
  fn release_empties_the_scene() {
    let mut scene = HeadlessScene::new();
    let mut resource = PointCloudResource::new();
    resource.install(&mut scene, &buffer(2), PointsMaterial::galaxy(0.02));
    resource.release(&mut scene);
    resource.release(&mut scene);
    assert!(!resource.is_installed());
    assert_eq!(scene.attached_count(), 0);
    assert_eq!(scene.live_geometries(), 0);
  }

  #[test]
  #[should_panic(expected = "released twice")]
  fn double_release_is_a_bug() {
    let mut scene = HeadlessScene::new();
    let geometry = scene.create_geometry(&buffer(1));
    scene.release_geometry(&geometry);
    scene.release_geometry(&geometry);
  }

  #[test]
  fn galaxy_material_blends_additively_without_depth_writes() {
    let material = PointsMaterial::galaxy(0.02);
    assert!(material.size_attenuation);
    assert!(!material.depth_write);
    assert_eq!(material.blending, Blending::Additive);
    assert!(material.vertex_colors);
  }
}
