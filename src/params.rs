use crate::generate::check_parameters;
use crate::{GalaxyError, GalaxyParameters, GalaxyResult, Rgb};
use std::fmt;
use std::str::FromStr;

/// Editable fields of [`GalaxyParameters`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamField {
  Count,
  Size,
  Radius,
  Branches,
  Spin,
  Randomness,
  RandomnessPower,
  InsideColor,
  OutsideColor,
}

/// Slider bounds of a numeric field
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SliderRange {
  pub min: f64,
  pub max: f64,
  pub step: f64,
}

impl SliderRange {
  const fn new(min: f64, max: f64, step: f64) -> Self {
    Self { min, max, step }
  }

  pub fn contains(&self, value: f64) -> bool {
    value >= self.min && value <= self.max
  }

  /// Bounds check in single precision, so `0.1f32` is inside `[0.001, 0.1]`.
  pub fn contains_f32(&self, value: f32) -> bool {
    value >= self.min as f32 && value <= self.max as f32
  }

  /// Snaps `value` onto the step grid and into bounds.
  pub fn snap(&self, value: f64) -> f64 {
    let steps = ((value - self.min) / self.step).round();
    (self.min + steps * self.step).clamp(self.min, self.max)
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParamValue {
  Int(u32),
  Float(f32),
  Color(Rgb),
}

impl fmt::Display for ParamValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParamValue::Int(v) => write!(f, "{v}"),
      ParamValue::Float(v) => write!(f, "{v:.4}"),
      ParamValue::Color(c) => write!(f, "{c}"),
    }
  }
}

/// A parameter change coming from an editor
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParamEdit {
  /// Live value while the user is still dragging; never regenerates
  Changing { field: ParamField, value: ParamValue },
  Committed { field: ParamField, value: ParamValue },
}

impl ParamEdit {
  pub fn field(&self) -> ParamField {
    match self {
      ParamEdit::Changing { field, .. } | ParamEdit::Committed { field, .. } => *field,
    }
  }
}

impl ParamField {
  pub const ALL: [ParamField; 9] = [
    ParamField::Count,
    ParamField::Size,
    ParamField::Radius,
    ParamField::Branches,
    ParamField::Spin,
    ParamField::Randomness,
    ParamField::RandomnessPower,
    ParamField::InsideColor,
    ParamField::OutsideColor,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      ParamField::Count => "count",
      ParamField::Size => "size",
      ParamField::Radius => "radius",
      ParamField::Branches => "branches",
      ParamField::Spin => "spin",
      ParamField::Randomness => "randomness",
      ParamField::RandomnessPower => "randomness-power",
      ParamField::InsideColor => "inside-color",
      ParamField::OutsideColor => "outside-color",
    }
  }

  /// Editor bounds, `None` for color fields.
  pub fn range(&self) -> Option<SliderRange> {
    match self {
      ParamField::Count => Some(SliderRange::new(1.0, 1_000_000.0, 1.0)),
      ParamField::Size => Some(SliderRange::new(0.001, 0.1, 0.0001)),
      ParamField::Radius => Some(SliderRange::new(0.001, 30.0, 0.001)),
      ParamField::Branches => Some(SliderRange::new(1.0, 30.0, 1.0)),
      ParamField::Spin => Some(SliderRange::new(-10.0, 10.0, 0.0001)),
      ParamField::Randomness => Some(SliderRange::new(0.0, 2.0, 0.00001)),
      ParamField::RandomnessPower => Some(SliderRange::new(0.0, 10.0, 0.000001)),
      ParamField::InsideColor | ParamField::OutsideColor => None,
    }
  }

  pub fn get(&self, params: &GalaxyParameters) -> ParamValue {
    match self {
      ParamField::Count => ParamValue::Int(params.count),
      ParamField::Size => ParamValue::Float(params.size),
      ParamField::Radius => ParamValue::Float(params.radius),
      ParamField::Branches => ParamValue::Int(params.branches),
      ParamField::Spin => ParamValue::Float(params.spin),
      ParamField::Randomness => ParamValue::Float(params.randomness),
      ParamField::RandomnessPower => ParamValue::Float(params.randomness_power),
      ParamField::InsideColor => ParamValue::Color(params.inside_color),
      ParamField::OutsideColor => ParamValue::Color(params.outside_color),
    }
  }

  /// Writes `value` into `params` without range checks.
  pub fn set(&self, params: &mut GalaxyParameters, value: ParamValue) -> GalaxyResult<()> {
    match (self, value) {
      (ParamField::Count, ParamValue::Int(v)) => params.count = v,
      (ParamField::Branches, ParamValue::Int(v)) => params.branches = v,
      (ParamField::Size, ParamValue::Float(v)) => params.size = v,
      (ParamField::Radius, ParamValue::Float(v)) => params.radius = v,
      (ParamField::Spin, ParamValue::Float(v)) => params.spin = v,
      (ParamField::Randomness, ParamValue::Float(v)) => params.randomness = v,
      (ParamField::RandomnessPower, ParamValue::Float(v)) => params.randomness_power = v,
      (ParamField::InsideColor, ParamValue::Color(c)) => params.inside_color = c,
      (ParamField::OutsideColor, ParamValue::Color(c)) => params.outside_color = c,
      (field, value) => {
        return Err(GalaxyError::InvalidValue {
          field: field.name(),
          value: value.to_string(),
        })
      }
    }
    Ok(())
  }

  /// Parses a value of this field's kind.
  pub fn parse_value(&self, s: &str) -> GalaxyResult<ParamValue> {
    let invalid = || GalaxyError::InvalidValue {
      field: self.name(),
      value: s.to_string(),
    };
    match self {
      ParamField::Count | ParamField::Branches => {
        s.trim().parse().map(ParamValue::Int).map_err(|_| invalid())
      }
      ParamField::InsideColor | ParamField::OutsideColor => s.trim().parse().map(ParamValue::Color),
      _ => s.trim().parse().map(ParamValue::Float).map_err(|_| invalid()),
    }
  }
}

impl fmt::Display for ParamField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for ParamField {
  type Err = GalaxyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
    let normalized = match normalized.as_str() {
      "randomnesspower" => "randomness-power",
      "insidecolor" => "inside-color",
      "outsidecolor" => "outside-color",
      other => other,
    };
    ParamField::ALL
      .into_iter()
      .find(|field| field.name() == normalized)
      .ok_or_else(|| GalaxyError::UnknownField(s.to_string()))
  }
}

/// Parses `field=value` into a committed edit.
pub fn parse_commit(s: &str) -> GalaxyResult<ParamEdit> {
  let (field, value) = s
    .split_once('=')
    .ok_or_else(|| GalaxyError::UnknownField(s.to_string()))?;
  let field: ParamField = field.parse()?;
  let value = field.parse_value(value)?;
  Ok(ParamEdit::Committed { field, value })
}

/// Checks every field against its editor bounds.
pub fn validate(params: &GalaxyParameters) -> GalaxyResult<()> {
  check_parameters(params)?;
  for field in ParamField::ALL {
    match (field.get(params), field.range()) {
      (ParamValue::Int(v), Some(range)) if !range.contains(f64::from(v)) => {
        return Err(out_of_range(field, v, range));
      }
      (ParamValue::Float(v), Some(range)) if !range.contains_f32(v) => {
        return Err(out_of_range(field, v, range));
      }
      (ParamValue::Color(c), _) if !c.is_normalized() => {
        return Err(GalaxyError::invalid(
          field.name(),
          format!("color channels must lie in [0, 1], got {c:?}"),
        ));
      }
      _ => {}
    }
  }
  Ok(())
}

fn out_of_range(field: ParamField, value: impl fmt::Display, range: SliderRange) -> GalaxyError {
  GalaxyError::invalid(
    field.name(),
    format!("{value} is outside [{}, {}]", range.min, range.max),
  )
}

/// Last committed galaxy parameters
#[derive(Clone, Debug)]
pub struct ParameterStore {
  params: GalaxyParameters,
}

impl ParameterStore {
  pub fn new(params: GalaxyParameters) -> GalaxyResult<Self> {
    validate(&params)?;
    Ok(Self { params })
  }

  pub fn parameters(&self) -> &GalaxyParameters {
    &self.params
  }

  /// The parameters that would result from `field = value`, validated but not stored.
  pub fn with_edit(&self, field: ParamField, value: ParamValue) -> GalaxyResult<GalaxyParameters> {
    let mut candidate = self.params;
    field.set(&mut candidate, value)?;
    validate(&candidate)?;
    Ok(candidate)
  }

  pub fn commit(&mut self, params: GalaxyParameters) {
    self.params = params;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    assert!(ParameterStore::new(GalaxyParameters::default()).is_ok());
  }

  #[test]
  fn zero_branches_are_rejected_at_the_boundary() {
    let store = ParameterStore::new(GalaxyParameters::default()).unwrap();
    let err = store
      .with_edit(ParamField::Branches, ParamValue::Int(0))
      .unwrap_err();
    assert!(matches!(
      err,
      GalaxyError::InvalidParameter {
        field: "branches",
        ..
      }
    ));
    assert_eq!(store.parameters().branches, 2);
  }

  #[test]
  fn out_of_range_values_are_rejected() {
    let store = ParameterStore::new(GalaxyParameters::default()).unwrap();
    assert!(store.with_edit(ParamField::Count, ParamValue::Int(0)).is_err());
    assert!(store
      .with_edit(ParamField::Count, ParamValue::Int(1_000_001))
      .is_err());
    assert!(store.with_edit(ParamField::Spin, ParamValue::Float(10.5)).is_err());
    assert!(store
      .with_edit(ParamField::Size, ParamValue::Float(f32::NAN))
      .is_err());
    assert!(store
      .with_edit(ParamField::InsideColor, ParamValue::Color(Rgb::new(1.5, 0.0, 0.0)))
      .is_err());
  }

  #[test]
  fn slider_bounds_are_inclusive() {
    let store = ParameterStore::new(GalaxyParameters::default()).unwrap();
    for field in ParamField::ALL {
      let Some(range) = field.range() else {
        continue;
      };
      for bound in [range.min, range.max] {
        let value = match field.get(store.parameters()) {
          ParamValue::Int(_) => ParamValue::Int(bound as u32),
          _ => ParamValue::Float(bound as f32),
        };
        let committed = store.with_edit(field, value);
        assert!(committed.is_ok(), "{field} = {value}: {committed:?}");
      }
    }
  }

  #[test]
  fn largest_point_size_is_a_valid_start() {
    let params = GalaxyParameters {
      size: 0.1,
      ..GalaxyParameters::default()
    };
    assert!(ParameterStore::new(params).is_ok());
    assert!(ParameterStore::new(GalaxyParameters {
      size: 0.1001,
      ..params
    })
    .is_err());
  }

  #[test]
  fn mismatched_value_kind_is_rejected() {
    let store = ParameterStore::new(GalaxyParameters::default()).unwrap();
    assert!(matches!(
      store.with_edit(ParamField::Radius, ParamValue::Int(3)),
      Err(GalaxyError::InvalidValue { field: "radius", .. })
    ));
  }

  #[test]
  fn with_edit_does_not_commit() {
    let mut store = ParameterStore::new(GalaxyParameters::default()).unwrap();
    let candidate = store
      .with_edit(ParamField::Radius, ParamValue::Float(12.0))
      .unwrap();
    assert_eq!(store.parameters().radius, 5.0);
    store.commit(candidate);
    assert_eq!(store.parameters().radius, 12.0);
  }

  #[test]
  fn fields_round_trip_through_names() {
    for field in ParamField::ALL {
      assert_eq!(field.name().parse::<ParamField>().unwrap(), field);
    }
    assert_eq!(
      "randomnessPower".parse::<ParamField>().unwrap(),
      ParamField::RandomnessPower
    );
    assert_eq!(
      "inside_color".parse::<ParamField>().unwrap(),
      ParamField::InsideColor
    );
    assert!("arms".parse::<ParamField>().is_err());
  }

  #[test]
  fn parses_commits_from_the_command_line() {
    assert_eq!(
      parse_commit("branches=5").unwrap(),
      ParamEdit::Committed {
        field: ParamField::Branches,
        value: ParamValue::Int(5)
      }
    );
    assert_eq!(
      parse_commit("outside-color=#1b3984").unwrap(),
      ParamEdit::Committed {
        field: ParamField::OutsideColor,
        value: ParamValue::Color(Rgb::from_hex(0x1b3984))
      }
    );
    assert!(parse_commit("spin").is_err());
    assert!(parse_commit("count=many").is_err());
  }

  #[test]
  fn snap_stays_on_grid() {
    let range = ParamField::Branches.range().unwrap();
    assert_eq!(range.snap(2.6), 3.0);
    assert_eq!(range.snap(-4.0), 1.0);
    assert_eq!(range.snap(99.0), 30.0);
  }
}
