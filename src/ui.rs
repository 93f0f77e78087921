use crate::params::{ParamEdit, ParamField, ParamValue};
use crate::GalaxyParameters;
use winit::{
  event::{ElementState, KeyEvent, WindowEvent},
  keyboard::{KeyCode, ModifiersState, PhysicalKey},
};

/// Hue rotation per color nudge, in degrees
const HUE_NUDGE: f32 = 10.0;
/// Saturation or value change per color nudge
const TONE_NUDGE: f32 = 0.05;
const SHIFT_MULTIPLIER: f64 = 10.0;

/// What the panel did with an input event
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PanelInput {
  Ignored,
  Handled,
  Edit(ParamEdit),
}

/// Keyboard editor for galaxy parameters.
///
/// Tab cycles fields, the arrow keys nudge a pending value and releasing
/// them commits it. Escape drops the pending value. On color fields the
/// arrows rotate hue, with Shift they change saturation and with Ctrl value.
pub struct ParamPanel {
  selected: usize,
  pending: Option<ParamValue>,
  modifiers: ModifiersState,
}

impl Default for ParamPanel {
  fn default() -> Self {
    Self::new()
  }
}

impl ParamPanel {
  pub fn new() -> Self {
    Self {
      selected: 0,
      pending: None,
      modifiers: ModifiersState::empty(),
    }
  }

  pub fn selected(&self) -> ParamField {
    ParamField::ALL[self.selected]
  }

  pub fn pending(&self) -> Option<ParamValue> {
    self.pending
  }

  pub fn process_events(&mut self, event: &WindowEvent, params: &GalaxyParameters) -> PanelInput {
    match event {
      WindowEvent::ModifiersChanged(modifiers) => {
        self.modifiers = modifiers.state();
        PanelInput::Ignored
      }
      WindowEvent::KeyboardInput {
        event:
          KeyEvent {
            state,
            physical_key: PhysicalKey::Code(keycode),
            ..
          },
        ..
      } => self.key(*keycode, *state == ElementState::Pressed, params),
      _ => PanelInput::Ignored,
    }
  }

  pub fn key(&mut self, keycode: KeyCode, is_pressed: bool, params: &GalaxyParameters) -> PanelInput {
    match (keycode, is_pressed) {
      (KeyCode::Tab, true) => {
        let n = ParamField::ALL.len();
        self.selected = if self.modifiers.shift_key() {
          (self.selected + n - 1) % n
        } else {
          (self.selected + 1) % n
        };
        self.pending = None;
        PanelInput::Handled
      }
      (KeyCode::ArrowUp, true) => self.nudge(1.0, params),
      (KeyCode::ArrowDown, true) => self.nudge(-1.0, params),
      (KeyCode::ArrowUp | KeyCode::ArrowDown, false) | (KeyCode::Enter | KeyCode::NumpadEnter, true) => {
        match self.pending.take() {
          Some(value) => PanelInput::Edit(ParamEdit::Committed {
            field: self.selected(),
            value,
          }),
          None => PanelInput::Ignored,
        }
      }
      (KeyCode::Escape, true) if self.pending.is_some() => {
        self.pending = None;
        PanelInput::Handled
      }
      _ => PanelInput::Ignored,
    }
  }

  fn nudge(&mut self, direction: f64, params: &GalaxyParameters) -> PanelInput {
    let field = self.selected();
    let current = self.pending.unwrap_or_else(|| field.get(params));
    if let ParamValue::Color(c) = current {
      let step = direction as f32;
      let color = if self.modifiers.control_key() {
        c.adjust_hsv(0.0, 0.0, step * TONE_NUDGE)
      } else if self.modifiers.shift_key() {
        c.adjust_hsv(0.0, step * TONE_NUDGE, 0.0)
      } else {
        c.rotate_hue(step * HUE_NUDGE)
      };
      let value = ParamValue::Color(color);
      self.pending = Some(value);
      return PanelInput::Edit(ParamEdit::Changing { field, value });
    }
    let multiplier = if self.modifiers.shift_key() {
      SHIFT_MULTIPLIER
    } else {
      1.0
    };
    let amount = direction * multiplier;
    let value = match (current, field.range()) {
      (ParamValue::Int(v), Some(range)) => {
        ParamValue::Int(range.snap(f64::from(v) + amount * nudge_step(field)) as u32)
      }
      (ParamValue::Float(v), Some(range)) => {
        ParamValue::Float(range.snap(f64::from(v) + amount * nudge_step(field)) as f32)
      }
      (other, _) => other,
    };
    self.pending = Some(value);
    PanelInput::Edit(ParamEdit::Changing { field, value })
  }

  /// One-line summary for the window title.
  pub fn status(&self, params: &GalaxyParameters) -> String {
    let field = self.selected();
    match self.pending {
      Some(value) => format!("Galaxy | {field} = {value} (release to apply)"),
      None if field.range().is_none() => format!(
        "Galaxy | {field} = {}  [Tab] field  [Up/Down] hue  [Shift] saturation  [Ctrl] value",
        field.get(params)
      ),
      None => format!(
        "Galaxy | {field} = {}  [Tab] field  [Up/Down] adjust",
        field.get(params)
      ),
    }
  }
}

fn nudge_step(field: ParamField) -> f64 {
  match field {
    ParamField::Count => 1000.0,
    ParamField::Size => 0.001,
    ParamField::Radius => 0.1,
    ParamField::Branches => 1.0,
    ParamField::Spin => 0.1,
    ParamField::Randomness => 0.01,
    ParamField::RandomnessPower => 0.1,
    ParamField::InsideColor | ParamField::OutsideColor => 0.0,
  }
}
