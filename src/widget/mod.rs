/// `widget/` — value, color and container model of the touch bar widgets
///
/// Mutators only touch the native handle and its dirty bits. Propagating a
/// change to the host is the job of the flush cycle in `touchbar`.
pub mod attach;
pub mod color;
pub mod command;
pub mod value;

pub use attach::Attachments;
pub use color::{ColorSlot, Colors, Rgb};
pub use value::WidgetValue;

use crate::handle::{HandleBody, NativeHandle, StateFlags};

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub value: WidgetValue,
    pub colors: Colors,
}

impl Widget {
    pub fn new(value: WidgetValue) -> Self {
        Self {
            value,
            colors: Colors::default(),
        }
    }
}

/// Container widget. Children are borrowed, never owned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scrubber {
    pub children: Attachments,
}

impl NativeHandle {
    /// Populate the value from the constructor argument. Does not mark dirty.
    pub fn set_initial(&mut self, value: WidgetValue) {
        match (self.body_mut(), value) {
            (HandleBody::Widget(w), value) => w.value = value,
            (HandleBody::Command(c), WidgetValue::Text(line)) => c.line = line,
            (body, value) => {
                log::debug!("ignoring initial value {value:?} for {body:?}")
            }
        }
    }

    /// Store `rgb` in `slot` and raise the matching dirty bit, returned to
    /// the caller. `None` if the handle has no colors.
    pub fn set_color(&mut self, slot: ColorSlot, rgb: Rgb) -> Option<StateFlags> {
        let widget = self.widget_mut()?;
        let bit = match slot {
            ColorSlot::Foreground => {
                widget.colors.fg = Some(rgb);
                StateFlags::COLOR_FG
            }
            ColorSlot::Background => {
                widget.colors.bg = Some(rgb);
                StateFlags::COLOR_BG
            }
        };
        self.mark(bit);
        Some(bit)
    }

    pub fn color(&self, slot: ColorSlot) -> Option<Rgb> {
        let colors = self.widget()?.colors;
        match slot {
            ColorSlot::Foreground => colors.fg,
            ColorSlot::Background => colors.bg,
        }
    }

    /// Store a slider percent. The range is deliberately not clamped.
    pub fn set_percent(&mut self, percent: i64) -> Option<StateFlags> {
        let widget = self.widget_mut()?;
        widget.value = WidgetValue::Integer(percent);
        self.mark(StateFlags::VALUE);
        Some(StateFlags::VALUE)
    }

    pub fn percent(&self) -> Option<i64> {
        self.widget()?.value.as_integer()
    }

    /// Script-visible value. Commands report their command line.
    pub fn value(&self) -> Option<WidgetValue> {
        match self.body() {
            HandleBody::Widget(w) => Some(w.value.clone()),
            HandleBody::Command(c) => Some(WidgetValue::Text(c.line.clone())),
            HandleBody::Scrubber(_) => None,
        }
    }

    /// Diagnostic string with the type bits and the active value.
    pub fn describe(&self) -> String {
        match self.value() {
            Some(value) => format!("flags={}, value={}", self.type_flags().bits(), value),
            None => format!("flags={}", self.type_flags().bits()),
        }
    }
}
