/// `handle/` — native storage behind script objects
///
/// Every script-visible widget is backed by a `NativeHandle` living in the
/// `HandleRegistry`. Scripts only ever hold a `HandleId`; the registry hands
/// out the handle again only when its type bits match the capability the
/// caller asks for.
pub mod flags;
pub mod lifecycle;
pub mod registry;

use std::fmt;

use serde::Serialize;

use crate::widget::{command::Command, Scrubber, Widget, WidgetValue};

pub use flags::{StateFlags, TypeFlags};
pub use lifecycle::HandleGuard;
pub use registry::{CallContext, HandleId, HandleRegistry};

/// Concrete kinds a script can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    Command,
    Label,
    Button,
    Slider,
    Scrubber,
}

impl HandleKind {
    pub const ALL: [HandleKind; 5] = [
        HandleKind::Label,
        HandleKind::Button,
        HandleKind::Slider,
        HandleKind::Scrubber,
        HandleKind::Command,
    ];

    pub fn flag(self) -> TypeFlags {
        match self {
            HandleKind::Command => TypeFlags::COMMAND,
            HandleKind::Label => TypeFlags::LABEL,
            HandleKind::Button => TypeFlags::BUTTON,
            HandleKind::Slider => TypeFlags::SLIDER,
            HandleKind::Scrubber => TypeFlags::SCRUBBER,
        }
    }

    /// Name of the script class constructing this kind.
    pub fn class_name(self) -> &'static str {
        match self {
            HandleKind::Command => "Command",
            HandleKind::Label => "Label",
            HandleKind::Button => "Button",
            HandleKind::Slider => "Slider",
            HandleKind::Scrubber => "Scrubber",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Kind specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleBody {
    Widget(Widget),
    Scrubber(Scrubber),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeHandle {
    kind: HandleKind,
    state: StateFlags,
    body: HandleBody,
}

impl NativeHandle {
    /// Fresh handle with every field at its zero value.
    pub(crate) fn zeroed(kind: HandleKind) -> Self {
        let body = match kind {
            HandleKind::Label | HandleKind::Button => {
                HandleBody::Widget(Widget::new(WidgetValue::Text(String::new())))
            }
            HandleKind::Slider => HandleBody::Widget(Widget::new(WidgetValue::Integer(0))),
            HandleKind::Scrubber => HandleBody::Scrubber(Scrubber::default()),
            HandleKind::Command => HandleBody::Command(Command::default()),
        };
        Self {
            kind,
            state: StateFlags::empty(),
            body,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn type_flags(&self) -> TypeFlags {
        self.kind.flag()
    }

    pub fn state(&self) -> StateFlags {
        self.state
    }

    /// Type and state bits packed the way the host reports them.
    pub fn flags_bits(&self) -> u32 {
        self.type_flags().bits() | self.state.bits()
    }

    pub fn mark(&mut self, bits: StateFlags) {
        self.state.insert(bits);
    }

    pub fn clear(&mut self, bits: StateFlags) {
        self.state.remove(bits);
    }

    pub fn body(&self) -> &HandleBody {
        &self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut HandleBody {
        &mut self.body
    }

    pub fn widget(&self) -> Option<&Widget> {
        match &self.body {
            HandleBody::Widget(w) => Some(w),
            _ => None,
        }
    }

    pub fn widget_mut(&mut self) -> Option<&mut Widget> {
        match &mut self.body {
            HandleBody::Widget(w) => Some(w),
            _ => None,
        }
    }

    pub fn scrubber(&self) -> Option<&Scrubber> {
        match &self.body {
            HandleBody::Scrubber(s) => Some(s),
            _ => None,
        }
    }

    pub fn scrubber_mut(&mut self) -> Option<&mut Scrubber> {
        match &mut self.body {
            HandleBody::Scrubber(s) => Some(s),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&Command> {
        match &self.body {
            HandleBody::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn command_mut(&mut self) -> Option<&mut Command> {
        match &mut self.body {
            HandleBody::Command(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_body_matches_kind() {
        let label = NativeHandle::zeroed(HandleKind::Label);
        assert_eq!(
            label.widget().map(|w| &w.value),
            Some(&WidgetValue::Text(String::new()))
        );

        let slider = NativeHandle::zeroed(HandleKind::Slider);
        assert_eq!(
            slider.widget().map(|w| &w.value),
            Some(&WidgetValue::Integer(0))
        );

        let scrubber = NativeHandle::zeroed(HandleKind::Scrubber);
        assert!(scrubber.widget().is_none());
        assert_eq!(scrubber.scrubber().map(|s| s.children.len()), Some(0));

        assert!(NativeHandle::zeroed(HandleKind::Command).command().is_some());
    }

    #[test]
    fn each_kind_has_exactly_one_type_bit() {
        for kind in HandleKind::ALL {
            assert_eq!(kind.flag().bits().count_ones(), 1, "{kind}");
        }
    }

    #[test]
    fn flags_bits_combine_type_and_state() {
        let mut h = NativeHandle::zeroed(HandleKind::Button);
        h.mark(StateFlags::COLOR_BG);
        assert_eq!(
            h.flags_bits(),
            TypeFlags::BUTTON.bits() | StateFlags::COLOR_BG.bits()
        );
        h.clear(StateFlags::COLOR_BG);
        assert_eq!(h.flags_bits(), TypeFlags::BUTTON.bits());
    }
}
