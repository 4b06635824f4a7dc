/// `widget/value.rs` — the single value a widget carries
use std::fmt;

use serde::Serialize;

/// Text for labels and buttons, an integer percent for sliders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WidgetValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl WidgetValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WidgetValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            WidgetValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for WidgetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetValue::Text(s) => f.write_str(s),
            WidgetValue::Integer(i) => write!(f, "{i}"),
            WidgetValue::Real(r) => write!(f, "{r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_active_variant_only() {
        assert_eq!(WidgetValue::Text("Red".into()).to_string(), "Red");
        assert_eq!(WidgetValue::Integer(-5).to_string(), "-5");
        assert_eq!(WidgetValue::Real(0.5).to_string(), "0.5");
    }

    #[test]
    fn accessors_reject_other_variants() {
        let v = WidgetValue::Integer(40);
        assert_eq!(v.as_integer(), Some(40));
        assert_eq!(v.as_text(), None);
        assert_eq!(WidgetValue::Real(1.0).as_integer(), None);
    }
}
