//! Decoded content lines (RFC 5545 §3.1).

use super::{Parameter, Value};

/// One decoded property of a feed.
///
/// Produced once per logical (unfolded) line and never modified afterwards.
/// The internal `ENCODING=BASE64` parameter is consumed while decoding and
/// does not appear in `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Typed value.
    pub value: Value,
}

impl ContentLine {
    /// Creates a content line without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value,
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        find_param(&self.params, name)
    }

    /// Returns the first value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }

    /// Returns whether this is `BEGIN:<component>` / `END:<component>`.
    #[must_use]
    pub fn is_marker(&self, marker: &str, component: &str) -> bool {
        self.name == marker && self.value.is_text(component)
    }
}

/// Finds a parameter by (case-insensitive) name.
pub(crate) fn find_param<'a>(params: &'a [Parameter], name: &str) -> Option<&'a Parameter> {
    params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
