//! Validated hex color values sent as background fills.

use crate::error::ToolError;
use std::fmt;
use std::str::FromStr;

/// A `#RGB` or `#RRGGBB` color string.
///
/// The original spelling is preserved and sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(String);

impl HexColor {
    /// Parse and validate a hex color.
    ///
    /// # Errors
    /// Returns [`ToolError::Validation`] when the value is not `#` followed by
    /// three or six hex digits.
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        let trimmed = raw.trim();
        let valid = trimmed
            .strip_prefix('#')
            .filter(|digits| matches!(digits.len(), 3 | 6))
            .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(ToolError::validation(format!(
                "'{}' is not a valid color. Use #RGB or #RRGGBB.",
                raw
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HexColor {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
