use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant's answer for one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Maybe,
    #[default]
    Unavailable,
}

impl Availability {
    pub const ALL: [Availability; 3] = [
        Availability::Available,
        Availability::Maybe,
        Availability::Unavailable,
    ];

    /// Glyph shown in grids and exports
    pub fn symbol(self) -> &'static str {
        match self {
            Availability::Available => "◯",
            Availability::Maybe => "△",
            Availability::Unavailable => "✕",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Maybe => "maybe",
            Availability::Unavailable => "unavailable",
        }
    }

    /// Parses one of the three exact literals
    pub fn from_literal(value: &str) -> Option<Availability> {
        match value {
            "available" => Some(Availability::Available),
            "maybe" => Some(Availability::Maybe),
            "unavailable" => Some(Availability::Unavailable),
            _ => None,
        }
    }

    /// Lenient conversion for untyped JSON answers: anything that is not a
    /// recognized literal string counts as unavailable.
    pub fn from_json(value: Option<&serde_json::Value>) -> Availability {
        value
            .and_then(|v| v.as_str())
            .and_then(Availability::from_literal)
            .unwrap_or(Availability::Unavailable)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
