//! Firmware directives
//!
//! Mirrors the `Direction_t` enum of the flight firmware.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One hardware-facing maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Directive {
    Forward,
    Right,
    Left,
    Back,
    /// Declared by the firmware; no block kind emits it
    Normal,
    Flip,
}

impl Directive {
    /// Token as written in the firmware source
    #[inline]
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Directive::Forward => "FORWARD",
            Directive::Right => "RIGHT",
            Directive::Left => "LEFT",
            Directive::Back => "BACK",
            Directive::Normal => "NORMAL",
            Directive::Flip => "FLIP",
        }
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Directive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORWARD" => Ok(Directive::Forward),
            "RIGHT" => Ok(Directive::Right),
            "LEFT" => Ok(Directive::Left),
            "BACK" => Ok(Directive::Back),
            "NORMAL" => Ok(Directive::Normal),
            "FLIP" => Ok(Directive::Flip),
            other => Err(format!("unknown directive: {other}")),
        }
    }
}
