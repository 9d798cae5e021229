//! Exploration presets
//!
//! A preset picks every exploration bound at once. The bounds move together: more visits
//! per program point unroll loops further, which multiplies states, so the step budget and
//! the relation deduction caps grow with it.
//!
//! | preset | visits per point | steps | deduced relations | trade-off |
//! |---|---|---|---|---|
//! | fast | 1 | 4_000 | 250 | loops run once; long methods often end incomplete |
//! | balanced | 2 | 16_000 | 1_000 | default |
//! | thorough | 3 | 64_000 | 4_000 | fewer incomplete behaviors, slower on large methods |
//! | custom | 2 | 16_000 | 1_000 | balanced, overridden field by field |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Fast,
    #[default]
    Balanced,
    Thorough,
    /// Starting point for YAML overrides
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Self::Fast, Self::Balanced, Self::Thorough, Self::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }

    /// What exploring with this preset gives up
    pub fn trade_off(self) -> &'static str {
        match self {
            Self::Fast => {
                "1 visit per program point: loop bodies run once and long methods often end \
                 with incomplete behaviors"
            }
            Self::Balanced | Self::Custom => {
                "2 visits per program point: loop-carried nullness is usually seen"
            }
            Self::Thorough => {
                "3 visits per program point: fewer incomplete behaviors at four times the step budget"
            }
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    /// Case-insensitive preset name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
