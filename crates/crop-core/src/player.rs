//! Player attributes that influence crop economics.

use crate::numeric::{clamp_farming_level, lenient};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level-10 farming profession.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profession {
    #[default]
    None,
    /// Crops sell for 10% more.
    Tiller,
    /// Tiller bonus plus 10% faster growth.
    Agriculturist,
}

impl Profession {
    /// Parse an identifier; unknown values mean no profession.
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "tiller" => Profession::Tiller,
            "agriculturist" => Profession::Agriculturist,
            _ => Profession::None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Profession::None => "none",
            Profession::Tiller => "tiller",
            Profession::Agriculturist => "agriculturist",
        }
    }

    /// Whether the tiller sell bonus applies.
    pub fn has_tiller_bonus(self) -> bool {
        matches!(self, Profession::Tiller | Profession::Agriculturist)
    }

    /// Whether the agriculturist growth bonus applies.
    pub fn has_growth_bonus(self) -> bool {
        self == Profession::Agriculturist
    }

    /// Derive the profession from the two perk flags.
    pub fn from_perks(tiller: bool, agriculturist: bool) -> Self {
        if agriculturist {
            Profession::Agriculturist
        } else if tiller {
            Profession::Tiller
        } else {
            Profession::None
        }
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Profession perk that can be toggled independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Perk {
    Tiller,
    Agriculturist,
}

/// Client-side display toggles stored alongside the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiscSettings {
    #[serde(default = "default_true")]
    pub show_events: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MiscSettings {
    fn default() -> Self {
        Self { show_events: true }
    }
}

/// Profession and farming level of the player being planned for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default)]
    pub profession: Profession,
    /// Farming skill, always within `[0, 10]`.
    #[serde(default, deserialize_with = "lenient::farming_level")]
    pub farming_level: u8,
    #[serde(default)]
    pub settings: MiscSettings,
}

impl PlayerSettings {
    pub fn new(profession: Profession, farming_level: i64) -> Self {
        Self {
            profession,
            farming_level: clamp_farming_level(farming_level),
            settings: MiscSettings::default(),
        }
    }

    /// Set the farming level, clamping into range.
    pub fn set_farming_level(&mut self, level: i64) {
        self.farming_level = clamp_farming_level(level);
    }

    /// Toggle one perk. Agriculturist requires tiller: enabling it enables
    /// tiller, and disabling tiller drops agriculturist.
    pub fn toggle_perk(&mut self, perk: Perk) {
        let mut tiller = self.profession.has_tiller_bonus();
        let mut agriculturist = self.profession.has_growth_bonus();
        match perk {
            Perk::Tiller => {
                tiller = !tiller;
                if !tiller {
                    agriculturist = false;
                }
            }
            Perk::Agriculturist => {
                agriculturist = !agriculturist;
                if agriculturist {
                    tiller = true;
                }
            }
        }
        self.profession = Profession::from_perks(tiller, agriculturist);
    }
}
