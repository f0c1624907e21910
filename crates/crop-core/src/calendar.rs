//! Fixed game calendar: four 28-day seasons per year, plus calendar events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Days in one season.
pub const SEASON_DAYS: u32 = 28;
/// Days in one year (four seasons).
pub const YEAR_DAYS: u32 = SEASON_DAYS * 4;

/// One of the four calendar seasons.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Zero-based position within the year.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Season by zero-based index; wraps around past winter.
    pub fn from_index(index: usize) -> Season {
        Self::ALL[index % 4]
    }

    /// Lower-case identifier, e.g. `"spring"`.
    pub fn id(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }

    /// Capitalised display name.
    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    /// Parse a season identifier, case-insensitively.
    pub fn from_id(id: &str) -> Option<Season> {
        Self::ALL
            .into_iter()
            .find(|s| s.id().eq_ignore_ascii_case(id.trim()))
    }

    /// First day of the season within a year (1-based).
    pub fn start(self) -> u32 {
        self.index() as u32 * SEASON_DAYS + 1
    }

    /// Last day of the season within a year.
    pub fn end(self) -> u32 {
        self.start() + SEASON_DAYS - 1
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Zero-based season slot of a 1-based day; days past the year keep counting
/// (day 113 is slot 4), which callers use to detect a year boundary.
pub fn season_slot(day: u32) -> usize {
    (day.max(1) as usize - 1) / SEASON_DAYS as usize
}

/// Season containing a 1-based day, wrapping across years.
pub fn season_of_day(day: u32) -> Season {
    Season::from_index(season_slot(day))
}

/// Last day of the season containing `day`, on the same absolute scale,
/// saturating at `u32::MAX`.
pub fn season_end_of(day: u32) -> u32 {
    ((day.max(1) - 1) / SEASON_DAYS + 1).saturating_mul(SEASON_DAYS)
}

/// Last day of the year containing `day`, on the same absolute scale,
/// saturating at `u32::MAX`.
pub fn year_end_of(day: u32) -> u32 {
    ((day.max(1) - 1) / YEAR_DAYS + 1).saturating_mul(YEAR_DAYS)
}

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Format a day of the year.
///
/// Placeholders: `%l` weekday name, `%j` day of month, `%S` ordinal suffix,
/// `%F` season name. `format_day(30, "%l, %F %j%S")` is `"Tuesday, Summer 2nd"`.
pub fn format_day(day: u32, pattern: &str) -> String {
    let date = match day % SEASON_DAYS {
        0 => SEASON_DAYS,
        d => d,
    };
    let suffix = if date <= 3 || date >= 21 {
        match date % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    } else {
        "th"
    };
    pattern
        .replacen("%l", WEEKDAYS[(date % 7) as usize], 1)
        .replacen("%j", &date.to_string(), 1)
        .replacen("%S", suffix, 1)
        .replacen("%F", season_of_day(day).name(), 1)
}

/// A birthday or festival shown on the calendar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Day of the season (1..=28).
    pub day: u32,
    /// Season the event falls in.
    pub season: Season,
    /// Villager or festival name.
    pub name: String,
    /// Festivals are shown by name; everything else is a birthday.
    #[serde(default)]
    pub festival: bool,
}

impl CalendarEvent {
    /// Absolute day within the year.
    pub fn date(&self) -> u32 {
        (self.season.index() as u32 * SEASON_DAYS).saturating_add(self.day)
    }

    /// Human readable description.
    pub fn text(&self) -> String {
        if self.festival {
            self.name.clone()
        } else {
            format!("{}'s Birthday", self.name)
        }
    }
}
