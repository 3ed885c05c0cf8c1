use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Day of the plan week, ordered Monday first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| format!("unknown day of week: {s:?}"))
    }
}

/// Named position of a meal within a day.
///
/// Text form is `breakfast`, `lunch`, `dinner`, `snack{n}` or `meal{n}`;
/// `Overflow(n)` covers provider days that return more than three meals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotType {
    Breakfast,
    Lunch,
    Dinner,
    Snack(u8),
    Overflow(u8),
}

impl SlotType {
    /// Slot for the meal at `index` of a provider's ordered meal list.
    pub fn for_meal_index(index: usize) -> SlotType {
        match index {
            0 => SlotType::Breakfast,
            1 => SlotType::Lunch,
            2 => SlotType::Dinner,
            n => SlotType::Overflow(u8::try_from(n + 1).unwrap_or(u8::MAX)),
        }
    }

    /// Position in a provider's meal list; `None` for snacks.
    pub fn meal_index(self) -> Option<usize> {
        match self {
            SlotType::Breakfast => Some(0),
            SlotType::Lunch => Some(1),
            SlotType::Dinner => Some(2),
            SlotType::Overflow(n) => Some(usize::from(n).saturating_sub(1)),
            SlotType::Snack(_) => None,
        }
    }

    pub fn is_snack(self) -> bool {
        matches!(self, SlotType::Snack(_))
    }

    /// Display priority within a day.
    pub fn priority(self) -> u8 {
        match self {
            SlotType::Breakfast => 1,
            SlotType::Lunch => 2,
            SlotType::Dinner => 3,
            SlotType::Snack(_) => 4,
            SlotType::Overflow(_) => 5,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::Breakfast => f.write_str("breakfast"),
            SlotType::Lunch => f.write_str("lunch"),
            SlotType::Dinner => f.write_str("dinner"),
            SlotType::Snack(n) => write!(f, "snack{n}"),
            SlotType::Overflow(n) => write!(f, "meal{n}"),
        }
    }
}

impl FromStr for SlotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let numbered = |prefix: &str| -> Option<u8> {
            lower
                .strip_prefix(prefix)
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| *n > 0)
        };
        match lower.as_str() {
            "breakfast" => Ok(SlotType::Breakfast),
            "lunch" => Ok(SlotType::Lunch),
            "dinner" => Ok(SlotType::Dinner),
            _ => {
                if let Some(n) = numbered("snack") {
                    Ok(SlotType::Snack(n))
                } else if let Some(n) = numbered("meal").filter(|n| *n > 3) {
                    Ok(SlotType::Overflow(n))
                } else {
                    Err(format!("unknown slot type: {s:?}"))
                }
            }
        }
    }
}

impl Serialize for SlotType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive calorie range for a recipe search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalorieBand {
    pub min: u32,
    pub max: u32,
}

impl CalorieBand {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}
