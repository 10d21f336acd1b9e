//! Shared type definitions for the roulette table
//!
//! Canonical value types used by the wheel, the layout and the rules engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numbers coloured red on both wheel variants; every other number is black.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Single zero, present on every wheel
pub const ZERO: &str = "0";

/// Double zero, American wheels only
pub const DOUBLE_ZERO: &str = "00";

/// Whether a label names a house pocket ("0" or "00")
pub fn is_house_space(value: &str) -> bool {
    value == ZERO || value == DOUBLE_ZERO
}

/// Wheel and layout variant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableType {
    /// 38 pockets: 0, 00 and 1-36
    American,
    /// 37 pockets: 0 and 1-36
    European,
}

impl TableType {
    /// Number of pockets on the wheel
    pub fn pocket_count(self) -> u32 {
        match self {
            TableType::American => 38,
            TableType::European => 37,
        }
    }

}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::American => write!(f, "AMERICAN"),
            TableType::European => write!(f, "EUROPEAN"),
        }
    }
}

impl FromStr for TableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AMERICAN" => Ok(TableType::American),
            "EUROPEAN" => Ok(TableType::European),
            other => Err(format!("unknown table type: {}", other)),
        }
    }
}

/// Pocket colour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    /// Colour of a space identifier; house pockets and anything unknown are green
    pub fn of(value: &str) -> Self {
        match value.parse::<u8>() {
            Ok(n) if (1..=36).contains(&n) => {
                if RED_NUMBERS.contains(&n) {
                    Color::Red
                } else {
                    Color::Black
                }
            }
            _ => Color::Green,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "RED"),
            Color::Black => write!(f, "BLACK"),
            Color::Green => write!(f, "GREEN"),
        }
    }
}

/// One labelled, coloured pocket; also the outcome of a spin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Space {
    /// Label as printed on the layout ("0", "00", "1".."36")
    pub value: String,
    pub color: Color,
    /// Index of the pocket around the wheel
    pub wheel_location: usize,
}

impl Space {
    pub fn new(value: impl Into<String>, wheel_location: usize) -> Self {
        let value = value.into();
        let color = Color::of(&value);
        Self {
            value,
            color,
            wheel_location,
        }
    }

    /// Numeric value for 1-36; None for house pockets
    pub fn number(&self) -> Option<u8> {
        match self.color {
            Color::Green => None,
            _ => self.value.parse().ok(),
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors() {
        assert_eq!(Color::of("0"), Color::Green);
        assert_eq!(Color::of("00"), Color::Green);
        assert_eq!(Color::of("1"), Color::Red);
        assert_eq!(Color::of("2"), Color::Black);
        assert_eq!(Color::of("36"), Color::Red);
        assert_eq!(Color::of("37"), Color::Green);
    }

    #[test]
    fn test_table_type_parsing() {
        assert_eq!("american".parse::<TableType>(), Ok(TableType::American));
        assert_eq!("EUROPEAN".parse::<TableType>(), Ok(TableType::European));
        assert!("french".parse::<TableType>().is_err());
    }

    #[test]
    fn test_house_space_labels() {
        assert!(is_house_space("0"));
        assert!(is_house_space("00"));
        assert!(!is_house_space("000"));
        assert!(!is_house_space("10"));
    }

    #[test]
    fn test_house_space_has_no_number() {
        assert_eq!(Space::new("00", 19).number(), None);
        assert_eq!(Space::new("17", 8).number(), Some(17));
    }
}
