use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A cable color as a `#rrggbb` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CableColor(String);

impl CableColor {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the hex string into RGB components. Accepts `#rrggbb` and `#rgb`.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.0.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some((r, g, b))
            }
            3 => {
                let expand = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v * 17);
                Some((expand(&hex[0..1])?, expand(&hex[1..2])?, expand(&hex[2..3])?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for CableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CableColor {
    fn from(value: &str) -> Self {
        CableColor::new(value)
    }
}

const DEFAULT_PALETTE_HEX: [&str; 10] = [
    "#ef4444", "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
    "#f97316", "#64748b",
];

pub static DEFAULT_PALETTE: Lazy<Vec<CableColor>> =
    Lazy::new(|| DEFAULT_PALETTE_HEX.iter().copied().map(CableColor::from).collect());

/// Which side of the board a connector belongs to. Drags always start on the
/// left bank and drop on the right bank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Bank {
    Left,
    Right,
}

/// Coarse bucket of the remaining round time, used to color the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeBand {
    Green,
    Yellow,
    Red,
}

impl TimeBand {
    pub fn from_fraction(time_left: u32, time_per_round: u32) -> Self {
        if time_per_round == 0 {
            return TimeBand::Red;
        }
        let percentage = f64::from(time_left) / f64::from(time_per_round) * 100.0;
        if percentage > 60.0 {
            TimeBand::Green
        } else if percentage > 30.0 {
            TimeBand::Yellow
        } else {
            TimeBand::Red
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(CableColor::from("#ef4444").rgb(), Some((0xef, 0x44, 0x44)));
        assert_eq!(CableColor::from("#fff").rgb(), Some((255, 255, 255)));
        assert_eq!(CableColor::from("ef4444").rgb(), None);
        assert_eq!(CableColor::from("#zz0000").rgb(), None);
    }

    #[test]
    fn default_palette_is_distinct() {
        let mut seen = std::collections::HashSet::new();
        assert!(DEFAULT_PALETTE.iter().all(|c| seen.insert(c.clone())));
        assert_eq!(DEFAULT_PALETTE.len(), 10);
    }

    #[test]
    fn time_band_thresholds() {
        assert_eq!(TimeBand::from_fraction(45, 45), TimeBand::Green);
        assert_eq!(TimeBand::from_fraction(27, 45), TimeBand::Yellow);
        assert_eq!(TimeBand::from_fraction(14, 45), TimeBand::Yellow);
        assert_eq!(TimeBand::from_fraction(13, 45), TimeBand::Red);
        assert_eq!(TimeBand::from_fraction(0, 45), TimeBand::Red);
    }
}
