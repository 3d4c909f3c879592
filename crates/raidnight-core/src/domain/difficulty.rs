//! Raid difficulty tiers as reported in fight metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RaidnightError;

/// Difficulty tier of a fight. The numeric value is the tier id used by the
/// report API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    RaidFinder = 1,
    Flex = 2,
    Normal = 3,
    Heroic = 4,
    Mythic = 5,
}

impl Difficulty {
    /// Label used in encounter keys and snapshot names.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::RaidFinder => "Raid-Finder",
            Difficulty::Flex => "Flex",
            Difficulty::Normal => "Normal",
            Difficulty::Heroic => "Heroic",
            Difficulty::Mythic => "Mythic",
        }
    }

    pub fn tier(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = RaidnightError;

    fn try_from(tier: u8) -> std::result::Result<Self, Self::Error> {
        match tier {
            1 => Ok(Difficulty::RaidFinder),
            2 => Ok(Difficulty::Flex),
            3 => Ok(Difficulty::Normal),
            4 => Ok(Difficulty::Heroic),
            5 => Ok(Difficulty::Mythic),
            other => Err(RaidnightError::UnknownDifficulty(other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = RaidnightError;

    /// Labels match case-insensitively; `lfr` and tier digits also work.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raid-finder" | "lfr" | "1" => Ok(Difficulty::RaidFinder),
            "flex" | "2" => Ok(Difficulty::Flex),
            "normal" | "3" => Ok(Difficulty::Normal),
            "heroic" | "4" => Ok(Difficulty::Heroic),
            "mythic" | "5" => Ok(Difficulty::Mythic),
            _ => Err(RaidnightError::UnknownDifficultyName(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_map_to_labels() {
        assert_eq!(Difficulty::try_from(1).unwrap().label(), "Raid-Finder");
        assert_eq!(Difficulty::try_from(4).unwrap().label(), "Heroic");
        assert_eq!(Difficulty::try_from(5).unwrap().to_string(), "Mythic");
    }

    #[test]
    fn unknown_tier_is_an_error() {
        assert!(matches!(
            Difficulty::try_from(10),
            Err(RaidnightError::UnknownDifficulty(10))
        ));
        assert!(Difficulty::try_from(0).is_err());
    }

    #[test]
    fn ordering_follows_tier() {
        assert!(Difficulty::Heroic > Difficulty::Normal);
        assert_eq!(Difficulty::Mythic.tier(), 5);
    }

    #[test]
    fn labels_parse_back() {
        assert_eq!("heroic".parse::<Difficulty>().unwrap(), Difficulty::Heroic);
        assert_eq!("Raid-Finder".parse::<Difficulty>().unwrap(), Difficulty::RaidFinder);
        assert_eq!("LFR".parse::<Difficulty>().unwrap(), Difficulty::RaidFinder);
        assert_eq!("5".parse::<Difficulty>().unwrap(), Difficulty::Mythic);
        assert!(matches!(
            "ludicrous".parse::<Difficulty>(),
            Err(RaidnightError::UnknownDifficultyName(name)) if name == "ludicrous"
        ));
    }
}
