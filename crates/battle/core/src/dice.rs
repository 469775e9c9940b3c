//! Dice in standard `NdS±M` notation.

use std::fmt;
use std::str::FromStr;

use crate::random::RandomSource;

/// A set of identical dice plus a flat modifier, e.g. `2d6+1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Dice {
    count: u32,
    sides: u32,
    modifier: i32,
}

impl Dice {
    pub const MAX_COUNT: u32 = 100;
    pub const MAX_SIDES: u32 = 1_000;

    /// `count` dice with `sides` faces each, clamped to
    /// `1..=MAX_COUNT` and `1..=MAX_SIDES`.
    pub fn new(count: u32, sides: u32) -> Self {
        Self {
            count: count.clamp(1, Self::MAX_COUNT),
            sides: sides.clamp(1, Self::MAX_SIDES),
            modifier: 0,
        }
    }

    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    pub fn min_roll(&self) -> i32 {
        saturate(i64::from(self.count) + i64::from(self.modifier))
    }

    pub fn max_roll(&self) -> i32 {
        saturate(i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier))
    }

    pub fn roll(&self, rng: &mut (impl RandomSource + ?Sized)) -> i32 {
        self.roll_detailed(rng).final_result
    }

    /// Rolls every die and keeps the individual faces.
    pub fn roll_detailed(&self, rng: &mut (impl RandomSource + ?Sized)) -> DiceResult {
        let rolls: Vec<i32> = (0..self.count)
            .map(|_| rng.range(1, self.sides as i32))
            .collect();
        let total: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
        let final_result = saturate(total + i64::from(self.modifier));
        DiceResult {
            dice: *self,
            rolls,
            final_result,
        }
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

/// Errors produced while parsing dice notation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceParseError {
    #[error("dice notation '{0}' is missing the 'd' separator")]
    MissingSeparator(String),

    #[error("invalid number '{value}' in dice notation '{notation}'")]
    InvalidNumber { notation: String, value: String },

    #[error("dice notation '{0}' needs at least one die with at least one side")]
    Empty(String),

    #[error("dice notation '{0}' exceeds {max_count} dice or {max_sides} sides", max_count = Dice::MAX_COUNT, max_sides = Dice::MAX_SIDES)]
    TooLarge(String),
}

impl FromStr for Dice {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notation = s.trim();
        let lower = notation.to_ascii_lowercase();
        let (count_part, rest) = lower
            .split_once('d')
            .ok_or_else(|| DiceParseError::MissingSeparator(notation.to_string()))?;

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(idx) => {
                let (sides, modifier) = rest.split_at(idx);
                (sides, parse_number::<i32>(notation, modifier)?)
            }
            None => (rest, 0),
        };

        let count = if count_part.is_empty() {
            1
        } else {
            parse_number::<u32>(notation, count_part)?
        };
        let sides = parse_number::<u32>(notation, sides_part)?;

        if count == 0 || sides == 0 {
            return Err(DiceParseError::Empty(notation.to_string()));
        }
        if count > Self::MAX_COUNT || sides > Self::MAX_SIDES {
            return Err(DiceParseError::TooLarge(notation.to_string()));
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }
}

fn parse_number<T: FromStr>(notation: &str, value: &str) -> Result<T, DiceParseError> {
    value
        .trim()
        .trim_start_matches('+')
        .parse()
        .map_err(|_| DiceParseError::InvalidNumber {
            notation: notation.to_string(),
            value: value.to_string(),
        })
}

impl TryFrom<String> for Dice {
    type Error = DiceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dice> for String {
    fn from(dice: Dice) -> Self {
        dice.to_string()
    }
}

/// Outcome of one roll: the final value plus each die face.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceResult {
    pub dice: Dice,
    pub rolls: Vec<i32>,
    pub final_result: i32,
}

impl DiceResult {
    pub fn is_min(&self) -> bool {
        self.final_result == self.dice.min_roll()
    }

    pub fn is_max(&self) -> bool {
        self.final_result == self.dice.max_roll()
    }
}

impl fmt::Display for DiceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces: Vec<String> = self.rolls.iter().map(i32::to_string).collect();
        write!(f, "{} ({}: [{}])", self.final_result, self.dice, faces.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn parses_common_notations() {
        assert_eq!("1d6".parse::<Dice>().unwrap(), Dice::new(1, 6));
        assert_eq!("d20".parse::<Dice>().unwrap(), Dice::new(1, 20));
        assert_eq!(
            "2D8+3".parse::<Dice>().unwrap(),
            Dice::new(2, 8).with_modifier(3)
        );
        assert_eq!(
            " 3d4-1 ".parse::<Dice>().unwrap(),
            Dice::new(3, 4).with_modifier(-1)
        );
    }

    #[test]
    fn rejects_malformed_notation() {
        assert!(matches!(
            "12".parse::<Dice>(),
            Err(DiceParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "xd6".parse::<Dice>(),
            Err(DiceParseError::InvalidNumber { .. })
        ));
        assert!(matches!("0d6".parse::<Dice>(), Err(DiceParseError::Empty(_))));
        assert!(matches!("1d0".parse::<Dice>(), Err(DiceParseError::Empty(_))));
    }

    #[test]
    fn rejects_oversized_dice() {
        assert!(matches!(
            "100000d100000".parse::<Dice>(),
            Err(DiceParseError::TooLarge(_))
        ));
        assert!(matches!("1d1001".parse::<Dice>(), Err(DiceParseError::TooLarge(_))));
        assert!("100d1000".parse::<Dice>().is_ok());
    }

    #[test]
    fn extreme_dice_do_not_overflow() {
        let dice = Dice::new(u32::MAX, u32::MAX).with_modifier(i32::MAX);
        assert_eq!(dice.count(), Dice::MAX_COUNT);
        assert_eq!(dice.sides(), Dice::MAX_SIDES);
        assert_eq!(dice.max_roll(), i32::MAX);
        assert_eq!(Dice::new(1, 4).with_modifier(i32::MIN).min_roll(), i32::MIN + 1);

        let mut rng = ScriptedRandom::new([1_000; 100]);
        assert_eq!(dice.roll(&mut rng), i32::MAX);
    }

    #[test]
    fn display_matches_notation() {
        for notation in ["1d6", "2d8+3", "3d4-1"] {
            assert_eq!(notation.parse::<Dice>().unwrap().to_string(), notation);
        }
    }

    #[test]
    fn bounds_include_modifier() {
        let dice = Dice::new(2, 6).with_modifier(1);
        assert_eq!(dice.min_roll(), 3);
        assert_eq!(dice.max_roll(), 13);
    }

    #[test]
    fn detailed_roll_keeps_faces() {
        let mut rng = ScriptedRandom::new([4, 6]);
        let result = Dice::new(2, 6).with_modifier(-2).roll_detailed(&mut rng);
        assert_eq!(result.rolls, vec![4, 6]);
        assert_eq!(result.final_result, 8);
        assert!(!result.is_max());
        assert_eq!(result.to_string(), "8 (2d6-2: [4, 6])");
    }
}
