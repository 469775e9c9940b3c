//! Moves, their attributes and the stacks they leave behind.

use std::fmt;
use std::sync::Arc;

/// Combat numbers of a move. A move without them cannot be used in battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleStats {
    /// Damage dealt, or HP restored for healing moves.
    pub effect: u32,
    /// Damage soaked while this move is winding up.
    pub defense: u32,
    /// Ticks between choosing the move and it landing.
    pub delay: u32,
}

impl BattleStats {
    pub const fn new(effect: u32, defense: u32, delay: u32) -> Self {
        Self {
            effect,
            defense,
            delay,
        }
    }
}

/// Special behaviour attached to a move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::EnumDiscriminants)]
#[strum_discriminants(name(AttributeKind))]
#[strum_discriminants(derive(Hash, strum::Display, strum::EnumIter, strum::EnumString))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    #[default]
    None,
    /// Ignores the defender's defense.
    Piercing,
    /// Heals the user by the move's effect instead of dealing damage.
    Heal,
    /// On a damaging hit, leaves stacks that hurt the victim each time it acts.
    Bleed { stacks: u32, damage: u32 },
    /// On a damaging hit, leaves stacks. `tick_frequency` is carried for
    /// content but poison stacks do not tick.
    Poison {
        stacks: u32,
        damage: u32,
        tick_frequency: u32,
    },
    /// Heals the user by half the damage dealt.
    Vampiric,
    /// Blocked damage is sent back to the attacker.
    Reflect,
    /// Passive: raises the owner's max HP for the whole battle.
    MaxHpBoost { amount: u32 },
    /// Pushes the defender's next action back.
    Stun { ticks: u32 },
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        AttributeKind::from(self)
    }

    pub fn applies_stacks(&self) -> bool {
        matches!(self, Self::Bleed { .. } | Self::Poison { .. })
    }

    pub fn stacks_to_apply(&self) -> u32 {
        match self {
            Self::Bleed { stacks, .. } | Self::Poison { stacks, .. } => *stacks,
            _ => 0,
        }
    }

    pub fn damage_on_apply(&self) -> u32 {
        match self {
            Self::Bleed { damage, .. } | Self::Poison { damage, .. } => *damage,
            _ => 0,
        }
    }

    fn short_name(&self) -> Option<&'static str> {
        match self {
            Self::None | Self::MaxHpBoost { .. } => None,
            Self::Piercing => Some("Pi"),
            Self::Heal => Some("He"),
            Self::Bleed { .. } => Some("Bd"),
            Self::Poison { .. } => Some("Po"),
            Self::Vampiric => Some("Va"),
            Self::Reflect => Some("Rf"),
            Self::Stun { .. } => Some("St"),
        }
    }
}

/// A named move from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: Option<BattleStats>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attribute: Attribute,
}

impl Move {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stats: None,
            attribute: Attribute::None,
        }
    }

    pub fn with_stats(mut self, effect: u32, defense: u32, delay: u32) -> Self {
        self.stats = Some(BattleStats::new(effect, defense, delay));
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = attribute;
        self
    }

    /// Whether the move can be chosen in battle.
    pub fn is_usable(&self) -> bool {
        self.stats.is_some()
    }

    pub fn effect(&self) -> u32 {
        self.stats.map_or(0, |stats| stats.effect)
    }

    pub fn defense(&self) -> u32 {
        self.stats.map_or(0, |stats| stats.defense)
    }

    pub fn delay(&self) -> u32 {
        self.stats.map_or(0, |stats| stats.delay)
    }

    pub fn kind(&self) -> AttributeKind {
        self.attribute.kind()
    }

    pub fn max_hp_boost(&self) -> u32 {
        match self.attribute {
            Attribute::MaxHpBoost { amount } => amount,
            _ => 0,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Attribute::MaxHpBoost { amount } = self.attribute {
            return write!(f, "{} (+{amount} Max HP)", self.name);
        }
        match self.stats {
            Some(stats) => {
                write!(
                    f,
                    "{} ({}/{}/{}",
                    self.name, stats.effect, stats.defense, stats.delay
                )?;
                if let Some(short) = self.attribute.short_name() {
                    write!(f, "/{short}")?;
                }
                write!(f, ")")
            }
            None => write!(f, "{}", self.name),
        }
    }
}

/// Lingering effect of a stacking move on its victim.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stack {
    pub applied: Arc<Move>,
    pub count: u32,
}

impl Stack {
    pub fn kind(&self) -> AttributeKind {
        self.applied.kind()
    }

    /// Same move applied again: keep whichever count is larger.
    pub fn topped_up(&self, stacks: u32) -> Self {
        Self {
            applied: Arc::clone(&self.applied),
            count: self.count.max(stacks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_to_zero_when_unusable() {
        let passive = Move::new("vigor", "Vigor").with_attribute(Attribute::MaxHpBoost { amount: 5 });
        assert!(!passive.is_usable());
        assert_eq!((passive.effect(), passive.defense(), passive.delay()), (0, 0, 0));
        assert_eq!(passive.max_hp_boost(), 5);
    }

    #[test]
    fn kind_strips_payload() {
        let bleed = Attribute::Bleed {
            stacks: 2,
            damage: 3,
        };
        assert_eq!(bleed.kind(), AttributeKind::Bleed);
        assert!(bleed.applies_stacks());
        assert_eq!(bleed.stacks_to_apply(), 2);
        assert_eq!(bleed.damage_on_apply(), 3);
        assert!(!Attribute::Stun { ticks: 2 }.applies_stacks());
        assert_eq!("Stun".parse::<AttributeKind>().unwrap(), AttributeKind::Stun);
    }

    #[test]
    fn display_shows_vital_stats() {
        let slash = Move::new("slash", "Slash").with_stats(5, 1, 3);
        assert_eq!(slash.to_string(), "Slash (5/1/3)");
        let pierce = Move::new("lunge", "Lunge")
            .with_stats(7, 0, 4)
            .with_attribute(Attribute::Piercing);
        assert_eq!(pierce.to_string(), "Lunge (7/0/4/Pi)");
        let vigor = Move::new("vigor", "Vigor").with_attribute(Attribute::MaxHpBoost { amount: 5 });
        assert_eq!(vigor.to_string(), "Vigor (+5 Max HP)");
    }

    #[test]
    fn top_up_keeps_larger_count() {
        let stack = Stack {
            applied: Arc::new(Move::new("cut", "Cut")),
            count: 3,
        };
        assert_eq!(stack.topped_up(2).count, 3);
        assert_eq!(stack.topped_up(5).count, 5);
    }
}
