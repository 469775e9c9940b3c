//! Damage arithmetic shared by the battle and decision makers.

use super::moves::{AttributeKind, Move};
use super::state::WindUpState;

/// Damage `attack` deals against a defender winding up `defense`.
///
/// Healing moves deal nothing. An idle defender and piercing moves take the
/// full effect; otherwise the defense is subtracted.
pub fn compute_damage(attack: &Move, defense: Option<&Move>) -> u32 {
    if attack.kind() == AttributeKind::Heal {
        return 0;
    }
    match defense {
        None => attack.effect(),
        Some(_) if attack.kind() == AttributeKind::Piercing => attack.effect(),
        Some(defense) => attack.effect().saturating_sub(defense.defense()),
    }
}

/// Damage a reflecting defender sends back. Never more than the attack's
/// own effect.
pub fn compute_reflect(attack: &Move, defense: Option<&Move>) -> u32 {
    match defense {
        Some(defense)
            if defense.kind() == AttributeKind::Reflect
                && attack.kind() != AttributeKind::Piercing =>
        {
            attack.effect().min(defense.defense())
        }
        _ => 0,
    }
}

/// Whether `attack`, chosen now, lands before `defender` gets to change its
/// move. Ties go to whoever acts first: against a defender that is first to
/// act, an attack landing on the same tick does not count. This is stricter
/// than a plain `delay <= remaining` check, which would hand that tie to the
/// attacker.
pub fn will_hit_before_move_change(attack: &Move, defender: &WindUpState) -> bool {
    let delay = attack.delay();
    let remaining = defender.delay_remaining();
    if defender.first_to_act() {
        delay < remaining
    } else {
        delay <= remaining
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::{Snapshot, StateBuilder};
    use crate::windup::moves::Attribute;
    use crate::windup::state::WindUpAttributes;

    fn strike(effect: u32) -> Move {
        Move::new("strike", "Strike").with_stats(effect, 0, 3)
    }

    fn guard(defense: u32, attribute: Attribute) -> Move {
        Move::new("guard", "Guard")
            .with_stats(0, defense, 3)
            .with_attribute(attribute)
    }

    #[test]
    fn piercing_ignores_defense() {
        let pierce = strike(10).with_attribute(Attribute::Piercing);
        assert_eq!(compute_damage(&pierce, Some(&guard(8, Attribute::None))), 10);
    }

    #[test]
    fn defense_is_subtracted_and_floored() {
        assert_eq!(compute_damage(&strike(10), Some(&guard(8, Attribute::None))), 2);
        assert_eq!(compute_damage(&strike(5), Some(&guard(8, Attribute::None))), 0);
        assert_eq!(compute_damage(&strike(5), None), 5);
    }

    #[test]
    fn heals_deal_no_damage() {
        let heal = strike(6).with_attribute(Attribute::Heal);
        assert_eq!(compute_damage(&heal, None), 0);
    }

    #[test]
    fn reflect_returns_blocked_damage() {
        let mirror = guard(8, Attribute::Reflect);
        assert_eq!(compute_reflect(&strike(12), Some(&mirror)), 8);
        assert_eq!(compute_reflect(&strike(5), Some(&mirror)), 5);
        let pierce = strike(12).with_attribute(Attribute::Piercing);
        assert_eq!(compute_reflect(&pierce, Some(&mirror)), 0);
        assert_eq!(compute_reflect(&strike(12), Some(&guard(8, Attribute::None))), 0);
        assert_eq!(compute_reflect(&strike(12), None), 0);
    }

    #[test]
    fn timing_ties_favor_the_leader() {
        let attributes = Arc::new(WindUpAttributes::new("target", "Target", 10));
        let slow = Arc::new(Move::new("slow", "Slow").with_stats(1, 0, 4));
        let follower = WindUpState::from_attributes(attributes)
            .to_builder()
            .schedule(slow, 4)
            .build();
        let leader = follower.to_builder().set_first_to_act(true).build();

        let quick = Move::new("quick", "Quick").with_stats(1, 0, 4);
        assert!(will_hit_before_move_change(&quick, &follower));
        assert!(!will_hit_before_move_change(&quick, &leader));

        let quicker = Move::new("quicker", "Quicker").with_stats(1, 0, 3);
        assert!(will_hit_before_move_change(&quicker, &leader));
    }
}
