/// Battle tunables shared by both resolution variants.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Delay added to an entity's turn timer for every action it takes
    /// (dice/parry variant). Also used as the failed-parry penalty.
    pub turn_delay: u32,

    /// How many times initiative is re-rolled on a tie before falling back
    /// to a coin flip.
    pub max_initiative_rolls: u32,

    /// Lower bound for the wind-up delay of a freshly scheduled move.
    pub min_move_delay: u32,

    /// Added to the wind-up time of every entity that is not first to act,
    /// so ties on integer delays always favour the first actor.
    pub follower_tie_break: f32,

    /// Upper bound on decisions a runner will feed into one battle.
    pub max_decisions: u32,
}

impl BattleConfig {
    pub const DEFAULT_TURN_DELAY: u32 = 100;
    pub const DEFAULT_MAX_INITIATIVE_ROLLS: u32 = 50;
    pub const DEFAULT_MIN_MOVE_DELAY: u32 = 1;
    pub const DEFAULT_FOLLOWER_TIE_BREAK: f32 = 0.5;
    pub const DEFAULT_MAX_DECISIONS: u32 = 10_000;

    pub fn new() -> Self {
        Self {
            turn_delay: Self::DEFAULT_TURN_DELAY,
            max_initiative_rolls: Self::DEFAULT_MAX_INITIATIVE_ROLLS,
            min_move_delay: Self::DEFAULT_MIN_MOVE_DELAY,
            follower_tie_break: Self::DEFAULT_FOLLOWER_TIE_BREAK,
            max_decisions: Self::DEFAULT_MAX_DECISIONS,
        }
    }

    pub fn with_max_initiative_rolls(mut self, rolls: u32) -> Self {
        self.max_initiative_rolls = rolls;
        self
    }

    pub fn with_turn_delay(mut self, turn_delay: u32) -> Self {
        self.turn_delay = turn_delay;
        self
    }

    pub fn with_max_decisions(mut self, max_decisions: u32) -> Self {
        self.max_decisions = max_decisions;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
