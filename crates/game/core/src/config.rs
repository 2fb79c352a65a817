/// Arena configuration constants and tunable parameters.
///
/// Timer values are expressed in abstract steps. The runtime decides how long
/// a step lasts in wall-clock time (see `arena_runtime::RuntimeConfig`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArenaConfig {
    /// Turn timer length in scheduler ticks.
    pub turn_timer_ticks: u32,
    /// Remaining ticks at which the current fighter is warned.
    pub turn_warning_ticks: u32,
    /// Defense countdown length in steps before an attack auto-resolves.
    pub defense_countdown_steps: u32,
    /// Remaining defense steps at which the defender is warned.
    pub defense_warning_steps: u32,
    /// Room size used when the world does not report one.
    pub default_room_size: u32,
}

impl ArenaConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STAT: u8 = 10;
    pub const MAX_STAT_TOTAL: u32 = 36;
    pub const MAX_SPECIAL_MOVES: usize = 5;
    pub const MAX_EFFECTS_PER_MOVE: usize = 2;
    pub const MAX_SPECIAL_NAME_LEN: usize = 30;
    pub const MAX_SPECIAL_DESCRIPTION_LEN: usize = 300;

    // ===== effect magnitudes =====
    /// Turns a buff or debuff lasts (stored inclusive, so +1 at creation).
    pub const BUFF_TURNS: u32 = 3;
    /// Turns immobilization or disabled action lasts.
    pub const HINDER_TURNS: u32 = 1;
    pub const SP_RECOVER_AMOUNT: u32 = 3;
    pub const SUPER_DASH_BONUS: u32 = 2;
    pub const SHORT_PUSH_STEPS: u32 = 2;
    pub const LONG_PUSH_STEPS: u32 = 4;
    pub const FREE_MOVE_STEPS: u32 = 2;
    pub const LUNGE_MAX_RANGE: u32 = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TURN_TIMER_TICKS: u32 = 60;
    pub const DEFAULT_TURN_WARNING_TICKS: u32 = 10;
    pub const DEFAULT_DEFENSE_COUNTDOWN_STEPS: u32 = 30;
    pub const DEFAULT_DEFENSE_WARNING_STEPS: u32 = 10;
    pub const DEFAULT_ROOM_SIZE: u32 = 5;

    pub fn new() -> Self {
        Self {
            turn_timer_ticks: Self::DEFAULT_TURN_TIMER_TICKS,
            turn_warning_ticks: Self::DEFAULT_TURN_WARNING_TICKS,
            defense_countdown_steps: Self::DEFAULT_DEFENSE_COUNTDOWN_STEPS,
            defense_warning_steps: Self::DEFAULT_DEFENSE_WARNING_STEPS,
            default_room_size: Self::DEFAULT_ROOM_SIZE,
        }
    }

    pub fn with_turn_timer(mut self, ticks: u32, warning: u32) -> Self {
        self.turn_timer_ticks = ticks;
        self.turn_warning_ticks = warning;
        self
    }

    pub fn with_defense_countdown(mut self, steps: u32, warning: u32) -> Self {
        self.defense_countdown_steps = steps;
        self.defense_warning_steps = warning;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
