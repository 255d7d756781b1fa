//! Money and lives of the player for the current level attempt.

use waypoint_defence_core::EconomyTuning;

/// Resources owned by the player during a level attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerState {
    money: u32,
    lives: u32,
}

impl PlayerState {
    /// Creates a player holding the configured starting resources.
    #[must_use]
    pub const fn new(economy: &EconomyTuning) -> Self {
        Self {
            money: economy.initial_money,
            lives: economy.initial_lives,
        }
    }

    /// Money currently held.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Lives currently remaining.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Reports whether the player holds at least `amount`.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        self.money >= amount
    }

    /// Deducts `amount` when affordable. Returns `false` and leaves the
    /// balance untouched otherwise.
    #[must_use]
    pub fn spend(&mut self, amount: u32) -> bool {
        match self.money.checked_sub(amount) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    /// Credits `amount`.
    pub fn earn(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Removes one life, stopping at zero.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Reports whether every life is gone.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.lives == 0
    }

    /// Restores the configured starting resources.
    pub fn reset(&mut self, economy: &EconomyTuning) {
        *self = Self::new(economy);
    }
}
