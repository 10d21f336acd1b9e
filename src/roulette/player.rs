//! Player and chip bookkeeping
//!
//! Bet amounts are in chips. `chip_value` only matters for reporting the cash
//! value of a stack.

use crate::errors::TableError;
use serde::{Deserialize, Serialize};

/// A stack of identical chips
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chips {
    pub count: u64,
    /// Fixed by the first purchase; None until then
    pub value: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    chips: Chips,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chips: Chips::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Buy `count` chips worth `value` each
    pub fn buy_chips(&mut self, count: u64, value: u64) -> Result<(), TableError> {
        match self.chips.value {
            Some(current) if current != value => {
                return Err(TableError::ChipValueMismatch {
                    current,
                    requested: value,
                });
            }
            _ => self.chips.value = Some(value),
        }
        self.chips.count = self.chips.count.saturating_add(count);
        Ok(())
    }

    pub fn balance(&self) -> u64 {
        self.chips.count
    }

    pub fn chip_value(&self) -> Option<u64> {
        self.chips.value
    }

    /// Cash value of the stack
    pub fn total_value(&self) -> u64 {
        self.chips
            .count
            .saturating_mul(self.chips.value.unwrap_or(0))
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        self.chips.count >= amount
    }

    pub fn debit(&mut self, amount: u64) -> Result<(), TableError> {
        if !self.can_afford(amount) {
            return Err(TableError::InsufficientChips {
                player: self.name.clone(),
                balance: self.chips.count,
                amount,
            });
        }
        self.chips.count -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: u64) {
        self.chips.count = self.chips.count.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_chips() {
        let mut player = Player::new("ada");
        assert_eq!(player.chip_value(), None);

        player.buy_chips(100, 5).unwrap();
        player.buy_chips(20, 5).unwrap();

        assert_eq!(player.balance(), 120);
        assert_eq!(player.total_value(), 600);
        assert_eq!(
            player.buy_chips(10, 25),
            Err(TableError::ChipValueMismatch {
                current: 5,
                requested: 25
            })
        );
        assert_eq!(player.balance(), 120);
    }

    #[test]
    fn test_debit_and_credit() {
        let mut player = Player::new("ada");
        player.buy_chips(50, 1).unwrap();

        player.debit(30).unwrap();
        assert_eq!(player.balance(), 20);
        assert!(!player.can_afford(21));
        assert!(matches!(
            player.debit(21),
            Err(TableError::InsufficientChips { balance: 20, amount: 21, .. })
        ));

        player.credit(60);
        assert_eq!(player.balance(), 80);
    }
}
