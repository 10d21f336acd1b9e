//! Bet shapes and wagers
//!
//! A [`Bet`] is an immutable value: kind, covered spaces and amount. Whether it
//! is legal at a given table is decided by
//! [`BettingRules`](crate::roulette::rules::BettingRules).

use crate::common::traits::SpaceLookup;
use crate::common::types::{Space, RED_NUMBERS};
use crate::errors::BetError;
use crate::roulette::rules::BettingRules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Every wager shape offered by a roulette layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    // Inside bets
    StraightUp,
    Split,
    Street,
    Corner,
    SixLine,

    // Outside bets
    Red,
    Black,
    Odd,
    Even,
    High,
    Low,
    FirstDozen,
    SecondDozen,
    ThirdDozen,
    FirstColumn,
    SecondColumn,
    ThirdColumn,
}

impl BetKind {
    pub const ALL: [BetKind; 17] = [
        BetKind::StraightUp,
        BetKind::Split,
        BetKind::Street,
        BetKind::Corner,
        BetKind::SixLine,
        BetKind::Red,
        BetKind::Black,
        BetKind::Odd,
        BetKind::Even,
        BetKind::High,
        BetKind::Low,
        BetKind::FirstDozen,
        BetKind::SecondDozen,
        BetKind::ThirdDozen,
        BetKind::FirstColumn,
        BetKind::SecondColumn,
        BetKind::ThirdColumn,
    ];

    /// Configuration key for this kind
    pub fn as_str(self) -> &'static str {
        match self {
            BetKind::StraightUp => "straight_up",
            BetKind::Split => "split",
            BetKind::Street => "street",
            BetKind::Corner => "corner",
            BetKind::SixLine => "six_line",
            BetKind::Red => "red",
            BetKind::Black => "black",
            BetKind::Odd => "odd",
            BetKind::Even => "even",
            BetKind::High => "high",
            BetKind::Low => "low",
            BetKind::FirstDozen => "first_dozen",
            BetKind::SecondDozen => "second_dozen",
            BetKind::ThirdDozen => "third_dozen",
            BetKind::FirstColumn => "first_column",
            BetKind::SecondColumn => "second_column",
            BetKind::ThirdColumn => "third_column",
        }
    }

    pub fn is_inside(self) -> bool {
        self.arity().is_some()
    }

    /// Number of spaces an inside bet must name; None for outside bets
    pub fn arity(self) -> Option<usize> {
        match self {
            BetKind::StraightUp => Some(1),
            BetKind::Split => Some(2),
            BetKind::Street => Some(3),
            BetKind::Corner => Some(4),
            BetKind::SixLine => Some(6),
            _ => None,
        }
    }

    /// How many pockets win for this kind, independent of wheel variant
    pub fn winning_outcomes(self) -> u32 {
        match self {
            BetKind::StraightUp => 1,
            BetKind::Split => 2,
            BetKind::Street => 3,
            BetKind::Corner => 4,
            BetKind::SixLine => 6,
            BetKind::Red
            | BetKind::Black
            | BetKind::Odd
            | BetKind::Even
            | BetKind::High
            | BetKind::Low => 18,
            BetKind::FirstDozen
            | BetKind::SecondDozen
            | BetKind::ThirdDozen
            | BetKind::FirstColumn
            | BetKind::SecondColumn
            | BetKind::ThirdColumn => 12,
        }
    }

    /// Numbers covered by an outside bet; empty for inside bets
    pub fn covered_numbers(self) -> Vec<u8> {
        let numbers = 1u8..=36;
        match self {
            BetKind::Red => RED_NUMBERS.to_vec(),
            BetKind::Black => numbers.filter(|n| !RED_NUMBERS.contains(n)).collect(),
            BetKind::Odd => numbers.filter(|n| n % 2 == 1).collect(),
            BetKind::Even => numbers.filter(|n| n % 2 == 0).collect(),
            BetKind::High => (19..=36).collect(),
            BetKind::Low => (1..=18).collect(),
            BetKind::FirstDozen => (1..=12).collect(),
            BetKind::SecondDozen => (13..=24).collect(),
            BetKind::ThirdDozen => (25..=36).collect(),
            BetKind::FirstColumn => numbers.filter(|n| n % 3 == 1).collect(),
            BetKind::SecondColumn => numbers.filter(|n| n % 3 == 2).collect(),
            BetKind::ThirdColumn => numbers.filter(|n| n % 3 == 0).collect(),
            _ => Vec::new(),
        }
    }

    /// Precomputed space set of an outside bet
    pub fn fixed_spaces(self) -> Option<BTreeSet<String>> {
        if self.is_inside() {
            return None;
        }
        Some(self.covered_numbers().iter().map(u8::to_string).collect())
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetKind {
    type Err = BetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BetError::UnknownSelection(s.to_string()))
    }
}

/// A wager on one bet shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    kind: BetKind,
    spaces: BTreeSet<String>,
    amount: u64,
}

impl Bet {
    /// Build a bet. An outside kind given no spaces takes its fixed space set.
    pub fn new<I, S>(kind: BetKind, spaces: I, amount: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spaces: BTreeSet<String> = spaces.into_iter().map(Into::into).collect();
        if spaces.is_empty() {
            if let Some(fixed) = kind.fixed_spaces() {
                spaces = fixed;
            }
        }
        Self {
            kind,
            spaces,
            amount,
        }
    }

    /// Build a bet and reject it unless the rules accept it on `layout`
    pub fn checked<I, S, L>(
        kind: BetKind,
        spaces: I,
        amount: u64,
        rules: &BettingRules,
        layout: &L,
    ) -> Result<Self, BetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        L: SpaceLookup,
    {
        let bet = Self::new(kind, spaces, amount);
        rules.validate_bet(&bet, layout)?;
        Ok(bet)
    }

    pub fn straight_up(space: &str, amount: u64) -> Self {
        Self::new(BetKind::StraightUp, [space], amount)
    }

    pub fn split(first: &str, second: &str, amount: u64) -> Self {
        Self::new(BetKind::Split, [first, second], amount)
    }

    pub fn street(spaces: [&str; 3], amount: u64) -> Self {
        Self::new(BetKind::Street, spaces, amount)
    }

    pub fn corner(spaces: [&str; 4], amount: u64) -> Self {
        Self::new(BetKind::Corner, spaces, amount)
    }

    pub fn six_line(spaces: [&str; 6], amount: u64) -> Self {
        Self::new(BetKind::SixLine, spaces, amount)
    }

    /// Outside bet with its fixed space set
    pub fn outside(kind: BetKind, amount: u64) -> Self {
        Self::new(kind, Vec::<String>::new(), amount)
    }

    /// "red" or "black", case-insensitive
    pub fn color(color: &str, amount: u64) -> Result<Self, BetError> {
        let kind = match color.to_ascii_lowercase().as_str() {
            "red" => BetKind::Red,
            "black" => BetKind::Black,
            _ => return Err(BetError::UnknownSelection(format!("color {}", color))),
        };
        Ok(Self::outside(kind, amount))
    }

    /// Dozen 1, 2 or 3
    pub fn dozen(dozen: u8, amount: u64) -> Result<Self, BetError> {
        let kind = match dozen {
            1 => BetKind::FirstDozen,
            2 => BetKind::SecondDozen,
            3 => BetKind::ThirdDozen,
            _ => return Err(BetError::UnknownSelection(format!("dozen {}", dozen))),
        };
        Ok(Self::outside(kind, amount))
    }

    /// Column 1, 2 or 3
    pub fn column(column: u8, amount: u64) -> Result<Self, BetError> {
        let kind = match column {
            1 => BetKind::FirstColumn,
            2 => BetKind::SecondColumn,
            3 => BetKind::ThirdColumn,
            _ => return Err(BetError::UnknownSelection(format!("column {}", column))),
        };
        Ok(Self::outside(kind, amount))
    }

    pub fn kind(&self) -> BetKind {
        self.kind
    }

    pub fn spaces(&self) -> &BTreeSet<String> {
        &self.spaces
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Check this bet against a table's rules and layout
    pub fn validate<L: SpaceLookup>(&self, rules: &BettingRules, layout: &L) -> Result<(), BetError> {
        rules.validate_bet(self, layout)
    }

    /// Whether the ball landing on `outcome` wins this bet
    pub fn is_winner(&self, outcome: &Space) -> bool {
        self.spaces.contains(&outcome.value)
    }

    /// Stake plus winnings on a win, zero on a loss
    pub fn payout(&self, outcome: &Space, rules: &BettingRules) -> Result<u64, BetError> {
        let ratio = rules.payout_ratio(self.kind)?;
        if !self.is_winner(outcome) {
            return Ok(0);
        }
        Ok(self
            .amount
            .saturating_mul(u64::from(ratio))
            .saturating_add(self.amount))
    }

    /// Grid positions of the covered spaces that exist on the layout
    pub fn layout_positions<L: SpaceLookup>(&self, layout: &L) -> Vec<(usize, usize)> {
        self.spaces
            .iter()
            .filter_map(|space| layout.position(space))
            .collect()
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spaces: Vec<&str> = self.spaces.iter().map(String::as_str).collect();
        write!(f, "{} bet on {:?} for {}", self.kind, spaces, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(value: &str) -> Space {
        Space::new(value, 0)
    }

    #[test]
    fn test_kind_keys_round_trip() {
        for kind in BetKind::ALL {
            assert_eq!(kind.as_str().parse::<BetKind>(), Ok(kind));
        }
        assert!("outside_bets".parse::<BetKind>().is_err());
    }

    #[test]
    fn test_outside_sets_have_expected_sizes() {
        for kind in BetKind::ALL.into_iter().filter(|k| !k.is_inside()) {
            let spaces = kind.fixed_spaces().expect("outside kind has fixed spaces");
            assert_eq!(spaces.len() as u32, kind.winning_outcomes(), "{}", kind);
        }
        assert!(BetKind::Corner.fixed_spaces().is_none());
    }

    #[test]
    fn test_columns() {
        assert_eq!(BetKind::FirstColumn.covered_numbers()[..3], [1, 4, 7]);
        assert_eq!(BetKind::SecondColumn.covered_numbers().last(), Some(&35));
        assert_eq!(BetKind::ThirdColumn.covered_numbers().last(), Some(&36));
    }

    #[test]
    fn test_color_bet_factory() {
        let bet = Bet::color("RED", 10).unwrap();
        assert_eq!(bet.kind(), BetKind::Red);
        assert_eq!(bet.spaces().len(), 18);
        assert!(bet.spaces().contains("1"));
        assert!(!bet.spaces().contains("2"));

        assert!(matches!(Bet::color("green", 10), Err(BetError::UnknownSelection(_))));
    }

    #[test]
    fn test_dozen_and_column_selection() {
        assert_eq!(Bet::dozen(2, 5).unwrap().kind(), BetKind::SecondDozen);
        assert_eq!(Bet::column(3, 5).unwrap().kind(), BetKind::ThirdColumn);
        assert!(Bet::dozen(4, 5).is_err());
        assert!(Bet::column(0, 5).is_err());
    }

    #[test]
    fn test_caller_spaces_kept_for_outside_kind() {
        let bet = Bet::new(BetKind::Red, ["2"], 10);
        assert_eq!(bet.spaces().len(), 1);
    }

    #[test]
    fn test_winning_checks() {
        let straight = Bet::straight_up("17", 10);
        assert!(straight.is_winner(&outcome("17")));
        assert!(!straight.is_winner(&outcome("18")));

        let even = Bet::outside(BetKind::Even, 10);
        assert!(even.is_winner(&outcome("36")));
        assert!(!even.is_winner(&outcome("0")));
        assert!(!even.is_winner(&outcome("00")));

        let high = Bet::outside(BetKind::High, 10);
        assert!(high.is_winner(&outcome("19")));
        assert!(!high.is_winner(&outcome("18")));
    }

    #[test]
    fn test_layout_positions() {
        use crate::common::types::TableType;
        use crate::roulette::layout::Layout;

        let layout = Layout::new(TableType::European);
        let corner = Bet::corner(["1", "2", "4", "5"], 10);
        assert_eq!(corner.layout_positions(&layout), vec![(0, 1), (1, 1), (0, 2), (1, 2)]);

        let with_double_zero = Bet::split("0", "00", 10);
        assert_eq!(with_double_zero.layout_positions(&layout), vec![(0, 0)]);
    }

    #[test]
    fn test_checked_rejects_at_construction() {
        use crate::common::types::TableType;
        use crate::roulette::layout::Layout;

        let rules = BettingRules::standard(TableType::American);
        let layout = Layout::new(TableType::American);

        let bet = Bet::checked(BetKind::StraightUp, ["17"], 10, &rules, &layout).unwrap();
        assert_eq!(bet, Bet::straight_up("17", 10));
        let red = Bet::checked(BetKind::Red, Vec::<String>::new(), 10, &rules, &layout).unwrap();
        assert_eq!(red.spaces().len(), 18);

        assert_eq!(
            Bet::checked(BetKind::StraightUp, ["17"], 0, &rules, &layout),
            Err(BetError::AmountNotPositive)
        );
        assert_eq!(
            Bet::checked(BetKind::StraightUp, ["37"], 10, &rules, &layout),
            Err(BetError::SpaceInvalid("37".to_string()))
        );
        assert!(matches!(
            Bet::checked(BetKind::StraightUp, ["17"], 600_000, &rules, &layout),
            Err(BetError::AmountOutOfRange { maximum: 500_000, .. })
        ));
        assert!(matches!(
            Bet::checked(BetKind::Split, ["17"], 10, &rules, &layout),
            Err(BetError::ShapeInvalid { kind: BetKind::Split, .. })
        ));
    }

    #[test]
    fn test_display() {
        let bet = Bet::split("17", "18", 25);
        assert_eq!(bet.to_string(), "split bet on [\"17\", \"18\"] for 25");
    }
}
