//! Penny Ante - roulette betting rules engine
//!
//! Loads layered table rules (a base TOML file plus an optional overlay),
//! derives per-bet limits, payouts and house edge from them, and validates
//! single bets and whole rounds. A thin table state machine runs rounds on
//! top of the rules with an American or European wheel.
//!
//! ```no_run
//! use penny_ante::{Bet, BetKind, BettingRules, TableType};
//! use penny_ante::roulette::Layout;
//!
//! let rules = BettingRules::standard(TableType::European);
//! let layout = Layout::new(TableType::European);
//! assert!(Bet::outside(BetKind::Red, 10).validate(&rules, &layout).is_ok());
//! assert_eq!(rules.house_edge(BetKind::StraightUp), Ok(2.70));
//! ```

pub mod common;
pub mod config;
pub mod errors;
pub mod roulette;

pub use common::types::{Color, Space, TableType};
pub use config::{ConfigSource, RuleOverlay, RuleSet, RulesLoader};
pub use errors::{BetError, ConfigurationError, RouletteError, RouletteResult, TableError};
pub use roulette::{Bet, BetKind, BettingRules, Player, SharedTable, Table};
