//! Roulette game components
//!
//! Bets and the rules that judge them, plus the wheel, layout, players and
//! the table that runs a round.

pub mod bet;
pub mod layout;
pub mod player;
pub mod rules;
pub mod table;
pub mod wheel;

pub use bet::{Bet, BetKind};
pub use layout::Layout;
pub use player::{Chips, Player};
pub use rules::{BettingRules, KindTally, MultiBetReport, TableInfo};
pub use table::{
    BetResult, BetSummary, BettingPhase, PlacedBet, PlacedBetId, RoundSettlement, SharedTable,
    Table,
};
pub use wheel::Wheel;
