//! Roulette table round state machine
//!
//! A round moves `Open -> Closed -> settled -> Open`. Bets are only accepted
//! while open, and the per-round ceiling is enforced as each bet arrives, so a
//! rejected bet never changes table state.

use crate::common::traits::OutcomeSource;
use crate::common::types::{Space, TableType};
use crate::errors::TableError;
use crate::roulette::bet::{Bet, BetKind};
use crate::roulette::layout::Layout;
use crate::roulette::player::Player;
use crate::roulette::rules::{BettingRules, KindTally, MultiBetReport};
use crate::roulette::wheel::Wheel;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub type PlacedBetId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BettingPhase {
    Open,
    Closed,
}

/// A bet accepted onto the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedBet {
    pub id: PlacedBetId,
    pub bet: Bet,
    /// Name given at placement
    pub player: Option<String>,
    /// Whether chips were debited from a seated player
    pub tracked: bool,
}

/// Snapshot of the pending bets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetSummary {
    pub phase: BettingPhase,
    pub bet_count: usize,
    pub total_amount: u64,
    pub by_kind: BTreeMap<BetKind, KindTally>,
    pub maximum_total_bet: u64,
    pub remaining: u64,
}

/// How one bet fared in a settled round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetResult {
    pub id: PlacedBetId,
    pub bet: Bet,
    pub player: Option<String>,
    pub won: bool,
    /// Stake plus winnings; zero on a loss
    pub payout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSettlement {
    pub outcome: Space,
    pub results: Vec<BetResult>,
    pub total_staked: u64,
    pub total_paid: u64,
}

impl RoundSettlement {
    /// Amount the house kept; negative when it paid out more than it took
    pub fn house_result(&self) -> i128 {
        i128::from(self.total_staked) - i128::from(self.total_paid)
    }
}

/// One roulette table: rules, wheel, layout, seated players and the pending round
#[derive(Debug)]
pub struct Table {
    rules: BettingRules,
    wheel: Wheel,
    layout: Layout,
    players: BTreeMap<String, Player>,
    pending: Vec<PlacedBet>,
    phase: BettingPhase,
}

impl Table {
    pub fn new(rules: BettingRules) -> Self {
        let table_type = rules.table_type();
        info!(rules = %rules, "Opening table");
        Self {
            rules,
            wheel: Wheel::new(table_type),
            layout: Layout::new(table_type),
            players: BTreeMap::new(),
            pending: Vec::new(),
            phase: BettingPhase::Open,
        }
    }

    /// Table with the shipped rules for its type
    pub fn standard(table_type: TableType) -> Self {
        Self::new(BettingRules::standard(table_type))
    }

    pub fn rules(&self) -> &BettingRules {
        &self.rules
    }

    pub fn table_type(&self) -> TableType {
        self.rules.table_type()
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn add_player(&mut self, player: Player) -> Result<(), TableError> {
        if self.players.contains_key(player.name()) {
            return Err(TableError::DuplicatePlayer(player.name().to_string()));
        }
        debug!(player = player.name(), balance = player.balance(), "Player seated");
        self.players.insert(player.name().to_string(), player);
        Ok(())
    }

    /// Unseat a player. Bets they already placed stay on the table.
    pub fn remove_player(&mut self, name: &str) -> Result<Player, TableError> {
        self.players
            .remove(name)
            .ok_or_else(|| TableError::UnknownPlayer(name.to_string()))
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.get_mut(name)
    }

    pub fn phase(&self) -> BettingPhase {
        self.phase
    }

    pub fn is_betting_open(&self) -> bool {
        self.phase == BettingPhase::Open
    }

    pub fn pending_bets(&self) -> &[PlacedBet] {
        &self.pending
    }

    pub fn total_bet_amount(&self) -> u64 {
        self.pending
            .iter()
            .fold(0u64, |total, placed| total.saturating_add(placed.bet.amount()))
    }

    /// Accept a bet for the current round.
    ///
    /// A named player must be seated and is debited; `None` places an untracked
    /// bet. Nothing changes unless every check passes.
    pub fn place_bet(&mut self, bet: Bet, player: Option<&str>) -> Result<PlacedBetId, TableError> {
        if !self.is_betting_open() {
            return Err(TableError::BettingClosed);
        }

        self.rules.validate_bet(&bet, &self.layout)?;

        let current = self.total_bet_amount();
        let limit = self.rules.maximum_total_bet();
        if current.saturating_add(bet.amount()) > limit {
            debug!(bet = %bet, current, limit, "Bet would exceed round limit");
            return Err(TableError::AggregateLimitExceeded {
                current,
                amount: bet.amount(),
                limit,
            });
        }

        let tracked = match player {
            Some(name) => {
                let seated = self
                    .players
                    .get_mut(name)
                    .ok_or_else(|| TableError::UnknownPlayer(name.to_string()))?;
                seated.debit(bet.amount())?;
                true
            }
            None => false,
        };

        let id = Uuid::new_v4();
        debug!(%id, bet = %bet, player = ?player, tracked, "Bet placed");
        self.pending.push(PlacedBet {
            id,
            bet,
            player: player.map(str::to_string),
            tracked,
        });
        Ok(id)
    }

    /// Stop accepting bets and report on everything pending.
    ///
    /// Violations are reported, not corrected.
    pub fn close_betting(&mut self) -> MultiBetReport {
        self.phase = BettingPhase::Closed;

        let bets: Vec<Bet> = self.pending.iter().map(|placed| placed.bet.clone()).collect();
        let report = self.rules.validate_bets(&bets, &self.layout);
        if !report.valid {
            warn!(errors = ?report.errors, "Pending bets failed validation at close");
        }
        info!(bets = report.bet_count, total = report.total_amount, "Betting closed");
        report
    }

    /// Start a new round. Unsettled bets are voided and tracked stakes refunded.
    pub fn open_betting(&mut self) {
        let voided = std::mem::take(&mut self.pending);
        for placed in voided.iter().filter(|placed| placed.tracked) {
            if let Some(seated) = placed.player.as_deref().and_then(|name| self.players.get_mut(name)) {
                seated.credit(placed.bet.amount());
            }
        }
        if !voided.is_empty() {
            info!(voided = voided.len(), "Unsettled bets voided");
        }
        self.phase = BettingPhase::Open;
        info!("Betting open");
    }

    pub fn bet_summary(&self) -> BetSummary {
        let mut by_kind: BTreeMap<BetKind, KindTally> = BTreeMap::new();
        for placed in &self.pending {
            by_kind.entry(placed.bet.kind()).or_default().add(placed.bet.amount());
        }
        let total_amount = self.total_bet_amount();
        let maximum_total_bet = self.rules.maximum_total_bet();

        BetSummary {
            phase: self.phase,
            bet_count: self.pending.len(),
            total_amount,
            by_kind,
            maximum_total_bet,
            remaining: maximum_total_bet.saturating_sub(total_amount),
        }
    }

    /// Pay out the closed round against `outcome` and reopen betting
    pub fn settle_round(&mut self, outcome: &Space) -> Result<RoundSettlement, TableError> {
        if self.is_betting_open() {
            return Err(TableError::BettingOpen);
        }

        let mut results = Vec::with_capacity(self.pending.len());
        for placed in &self.pending {
            let payout = placed.bet.payout(outcome, &self.rules)?;
            results.push(BetResult {
                id: placed.id,
                bet: placed.bet.clone(),
                player: placed.player.clone(),
                won: placed.bet.is_winner(outcome),
                payout,
            });
        }

        for (placed, result) in self.pending.iter().zip(&results) {
            if !placed.tracked || result.payout == 0 {
                continue;
            }
            if let Some(seated) = placed.player.as_deref().and_then(|name| self.players.get_mut(name)) {
                seated.credit(result.payout);
            }
        }

        let settlement = RoundSettlement {
            outcome: outcome.clone(),
            total_staked: self.total_bet_amount(),
            total_paid: results
                .iter()
                .fold(0u64, |total, result| total.saturating_add(result.payout)),
            results,
        };
        info!(
            outcome = %settlement.outcome,
            staked = settlement.total_staked,
            paid = settlement.total_paid,
            "Round settled"
        );

        self.pending.clear();
        self.phase = BettingPhase::Open;
        Ok(settlement)
    }

    /// Spin the table's wheel and settle the closed round
    pub fn spin_and_settle(&mut self) -> Result<RoundSettlement, TableError> {
        if self.is_betting_open() {
            return Err(TableError::BettingOpen);
        }
        let outcome = self.wheel.spin();
        self.settle_round(&outcome)
    }

    /// Same as [`Table::spin_and_settle`] with a caller-supplied random source
    pub fn spin_and_settle_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<RoundSettlement, TableError> {
        if self.is_betting_open() {
            return Err(TableError::BettingOpen);
        }
        let outcome = self.wheel.spin_with(rng).clone();
        self.settle_round(&outcome)
    }
}

/// Table handle shared between threads; every operation holds the table lock
#[derive(Debug, Clone)]
pub struct SharedTable {
    inner: Arc<Mutex<Table>>,
}

impl SharedTable {
    pub fn new(table: Table) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // No operation panics between its checks and its updates
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn place_bet(&self, bet: Bet, player: Option<&str>) -> Result<PlacedBetId, TableError> {
        self.lock().place_bet(bet, player)
    }

    pub fn close_betting(&self) -> MultiBetReport {
        self.lock().close_betting()
    }

    pub fn open_betting(&self) {
        self.lock().open_betting()
    }

    pub fn settle_round(&self, outcome: &Space) -> Result<RoundSettlement, TableError> {
        self.lock().settle_round(outcome)
    }

    pub fn spin_and_settle(&self) -> Result<RoundSettlement, TableError> {
        self.lock().spin_and_settle()
    }

    pub fn total_bet_amount(&self) -> u64 {
        self.lock().total_bet_amount()
    }

    pub fn bet_summary(&self) -> BetSummary {
        self.lock().bet_summary()
    }

    /// Run several operations under one lock
    pub fn with<T>(&self, f: impl FnOnce(&mut Table) -> T) -> T {
        f(&mut self.lock())
    }
}
