//! Betting rules engine
//!
//! Turns a [`RuleSet`] into concrete per-kind limits, payouts and house edge,
//! and decides whether bets are legal. Every query here is pure: the rules are
//! fixed for the lifetime of the table that owns them.

use crate::common::traits::SpaceLookup;
use crate::common::types::{is_house_space, TableType};
use crate::config::{ConfigSource, RuleOverlay, RuleSet, RulesLoader};
use crate::errors::{BetError, RouletteResult};
use crate::roulette::bet::{Bet, BetKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Share of the aggregate ceiling at which a batch draws a warning, in tenths
const CEILING_WARNING_TENTHS: u128 = 9;

/// Per-kind count and stake
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTally {
    pub count: usize,
    pub total_amount: u64,
}

impl KindTally {
    pub fn add(&mut self, amount: u64) {
        self.count += 1;
        self.total_amount = self.total_amount.saturating_add(amount);
    }
}

/// Outcome of validating a batch of bets together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiBetReport {
    pub valid: bool,
    pub bet_count: usize,
    pub total_amount: u64,
    pub by_kind: BTreeMap<BetKind, KindTally>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for MultiBetReport {
    fn default() -> Self {
        Self {
            valid: true,
            bet_count: 0,
            total_amount: 0,
            by_kind: BTreeMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Summary of a table's rules
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub table_type: TableType,
    pub minimum_bet: u64,
    pub maximum_bet: u64,
    pub maximum_total_bet: u64,
    pub payout_ratios: BTreeMap<BetKind, u32>,
    /// House edge in percent for every offered kind
    pub house_edge_calculated: BTreeMap<BetKind, f64>,
    pub total_pockets: u32,
    pub game_rules: toml::Table,
    pub special_rules: toml::Table,
}

/// Rules for one table instance
#[derive(Debug, Clone, PartialEq)]
pub struct BettingRules {
    table_type: TableType,
    rules: RuleSet,
}

impl BettingRules {
    pub fn new(table_type: TableType, rules: RuleSet) -> Self {
        Self { table_type, rules }
    }

    /// Shipped rules for a table type, without touching the filesystem
    pub fn standard(table_type: TableType) -> Self {
        Self::new(table_type, RuleSet::standard(table_type))
    }

    pub fn load(loader: &RulesLoader) -> RouletteResult<Self> {
        let loaded = loader.load()?;
        Ok(Self::new(loaded.table_type, loaded.rules))
    }

    /// Load from a source with an optional overlay
    pub fn from_source(
        table_type: TableType,
        source: ConfigSource,
        overlay: Option<RuleOverlay>,
    ) -> RouletteResult<Self> {
        let mut loader = RulesLoader::new(table_type).with_source(source);
        if let Some(overlay) = overlay {
            loader = loader.with_overlay(overlay);
        }
        Self::load(&loader)
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    /// Units paid per unit staked; absent kinds are not offered
    pub fn payout_ratio(&self, kind: BetKind) -> Result<u32, BetError> {
        self.rules
            .payout_ratios
            .get(&kind)
            .copied()
            .ok_or(BetError::KindNotOffered(kind))
    }

    pub fn is_bet_allowed(&self, kind: BetKind) -> bool {
        self.rules.payout_ratios.contains_key(&kind)
    }

    pub fn minimum_bet_ratio(&self, kind: BetKind) -> f64 {
        self.rules.minimum_bet_ratios.resolve(kind)
    }

    pub fn maximum_bet_ratio(&self, kind: BetKind) -> f64 {
        self.rules.maximum_bet_ratios.resolve(kind)
    }

    pub fn minimum_bet(&self, kind: BetKind) -> u64 {
        scale(self.table_minimum(), self.minimum_bet_ratio(kind))
    }

    pub fn maximum_bet(&self, kind: BetKind) -> u64 {
        scale(self.table_maximum(), self.maximum_bet_ratio(kind))
    }

    pub fn table_minimum(&self) -> u64 {
        self.rules.table_limits.minimum_bet
    }

    pub fn table_maximum(&self) -> u64 {
        self.rules.table_limits.maximum_bet
    }

    /// Ceiling on the total staked in one round
    pub fn maximum_total_bet(&self) -> u64 {
        self.rules.table_limits.maximum_total_bet
    }

    pub fn total_pockets(&self) -> u32 {
        self.table_type.pocket_count()
    }

    /// House edge in percent, rounded to two decimals
    pub fn house_edge(&self, kind: BetKind) -> Result<f64, BetError> {
        let payout = f64::from(self.payout_ratio(kind)?);
        let probability = f64::from(kind.winning_outcomes()) / f64::from(self.total_pockets());
        let edge = (1.0 - probability * (payout + 1.0)) * 100.0;
        Ok((edge * 100.0).round() / 100.0)
    }

    pub fn game_rule(&self, name: &str) -> Option<&toml::Value> {
        self.rules.game_rules.get(name)
    }

    pub fn special_rule(&self, name: &str) -> Option<&toml::Value> {
        self.rules.special_rules.get(name)
    }

    /// True only for a rule present and set to `true`
    pub fn is_game_rule_enabled(&self, name: &str) -> bool {
        matches!(self.game_rule(name), Some(toml::Value::Boolean(true)))
    }

    pub fn is_special_rule_enabled(&self, name: &str) -> bool {
        matches!(self.special_rule(name), Some(toml::Value::Boolean(true)))
    }

    /// Check one bet: amount, kind, limits, shape, then spaces
    pub fn validate_bet<L: SpaceLookup>(&self, bet: &Bet, layout: &L) -> Result<(), BetError> {
        let result = self.check_bet(bet, layout);
        if let Err(error) = &result {
            debug!(bet = %bet, error = %error, "Bet rejected");
        }
        result
    }

    fn check_bet<L: SpaceLookup>(&self, bet: &Bet, layout: &L) -> Result<(), BetError> {
        let kind = bet.kind();
        let amount = bet.amount();

        if amount == 0 {
            return Err(BetError::AmountNotPositive);
        }

        self.payout_ratio(kind)?;

        let (minimum, maximum) = (self.minimum_bet(kind), self.maximum_bet(kind));
        if amount < minimum || amount > maximum {
            return Err(BetError::AmountOutOfRange {
                kind,
                amount,
                minimum,
                maximum,
            });
        }

        match kind.arity() {
            Some(arity) if bet.spaces().len() != arity => {
                return Err(BetError::ShapeInvalid {
                    kind,
                    detail: format!("expected {} spaces, got {}", arity, bet.spaces().len()),
                });
            }
            Some(_) => {}
            None => {
                if kind.fixed_spaces().as_ref() != Some(bet.spaces()) {
                    return Err(BetError::ShapeInvalid {
                        kind,
                        detail: "outside bets cover a fixed set of numbers".to_string(),
                    });
                }
            }
        }

        for space in bet.spaces() {
            if !is_house_space(space) && !layout.contains(space) {
                return Err(BetError::SpaceInvalid(space.clone()));
            }
        }

        Ok(())
    }

    /// Validate bets together. Reports every failing bet and the aggregate
    /// ceiling; never changes any state.
    pub fn validate_bets<L: SpaceLookup>(&self, bets: &[Bet], layout: &L) -> MultiBetReport {
        let mut report = MultiBetReport::default();

        for (index, bet) in bets.iter().enumerate() {
            report.bet_count += 1;
            report.total_amount = report.total_amount.saturating_add(bet.amount());
            report.by_kind.entry(bet.kind()).or_default().add(bet.amount());

            if let Err(error) = self.validate_bet(bet, layout) {
                report.valid = false;
                report.errors.push(format!("Bet {}: {}", index + 1, error));
            }
        }

        let ceiling = self.maximum_total_bet();
        if report.total_amount > ceiling {
            report.valid = false;
            report.errors.push(format!(
                "Total bet amount {} exceeds maximum total bet limit {}",
                report.total_amount, ceiling
            ));
        } else if report.total_amount > 0
            && u128::from(report.total_amount) * 10 >= u128::from(ceiling) * CEILING_WARNING_TENTHS
        {
            warn!(
                total = report.total_amount,
                limit = ceiling,
                "Round total is close to the table limit"
            );
            report.warnings.push(format!(
                "Total bet amount {} is within 10% of maximum total bet limit {}",
                report.total_amount, ceiling
            ));
        }

        report
    }

    pub fn table_info(&self) -> TableInfo {
        let house_edge_calculated = self
            .rules
            .payout_ratios
            .keys()
            .filter_map(|kind| self.house_edge(*kind).ok().map(|edge| (*kind, edge)))
            .collect();

        TableInfo {
            table_type: self.table_type,
            minimum_bet: self.table_minimum(),
            maximum_bet: self.table_maximum(),
            maximum_total_bet: self.maximum_total_bet(),
            payout_ratios: self.rules.payout_ratios.clone(),
            house_edge_calculated,
            total_pockets: self.total_pockets(),
            game_rules: self.rules.game_rules.clone(),
            special_rules: self.rules.special_rules.clone(),
        }
    }
}

impl fmt::Display for BettingRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rules: bets {} to {}, round limit {}",
            self.table_type,
            self.table_minimum(),
            self.table_maximum(),
            self.maximum_total_bet()
        )
    }
}

fn scale(limit: u64, ratio: f64) -> u64 {
    (limit as f64 * ratio).floor() as u64
}
