//! Error types for the roulette rules engine
//!
//! Every error here is a deterministic rejection: retrying the same input
//! against the same rules always fails the same way.

use crate::roulette::bet::BetKind;
use std::path::PathBuf;
use thiserror::Error;

/// Root error type for all engine operations
#[derive(Debug, Error)]
pub enum RouletteError {
    /// Rule configuration could not be loaded or saved
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A bet failed validation
    #[error("Bet rejected: {0}")]
    Bet(#[from] BetError),

    /// A table operation was refused
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Single-bet validation errors, in the order the checks run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BetError {
    #[error("Bet amount must be positive")]
    AmountNotPositive,

    #[error("Bet type {0} is not allowed on this table")]
    KindNotOffered(BetKind),

    #[error("Bet amount {amount} is outside allowed range [{minimum}, {maximum}] for {kind}")]
    AmountOutOfRange {
        kind: BetKind,
        amount: u64,
        minimum: u64,
        maximum: u64,
    },

    #[error("Invalid {kind} bet: {detail}")]
    ShapeInvalid { kind: BetKind, detail: String },

    #[error("Invalid space value: {0}")]
    SpaceInvalid(String),

    #[error("Unknown bet selection: {0}")]
    UnknownSelection(String),
}

/// Table state-machine and bookkeeping errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Betting is closed for this round")]
    BettingClosed,

    #[error("Betting is still open; close betting before settling")]
    BettingOpen,

    #[error("Bet of {amount} would exceed maximum total bet limit {limit} (current total {current})")]
    AggregateLimitExceeded { current: u64, amount: u64, limit: u64 },

    #[error("Player {player} has insufficient chips: balance {balance}, bet {amount}")]
    InsufficientChips {
        player: String,
        balance: u64,
        amount: u64,
    },

    #[error("Player {0} is already seated at this table")]
    DuplicatePlayer(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Chip value cannot change from {current} to {requested}")]
    ChipValueMismatch { current: u64, requested: u64 },

    #[error(transparent)]
    Bet(#[from] BetError),
}

/// Convenience type alias for Results
pub type RouletteResult<T> = Result<T, RouletteError>;
