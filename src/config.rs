//! Rule configuration: model, TOML document, overlay merge and loading
//!
//! A table's rules come from a base TOML document (one default file per table
//! type, or an explicit path) with an optional in-memory overlay merged on top.
//! The merged document is checked once and turned into an immutable [`RuleSet`].

use crate::common::types::TableType;
use crate::errors::{ConfigurationError, RouletteResult};
use crate::roulette::bet::BetKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default rules file for American tables
pub const AMERICAN_RULES_PATH: &str = "config/american_rules.toml";

/// Default rules file for European tables
pub const EUROPEAN_RULES_PATH: &str = "config/european_rules.toml";

/// Key of the fallback entry in the ratio sections
pub const GLOBAL_RATIO_KEY: &str = "global";

pub const DEFAULT_MINIMUM_BET: u64 = 1;
pub const DEFAULT_MAXIMUM_BET: u64 = 1_000_000;
pub const DEFAULT_MAXIMUM_TOTAL_BET: u64 = 10_000_000;

const REQUIRED_SECTIONS: [&str; 4] = [
    "payout_ratios",
    "minimum_bet_ratios",
    "maximum_bet_ratios",
    "table_limits",
];

/// Partial rule document merged over the base configuration
pub type RuleOverlay = toml::Table;

/// Where the base rule document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The rules file shipped for a table type
    Default(TableType),
    /// An explicit rules file
    Path(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> PathBuf {
        match self {
            ConfigSource::Default(TableType::American) => PathBuf::from(AMERICAN_RULES_PATH),
            ConfigSource::Default(TableType::European) => PathBuf::from(EUROPEAN_RULES_PATH),
            ConfigSource::Path(path) => path.clone(),
        }
    }
}

/// Bet ratios with an optional `global` fallback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioTable {
    pub global: Option<f64>,
    pub per_kind: BTreeMap<BetKind, f64>,
}

impl RatioTable {
    pub fn new(global: Option<f64>) -> Self {
        Self {
            global,
            per_kind: BTreeMap::new(),
        }
    }

    pub fn with(mut self, kind: BetKind, ratio: f64) -> Self {
        self.per_kind.insert(kind, ratio);
        self
    }

    /// Ratio for a kind: its own entry, then `global`, then 1.0
    pub fn resolve(&self, kind: BetKind) -> f64 {
        self.per_kind
            .get(&kind)
            .copied()
            .or(self.global)
            .unwrap_or(1.0)
    }

    fn from_entries(
        section: &str,
        entries: BTreeMap<String, f64>,
    ) -> Result<Self, ConfigurationError> {
        let mut table = RatioTable::default();
        for (key, ratio) in entries {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(ConfigurationError::Invalid(format!(
                    "{}.{} must be a non-negative number, got {}",
                    section, key, ratio
                )));
            }
            if key == GLOBAL_RATIO_KEY {
                table.global = Some(ratio);
            } else {
                table.per_kind.insert(parse_kind(section, &key)?, ratio);
            }
        }
        Ok(table)
    }

    fn to_entries(&self) -> BTreeMap<String, f64> {
        let mut entries: BTreeMap<String, f64> = self
            .per_kind
            .iter()
            .map(|(kind, ratio)| (kind.as_str().to_string(), *ratio))
            .collect();
        if let Some(global) = self.global {
            entries.insert(GLOBAL_RATIO_KEY.to_string(), global);
        }
        entries
    }
}

/// Table-wide floor, ceiling and per-round aggregate ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLimits {
    pub minimum_bet: u64,
    pub maximum_bet: u64,
    pub maximum_total_bet: u64,
}

impl Default for TableLimits {
    fn default() -> Self {
        Self {
            minimum_bet: DEFAULT_MINIMUM_BET,
            maximum_bet: DEFAULT_MAXIMUM_BET,
            maximum_total_bet: DEFAULT_MAXIMUM_TOTAL_BET,
        }
    }
}

/// Fully resolved rules for one table
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// Units paid per unit staked on a win; a kind missing here is not offered
    pub payout_ratios: BTreeMap<BetKind, u32>,
    pub minimum_bet_ratios: RatioTable,
    pub maximum_bet_ratios: RatioTable,
    pub table_limits: TableLimits,
    pub game_rules: toml::Table,
    pub special_rules: toml::Table,
}

impl RuleSet {
    /// House rules shipped for a table type
    pub fn standard(table_type: TableType) -> Self {
        // Paid as if the wheel had only the 36 numbered pockets
        let payout_ratios = BetKind::ALL
            .into_iter()
            .map(|kind| (kind, 36 / kind.winning_outcomes() - 1))
            .collect();

        let minimum_bet_ratios = BetKind::ALL
            .into_iter()
            .filter(|kind| !kind.is_inside())
            .fold(RatioTable::new(Some(1.0)), |table, kind| table.with(kind, 5.0));

        let maximum_bet_ratios = RatioTable::new(Some(1.0))
            .with(BetKind::StraightUp, 0.5)
            .with(BetKind::Split, 0.75);

        let (table_limits, european) = match table_type {
            TableType::American => (TableLimits::default(), false),
            TableType::European => (
                TableLimits {
                    minimum_bet: 1,
                    maximum_bet: 2_000_000,
                    maximum_total_bet: 20_000_000,
                },
                true,
            ),
        };

        let mut game_rules = toml::Table::new();
        game_rules.insert("en_prison".into(), toml::Value::Boolean(european));
        game_rules.insert("la_partage".into(), toml::Value::Boolean(european));
        game_rules.insert("surrender".into(), toml::Value::Boolean(false));
        game_rules.insert("maximum_repeats".into(), toml::Value::Integer(10));

        let mut special_rules = toml::Table::new();
        special_rules.insert("allow_call_bets".into(), toml::Value::Boolean(false));
        special_rules.insert("allow_neighbor_bets".into(), toml::Value::Boolean(false));
        special_rules.insert("progressive_betting".into(), toml::Value::Boolean(true));
        special_rules.insert("maximum_parlay".into(), toml::Value::Integer(5));

        Self {
            payout_ratios,
            minimum_bet_ratios,
            maximum_bet_ratios,
            table_limits,
            game_rules,
            special_rules,
        }
    }

    /// Parse a complete rule document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        Self::from_table(parse_document(content)?)
    }

    /// Check a merged document and build the rule set from it
    pub fn from_table(table: toml::Table) -> Result<Self, ConfigurationError> {
        if table.is_empty() {
            return Err(ConfigurationError::Invalid(
                "rule document is empty".to_string(),
            ));
        }
        for section in REQUIRED_SECTIONS {
            if !table.contains_key(section) {
                return Err(ConfigurationError::Invalid(format!(
                    "missing required section '{}'",
                    section
                )));
            }
        }

        let document: RuleDocument = toml::Value::Table(table)
            .try_into()
            .map_err(|e| ConfigurationError::Invalid(format!("Failed to parse rules: {}", e)))?;

        Self::from_document(document)
    }

    fn from_document(document: RuleDocument) -> Result<Self, ConfigurationError> {
        let mut payout_ratios = BTreeMap::new();
        for (key, ratio) in required(document.payout_ratios, "payout_ratios")? {
            let kind = parse_kind("payout_ratios", &key)?;
            let ratio = u32::try_from(ratio).map_err(|_| {
                ConfigurationError::Invalid(format!(
                    "payout_ratios.{} must be a non-negative integer, got {}",
                    key, ratio
                ))
            })?;
            payout_ratios.insert(kind, ratio);
        }

        let minimum_bet_ratios = RatioTable::from_entries(
            "minimum_bet_ratios",
            required(document.minimum_bet_ratios, "minimum_bet_ratios")?,
        )?;
        let maximum_bet_ratios = RatioTable::from_entries(
            "maximum_bet_ratios",
            required(document.maximum_bet_ratios, "maximum_bet_ratios")?,
        )?;
        let table_limits = required(document.table_limits, "table_limits")?.resolve()?;

        Ok(Self {
            payout_ratios,
            minimum_bet_ratios,
            maximum_bet_ratios,
            table_limits,
            game_rules: document.game_rules,
            special_rules: document.special_rules,
        })
    }

    fn to_document(&self) -> RuleDocument {
        RuleDocument {
            payout_ratios: Some(
                self.payout_ratios
                    .iter()
                    .map(|(kind, ratio)| (kind.as_str().to_string(), i64::from(*ratio)))
                    .collect(),
            ),
            minimum_bet_ratios: Some(self.minimum_bet_ratios.to_entries()),
            maximum_bet_ratios: Some(self.maximum_bet_ratios.to_entries()),
            table_limits: Some(LimitsDocument::from(self.table_limits)),
            game_rules: self.game_rules.clone(),
            special_rules: self.special_rules.clone(),
        }
    }

    /// Serialize as a rules file
    pub fn to_toml_string(&self) -> Result<String, ConfigurationError> {
        toml::to_string_pretty(&self.to_document())
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize rules: {}", e)))
    }

    /// Write as a rules file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RouletteResult<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;

        fs::write(path, content).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path.display(), e))
                .into()
        })
    }
}

/// Rules loaded from a source, plus what they were loaded for
#[derive(Debug, Clone)]
pub struct LoadedRules {
    pub rules: RuleSet,
    pub table_type: TableType,
    /// File the base document was read from
    pub source_path: PathBuf,
}

/// Loads a base rule document and applies an optional overlay
#[derive(Debug, Clone)]
pub struct RulesLoader {
    table_type: TableType,
    source: ConfigSource,
    overlay: Option<RuleOverlay>,
}

impl RulesLoader {
    /// Loader for the default rules of a table type
    pub fn new(table_type: TableType) -> Self {
        Self {
            table_type,
            source: ConfigSource::Default(table_type),
            overlay: None,
        }
    }

    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.source = source;
        self
    }

    /// Read the base document from an explicit file
    pub fn with_path<P: AsRef<Path>>(self, path: P) -> Self {
        self.with_source(ConfigSource::Path(path.as_ref().to_path_buf()))
    }

    pub fn with_overlay(mut self, overlay: RuleOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn load(&self) -> RouletteResult<LoadedRules> {
        let path = resolve_path(&self.source.path())?;
        let mut document = self.load_from_file(&path)?;

        if let Some(overlay) = &self.overlay {
            debug!(sections = overlay.len(), "Applying rule overlay");
            merge_overlay(&mut document, overlay);
        }

        let rules = RuleSet::from_table(document)?;
        info!(
            table_type = %self.table_type,
            path = %path.display(),
            offered_kinds = rules.payout_ratios.len(),
            "Loaded betting rules"
        );

        Ok(LoadedRules {
            rules,
            table_type: self.table_type,
            source_path: path,
        })
    }

    fn load_from_file(&self, path: &Path) -> Result<toml::Table, ConfigurationError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigurationError::Invalid(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let document = parse_document(&content)?;
        if document.is_empty() {
            return Err(ConfigurationError::Invalid(format!(
                "{} contains no rules",
                path.display()
            )));
        }
        Ok(document)
    }
}

/// Merge overlay sections into a base document, one level deep.
///
/// Where both sides hold a table, overlay entries win and unnamed base entries
/// survive. Anything else is replaced wholesale.
pub fn merge_overlay(base: &mut toml::Table, overlay: &RuleOverlay) {
    for (key, value) in overlay {
        if let (Some(toml::Value::Table(section)), toml::Value::Table(entries)) =
            (base.get_mut(key), value)
        {
            for (name, entry) in entries {
                section.insert(name.clone(), entry.clone());
            }
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// Write the shipped rules for a table type, creating parent directories
pub fn write_default_config<P: AsRef<Path>>(path: P, table_type: TableType) -> RouletteResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            ConfigurationError::SaveFailed(format!(
                "Failed to create {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    RuleSet::standard(table_type).save(path)?;
    info!(table_type = %table_type, path = %path.display(), "Wrote default rules");
    Ok(())
}

/// Try the path as given, then relative to the crate root
fn resolve_path(path: &Path) -> Result<PathBuf, ConfigurationError> {
    resolve_path_in(path, Path::new(env!("CARGO_MANIFEST_DIR")))
}

fn resolve_path_in(path: &Path, root: &Path) -> Result<PathBuf, ConfigurationError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if path.is_relative() {
        let rooted = root.join(path);
        if rooted.is_file() {
            return Ok(rooted);
        }
    }
    Err(ConfigurationError::NotFound {
        path: path.to_path_buf(),
    })
}

fn parse_document(content: &str) -> Result<toml::Table, ConfigurationError> {
    toml::from_str(content)
        .map_err(|e| ConfigurationError::Invalid(format!("Failed to parse TOML: {}", e)))
}

fn parse_kind(section: &str, key: &str) -> Result<BetKind, ConfigurationError> {
    key.parse().map_err(|_| {
        ConfigurationError::Invalid(format!("{} has unknown bet type '{}'", section, key))
    })
}

fn required<T>(section: Option<T>, name: &str) -> Result<T, ConfigurationError> {
    section.ok_or_else(|| ConfigurationError::Invalid(format!("missing required section '{}'", name)))
}

/// On-disk shape of a rules file
#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    payout_ratios: Option<BTreeMap<String, i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_bet_ratios: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum_bet_ratios: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table_limits: Option<LimitsDocument>,
    #[serde(default)]
    game_rules: toml::Table,
    #[serde(default)]
    special_rules: toml::Table,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LimitsDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_bet: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum_bet: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum_total_bet: Option<i64>,
}

impl LimitsDocument {
    fn resolve(self) -> Result<TableLimits, ConfigurationError> {
        let limit = |name: &str, value: Option<i64>, default: u64| match value {
            None => Ok(default),
            Some(value) => u64::try_from(value).map_err(|_| {
                ConfigurationError::Invalid(format!(
                    "table_limits.{} must not be negative, got {}",
                    name, value
                ))
            }),
        };

        let limits = TableLimits {
            minimum_bet: limit("minimum_bet", self.minimum_bet, DEFAULT_MINIMUM_BET)?,
            maximum_bet: limit("maximum_bet", self.maximum_bet, DEFAULT_MAXIMUM_BET)?,
            maximum_total_bet: limit(
                "maximum_total_bet",
                self.maximum_total_bet,
                DEFAULT_MAXIMUM_TOTAL_BET,
            )?,
        };

        if limits.minimum_bet > limits.maximum_bet {
            return Err(ConfigurationError::Invalid(format!(
                "table_limits.minimum_bet {} exceeds maximum_bet {}",
                limits.minimum_bet, limits.maximum_bet
            )));
        }
        Ok(limits)
    }
}

impl From<TableLimits> for LimitsDocument {
    fn from(limits: TableLimits) -> Self {
        let clamp = |value: u64| i64::try_from(value).unwrap_or(i64::MAX);
        Self {
            minimum_bet: Some(clamp(limits.minimum_bet)),
            maximum_bet: Some(clamp(limits.maximum_bet)),
            maximum_total_bet: Some(clamp(limits.maximum_total_bet)),
        }
    }
}
