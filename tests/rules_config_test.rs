//! Rule loading, overlays and derived limits against real rule files

use penny_ante::{
    config::{write_default_config, RuleOverlay},
    roulette::Layout,
    Bet, BetError, BetKind, BettingRules, ConfigSource, ConfigurationError, RouletteError,
    RuleSet, RulesLoader, TableType,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn overlay(content: &str) -> RuleOverlay {
    toml::from_str(content).expect("overlay parses")
}

fn rules_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write rules");
    file
}

#[test]
fn test_default_american_rules() {
    let rules = BettingRules::from_source(
        TableType::American,
        ConfigSource::Default(TableType::American),
        None,
    )
    .unwrap();

    assert_eq!(rules.payout_ratio(BetKind::StraightUp), Ok(35));
    assert_eq!(rules.minimum_bet_ratio(BetKind::Red), 5.0);
    assert_eq!(rules.minimum_bet_ratio(BetKind::Black), 5.0);
    assert_eq!(rules.table_maximum(), 1_000_000);
    assert_eq!(rules.total_pockets(), 38);
    assert!(!rules.is_game_rule_enabled("en_prison"));
}

#[test]
fn test_default_european_rules() {
    let rules = BettingRules::from_source(
        TableType::European,
        ConfigSource::Default(TableType::European),
        None,
    )
    .unwrap();

    assert_eq!(rules.table_maximum(), 2_000_000);
    assert!(rules.is_game_rule_enabled("en_prison"));
    assert_eq!(rules.house_edge(BetKind::Red), Ok(2.70));
}

#[test]
fn test_empty_overlay_changes_nothing() {
    let base = RulesLoader::new(TableType::American).load().unwrap();
    let overlaid = RulesLoader::new(TableType::American)
        .with_overlay(RuleOverlay::new())
        .load()
        .unwrap();

    assert_eq!(overlaid.rules, base.rules);
}

#[test]
fn test_overlay_changes_only_named_keys() {
    let base = RulesLoader::new(TableType::American).load().unwrap().rules;
    let overlaid = RulesLoader::new(TableType::American)
        .with_overlay(overlay("[payout_ratios]\nstraight_up = 40\n"))
        .load()
        .unwrap()
        .rules;

    assert_eq!(overlaid.payout_ratios[&BetKind::StraightUp], 40);

    let mut expected = base.clone();
    expected.payout_ratios.insert(BetKind::StraightUp, 40);
    assert_eq!(overlaid, expected);
}

#[test]
fn test_overlay_limits_and_ratios() {
    let rules = BettingRules::load(&RulesLoader::new(TableType::American).with_overlay(overlay(
        r#"
[table_limits]
minimum_bet = 10

[minimum_bet_ratios]
red = 2.5
"#,
    )))
    .unwrap();

    assert_eq!(rules.table_minimum(), 10);
    assert_eq!(rules.table_maximum(), 1_000_000);
    assert_eq!(rules.minimum_bet(BetKind::Red), 25);
    assert_eq!(rules.minimum_bet(BetKind::Black), 50);
    assert_eq!(rules.minimum_bet(BetKind::StraightUp), 10);
}

#[test]
fn test_overlay_can_break_required_sections() {
    let result = RulesLoader::new(TableType::American)
        .with_overlay(overlay("table_limits = 5\n"))
        .load();

    assert!(matches!(
        result,
        Err(RouletteError::Configuration(ConfigurationError::Invalid(_)))
    ));
}

#[test]
fn test_custom_file_without_total_limit() {
    let file = rules_file(
        r#"
[payout_ratios]
straight_up = 35
red = 1

[minimum_bet_ratios]
global = 1.0

[maximum_bet_ratios]
global = 1.0

[table_limits]
minimum_bet = 5
maximum_bet = 500
"#,
    );

    let rules = BettingRules::from_source(
        TableType::European,
        ConfigSource::Path(file.path().to_path_buf()),
        None,
    )
    .unwrap();

    assert_eq!(rules.maximum_total_bet(), 10_000_000);
    assert_eq!(rules.table_type(), TableType::European);
}

#[test]
fn test_missing_section_in_file() {
    let file = rules_file("[payout_ratios]\nred = 1\n");

    let result = RulesLoader::new(TableType::American).with_path(file.path()).load();
    match result {
        Err(RouletteError::Configuration(ConfigurationError::Invalid(message))) => {
            assert!(message.contains("minimum_bet_ratios"), "{}", message)
        }
        other => panic!("expected invalid configuration, got {:?}", other),
    }
}

#[test]
fn test_empty_file_is_invalid() {
    let file = rules_file("");

    assert!(matches!(
        RulesLoader::new(TableType::American).with_path(file.path()).load(),
        Err(RouletteError::Configuration(ConfigurationError::Invalid(_)))
    ));
}

#[test]
fn test_missing_file_reports_path() {
    let error = RulesLoader::new(TableType::American)
        .with_path("missing/rules.toml")
        .load()
        .unwrap_err();

    assert!(error.to_string().contains("missing/rules.toml"));
}

#[test]
fn test_kind_gating_from_file() {
    let file = rules_file(
        r#"
[payout_ratios]
red = 1

[minimum_bet_ratios]
global = 1.0

[maximum_bet_ratios]
global = 1.0

[table_limits]
minimum_bet = 1
maximum_bet = 100
"#,
    );
    let rules = BettingRules::load(&RulesLoader::new(TableType::American).with_path(file.path()))
        .unwrap();
    let layout = Layout::new(TableType::American);

    assert!(Bet::outside(BetKind::Red, 10).validate(&rules, &layout).is_ok());
    assert_eq!(
        Bet::color("black", 10).unwrap().validate(&rules, &layout),
        Err(BetError::KindNotOffered(BetKind::Black))
    );
}

#[test]
fn test_written_defaults_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules").join("european.toml");

    write_default_config(&path, TableType::European).unwrap();
    let loaded = RulesLoader::new(TableType::European).with_path(&path).load().unwrap();

    assert_eq!(loaded.rules, RuleSet::standard(TableType::European));
    assert_eq!(loaded.source_path, path);
}
