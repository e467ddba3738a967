// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: config_kv 持久化 → EngineConfig → 会话行为
// ==========================================

mod test_helpers;

use pcp_control::app::AppState;
use pcp_control::config::{config_keys, ConfigManager, EngineConfig};
use pcp_control::domain::types::{BoardSchema, StatusRule, WindowKind};
use pcp_control::engine::Selections;
use test_helpers::{create_test_db, export_table, insert_test_config, today};

#[test]
fn test_defaults_on_fresh_db() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    let config = manager.load_engine_config().unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.status_rule, StatusRule::Balance);
    assert_eq!(config.board_schema, BoardSchema::Pipeline);
    assert_eq!(config.date_format, "%d/%m/%Y");
    assert_eq!(config.sector_ranking_limit, 5);
    assert_eq!(config.latest_closed_limit, 10);
    assert_eq!(config.default_window, WindowKind::Monthly);
}

#[test]
fn test_persisted_values_survive_reopen() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::STATUS_RULE, "END_DATE").unwrap();
    insert_test_config(&db_path, config_keys::DEFAULT_WINDOW, "YEARLY").unwrap();

    let manager = ConfigManager::new(&db_path).unwrap();
    let config = manager.load_engine_config().unwrap();
    assert_eq!(config.status_rule, StatusRule::EndDate);
    assert_eq!(config.default_window, WindowKind::Yearly);

    let snapshot: serde_json::Value =
        serde_json::from_str(&manager.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot["engine/status_rule"], "END_DATE");
}

#[test]
fn test_config_drives_dashboard_defaults() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::DEFAULT_WINDOW, "WEEKLY").unwrap();
    insert_test_config(&db_path, config_keys::SECTOR_RANKING_LIMIT, "1").unwrap();
    insert_test_config(&db_path, config_keys::LATEST_CLOSED_LIMIT, "2").unwrap();

    let state = AppState::new(db_path).unwrap();
    state.dashboard_api.load_table(&export_table(), today()).unwrap();

    let outcome = state.dashboard_api.report(&Selections::none(), None).unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.window, WindowKind::Weekly);
    assert_eq!(report.closures.len(), 8);
    assert_eq!(report.latest_closed.len(), 2);
    assert!(report.sector_rankings.iter().all(|r| r.entries.len() == 1));
}

#[test]
fn test_custom_date_format() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::DATE_FORMAT, "%Y-%m-%d").unwrap();

    let state = AppState::new(db_path).unwrap();
    let table = test_helpers::raw_table(
        &["ORDEM_F", "SALDO", "FINAL", "PLANO"],
        &[&["OF1", "0", "2025-03-09", "25001"]],
    );
    state.dashboard_api.load_table(&table, today()).unwrap();

    let kpis = state.dashboard_api.kpis(&Selections::none()).unwrap();
    assert_eq!(kpis.closed_yesterday, 1);
}
