// ==========================================
// OF 导入集成测试
// ==========================================
// 测试目标: 文件 → 解析链 → 别名映射 → 行过滤 → 诊断
// ==========================================

mod test_helpers;

use std::io::Write;
use std::sync::Arc;

use pcp_control::domain::{DiagnosticKind, LoadOutcome};
use pcp_control::importer::{ImportError, OrderRepository, DEFAULT_DATE_FORMAT};
use pcp_control::logging;
use test_helpers::{date, export_rows, raw_table, write_temp_csv, EXPORT_HEADERS};

#[test]
fn test_load_semicolon_csv_with_aliases() {
    logging::init_test();
    let rows = export_rows();
    let file = write_temp_csv(EXPORT_HEADERS, &rows).unwrap();

    let repository = OrderRepository::new(DEFAULT_DATE_FORMAT);
    let dataset = repository.load_file(file.path()).unwrap();

    assert_eq!(dataset.outcome, LoadOutcome::Loaded);
    assert_eq!(dataset.summary.total_rows, 8);
    assert_eq!(dataset.summary.kept_rows, 8);
    assert_eq!(dataset.orders.len(), 8);

    let first = &dataset.orders[0];
    assert_eq!(first.order_id, "OF1");
    assert_eq!(first.description.as_deref(), Some("Chassi"));
    assert_eq!(first.sector_code, Some(1));
    assert_eq!(first.balance, 6);
    assert_eq!(first.end_date, None);
    assert_eq!(first.delivery_date, Some(date(2025, 3, 1)));
    assert_eq!(dataset.orders[3].end_date, Some(date(2025, 3, 10)));
    assert!(!dataset.batch_id.is_empty());
    assert_eq!(dataset.content_digest.len(), 64);
}

#[test]
fn test_same_file_is_memoized() {
    let rows = export_rows();
    let file = write_temp_csv(EXPORT_HEADERS, &rows).unwrap();
    let repository = OrderRepository::new(DEFAULT_DATE_FORMAT);

    let first = repository.load_file(file.path()).unwrap();
    let second = repository.load_file(file.path()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    repository.clear_cache();
    let third = repository.load_file(file.path()).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.content_digest, third.content_digest);
    assert_eq!(first.orders, third.orders);
}

#[test]
fn test_missing_required_columns_is_hard_stop() {
    let table = raw_table(&["ORDEM_F", "PLANO"], &[&["OF1", "25001"]]);
    let repository = OrderRepository::new(DEFAULT_DATE_FORMAT);

    let dataset = repository.load(&table);
    assert_eq!(
        dataset.outcome,
        LoadOutcome::MissingColumns {
            columns: vec!["end_date".to_string(), "balance".to_string()]
        }
    );
    assert!(dataset.orders.is_empty());

    match repository.load_strict(&table) {
        Err(ImportError::MissingColumn(columns)) => assert_eq!(columns.len(), 2),
        other => panic!("Expected MissingColumn, got {:?}", other.map(|d| d.outcome.clone())),
    }
}

#[test]
fn test_bad_dates_drop_only_their_rows() {
    let table = raw_table(
        &["ORDEM_F", "SALDO", "INICIO", "FINAL", "PLANO"],
        &[
            &["OF1", "0", "01/02/2025", "03/03/2025", "25001"],
            &["OF2", "2", "31/02/2025", "", "25001"],
            &["OF3", "0", "02/02/2025", "2025-03-04", "25001"],
        ],
    );
    let repository = OrderRepository::new(DEFAULT_DATE_FORMAT);
    let dataset = repository.load(&table);

    let ids: Vec<&str> = dataset.orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(ids, vec!["OF1", "OF3"]);
    assert_eq!(dataset.orders[1].end_date, None);
    assert_eq!(dataset.summary.dropped_rows, 1);
    assert_eq!(dataset.diagnostics_of(DiagnosticKind::DateParseFailure).count(), 2);
    assert_eq!(dataset.diagnostics_of(DiagnosticKind::RowDropped).count(), 1);
}

#[test]
fn test_empty_input_is_distinguishable() {
    let file = write_temp_csv(EXPORT_HEADERS, &[]).unwrap();
    let repository = OrderRepository::new(DEFAULT_DATE_FORMAT);
    let dataset = repository.load_file(file.path()).unwrap();

    assert_eq!(dataset.outcome, LoadOutcome::EmptyInput);
    assert!(dataset.orders.is_empty());
}

#[test]
fn test_unsupported_and_missing_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0u8, 159, 146, 150, 0, 1, 2]).unwrap();
    file.flush().unwrap();

    let repository = OrderRepository::new(DEFAULT_DATE_FORMAT);
    assert!(matches!(
        repository.load_file(file.path()),
        Err(ImportError::UnsupportedFileFormat(_))
    ));
    assert!(matches!(
        repository.load_file("/nonexistent/ofs.xlsx"),
        Err(ImportError::FileNotFound(_))
    ));
}
