// ==========================================
// 端到端: 花名册 → 订单导入 → 看板 → 报告 → 索赔 → 导出
// ==========================================
// 本文件内所有测试使用默认语言 (en)
// ==========================================

mod test_helpers;

use otif_monitor::api::ApiError;
use otif_monitor::app::AppState;
use otif_monitor::config::config_keys;
use otif_monitor::domain::{ClaimFilter, DateRange, OtifStatus};
use otif_monitor::engine::PeriodPreset;
use test_helpers::{create_test_db, d, order_line, write_orders_csv, write_roster_csv};

struct Fixture {
    _db: tempfile::NamedTempFile,
    _roster: tempfile::NamedTempFile,
    orders: tempfile::NamedTempFile,
    state: AppState,
}

fn fixture() -> Fixture {
    let (db, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let roster = write_roster_csv(&[
        (10, "Alfa Componentes S.L.", "Alfa", "compras@alfa.example"),
        (20, "Beta Envases S.A.", "", ""),
    ]);
    state.supplier_api.load_roster(roster.path()).unwrap();

    let orders = write_orders_csv(&[
        // 2024-05: Alfa 1/1 合规
        order_line("PC-050", 10, d(2024, 5, 14), Some(d(2024, 5, 14)), 10.0, 0.0),
        // 2024-06: Alfa 准时 + 宽限 + 未交；Beta 迟到 + 提前
        order_line("PC-100", 10, d(2024, 6, 3), Some(d(2024, 6, 3)), 10.0, 0.0),
        order_line("PC-101", 10, d(2024, 6, 10), Some(d(2024, 6, 12)), 10.0, 0.0),
        order_line("PC-102", 10, d(2024, 6, 12), None, 10.0, 10.0),
        order_line("PC-200", 20, d(2024, 6, 5), Some(d(2024, 6, 15)), 40.0, 0.0),
        order_line("PC-201", 20, d(2024, 6, 20), Some(d(2024, 6, 18)), 40.0, 0.0),
    ]);

    Fixture {
        _db: db,
        _roster: roster,
        orders,
        state,
    }
}

fn now() -> chrono::NaiveDateTime {
    d(2024, 6, 28).and_hms_opt(8, 0, 0).unwrap()
}

#[tokio::test]
async fn test_dashboard_for_current_month() {
    let fx = fixture();
    let lines = fx
        .state
        .dashboard_api
        .load_orders(vec![fx.orders.path().to_path_buf()])
        .await
        .unwrap();
    let classified = fx.state.dashboard_api.classify(&lines).unwrap();

    let statuses: Vec<OtifStatus> = classified.iter().map(|l| l.status).collect();
    assert_eq!(
        statuses,
        vec![
            OtifStatus::OnTimeInFull,
            OtifStatus::OnTimeInFull,
            OtifStatus::GraceException,
            OtifStatus::NotDelivered,
            OtifStatus::Late,
            OtifStatus::Early,
        ]
    );

    let view = fx
        .state
        .dashboard_api
        .dashboard(&classified, PeriodPreset::CurrentMonth, now().date())
        .unwrap();

    assert_eq!(view.range, DateRange::new(d(2024, 6, 1), d(2024, 6, 20)));
    assert_eq!(view.summary.total_lines, 5);
    assert_eq!(view.summary.otif_lines, 2);
    assert_eq!(view.summary.otif_pct, 40.0);

    let comparison = view.comparison.unwrap();
    assert_eq!(comparison.previous_otif_pct, 100.0);
    assert_eq!(comparison.delta, -60.0);

    // %OTIF 降序: Alfa 66.67 > Beta Envases 0
    let names: Vec<&str> = view.supplier_metrics.iter().map(|m| m.supplier_name.as_str()).collect();
    assert_eq!(names, vec!["Alfa", "Beta Envases S.A."]);
    assert_eq!(view.supplier_metrics[0].otif_pct, 66.67);
}

#[tokio::test]
async fn test_supplier_report_and_export() {
    let fx = fixture();
    let lines = fx
        .state
        .dashboard_api
        .load_orders(vec![fx.orders.path().to_path_buf()])
        .await
        .unwrap();
    let classified = fx.state.dashboard_api.classify(&lines).unwrap();
    let window = fx
        .state
        .dashboard_api
        .resolve_period(&classified, PeriodPreset::WholePeriod, now().date())
        .unwrap();

    let bundle = fx
        .state
        .report_api
        .supplier_report(&classified, "Alfa", window, now())
        .unwrap();
    assert_eq!(bundle.report.total_lines, 4);
    assert_eq!(bundle.report.not_delivered.len(), 1);
    assert_eq!(bundle.email.as_deref(), Some("compras@alfa.example"));
    assert!(bundle.mailto.unwrap().starts_with("mailto:compras@alfa.example?subject="));
    assert!(bundle.html.contains("PC-102"));
    assert_eq!(bundle.file_name, "otif_report_Alfa_20240628.html");

    let missing = fx
        .state
        .report_api
        .supplier_report(&classified, "Gamma", window, now());
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("metrics.csv");
    let rows = fx
        .state
        .report_api
        .export_supplier_metrics(&classified, window, &path)
        .unwrap();
    assert_eq!(rows, 2);
    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_claims_and_grace_days_change() {
    let fx = fixture();
    let lines = fx
        .state
        .dashboard_api
        .load_orders(vec![fx.orders.path().to_path_buf()])
        .await
        .unwrap();
    let classified = fx.state.dashboard_api.classify(&lines).unwrap();

    let overview = fx
        .state
        .report_api
        .pending_claims(&classified, &ClaimFilter::default(), now().date());
    assert_eq!(overview.claims.len(), 1);
    assert_eq!(overview.claims[0].days_overdue, 16);

    let batch = fx
        .state
        .report_api
        .claim_letters(&classified, &ClaimFilter::default(), now())
        .unwrap();
    assert_eq!(batch.letters.len(), 1);
    assert!(batch.letters[0].body.contains("PC-102"));

    // 宽限天数改为 0 后宽限迟到变为迟到
    fx.state
        .config_api
        .update_config(config_keys::GRACE_DAYS, "0")
        .unwrap();
    let reclassified = fx.state.dashboard_api.classify(&lines).unwrap();
    assert_eq!(reclassified[2].status, OtifStatus::Late);
    assert!(!reclassified[2].is_otif);
}
