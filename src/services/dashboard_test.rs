use super::*;
use crate::net::types::FileStatusRecord;

fn run(id: i64, status: &str) -> RunUpdate {
    RunUpdate { id, status: status.into(), ..Default::default() }
}

#[test]
fn latest_run_picks_highest_id() {
    let latest = latest_run(vec![run(3, "COMPLETED"), run(9, "RUNNING"), run(5, "FAILED")]);
    assert_eq!(latest.map(|r| r.id), Some(9));
    assert!(latest_run(Vec::new()).is_none());
}

#[test]
fn totals_and_readiness() {
    let mut summary = DashboardSummary::default();
    assert_eq!(summary.total_records(), 0);
    assert!(!summary.ready_to_run());

    for (ft, count) in [(FileType::Styles, 10), (FileType::Stores, 4), (FileType::Skus, 30)] {
        summary.files = summary.files.with(ft, FileStatusRecord { exists: true, count, ..Default::default() });
    }
    assert_eq!(summary.total_records(), 44);
    assert!(!summary.ready_to_run());

    summary.files = summary.files.with(FileType::Sales, FileStatusRecord { exists: true, count: 6, ..Default::default() });
    assert_eq!(summary.total_records(), 50);
    assert!(summary.ready_to_run());
}

#[tokio::test]
async fn load_against_unreachable_backend_is_all_fallbacks() {
    let client = ApiClient::with_base_url("http://127.0.0.1:9/api").unwrap();
    let summary = load(&client).await;
    assert_eq!(summary, DashboardSummary::default());
}
