//! End-to-end tests of the dashboard client against a live server

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use courtside_dashboard::dashboard::{
    extract_props, filter_and_sort, DashboardClient, Poller, PredictionsOutcome, PropFilter,
    SortKey,
};
use courtside_dashboard::db::Table;
use courtside_dashboard::models::{Outcome, Wallet};
use courtside_dashboard::{routes, AppState, Config, MemoryStore, Store};

fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        allowed_origins: vec![],
        environment: "test".to_string(),
        supabase_url: Some("https://test.supabase.co".to_string()),
        supabase_key: Some("test-key".to_string()),
        database_url: None,
        session_secret: "test-session-secret".to_string(),
        session_ttl_secs: 3600,
        log_requests: false,
    }
}

/// Serve the router on an ephemeral port, returning its base URL
async fn spawn_server(store: Arc<MemoryStore>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::router(AppState::new(store, test_config()));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_client_reads_predictions_and_builds_props() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert(
            Table::PredictionsStore,
            vec![json!({
                "league": "nba",
                "updated_at": "2026-01-05T14:30:00+00:00",
                "data": {
                    "games": [{
                        "matchup": "Nuggets @ Suns",
                        "away": "Nuggets",
                        "home": "Suns",
                        "away_details": { "code": "DEN" },
                        "home_details": { "code": "PHX" },
                        "props": [
                            {
                                "id": 203999,
                                "name": "Nikola Jokic",
                                "pts": 29.8,
                                "team_label": "A"
                            },
                            {
                                "name": "Devin Booker",
                                "pts": 26.2,
                                "team_label": "H",
                                "trace": ["usage spike"]
                            }
                        ]
                    }]
                }
            })],
            "league",
        )
        .await
        .unwrap();

    let client = DashboardClient::new(spawn_server(store).await).unwrap();

    let payload = match client.predictions("nba", Some("safe"), None).await.unwrap() {
        PredictionsOutcome::Ready(payload) => payload,
        PredictionsOutcome::Unavailable(body) => panic!("unexpected not-found: {body:?}"),
    };
    assert_eq!(payload["lastUpdated"], "2026-01-05T14:30:00+00:00");

    let props = filter_and_sort(extract_props(&payload), &PropFilter::default(), SortKey::Edge);
    assert_eq!(props.len(), 2);
    // 29.8 -> line 28.5 (edge 1.3); 26.2 -> line 24.5 (edge 1.7)
    assert_eq!(props[0].name, "Devin Booker");
    assert_eq!(props[0].team_code.as_deref(), Some("PHX"));
    assert!(props[0].usage_boost);
    assert_eq!(props[1].line, 28.5);
}

#[tokio::test]
async fn test_client_reports_unavailable_league() {
    let store = Arc::new(MemoryStore::new());
    let client = DashboardClient::new(spawn_server(store).await).unwrap();

    match client.predictions("acb", None, Some("2026-01-05")).await.unwrap() {
        PredictionsOutcome::Unavailable(body) => assert_eq!(body.league, "acb"),
        PredictionsOutcome::Ready(payload) => panic!("unexpected payload: {payload}"),
    }
}

#[tokio::test]
async fn test_client_reads_wallets_and_audit() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert(
            Table::Settings,
            vec![json!({ "key": "wallets", "value": "[{\"type\":\"BTC\",\"address\":\"1ABC\"}]" })],
            "key",
        )
        .await
        .unwrap();
    store
        .upsert(
            Table::AuditSummary,
            vec![json!({ "league": "nba", "wins": 5, "losses": 3, "pushes": 1, "win_pct": 62.5 })],
            "league",
        )
        .await
        .unwrap();
    store
        .insert(
            Table::PredictionsHistory,
            json!({
                "game_date": "2026-01-04",
                "matchup": "Lakers @ Celtics",
                "market_total": 228.5,
                "actual_total": 228.5,
                "is_win": null,
                "status": "graded"
            }),
        )
        .await
        .unwrap();

    let client = DashboardClient::new(spawn_server(store).await).unwrap();

    let wallets = client.wallets().await.unwrap();
    assert_eq!(
        wallets,
        vec![Wallet {
            kind: "BTC".to_string(),
            address: "1ABC".to_string()
        }]
    );

    let report = client.audit().await.unwrap();
    assert_eq!(report.league("nba").map(|m| m.wins), Some(5));
    assert_eq!(report.recent.len(), 1);
    assert_eq!(report.recent[0].outcome(), Outcome::Push);
}

#[tokio::test]
async fn test_poller_refreshes_from_server() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert(
            Table::PredictionsStore,
            vec![json!({ "league": "nba", "data": { "games": [] } })],
            "league",
        )
        .await
        .unwrap();

    let client = DashboardClient::new(spawn_server(store).await).unwrap();
    let refreshes = Arc::new(AtomicUsize::new(0));
    let counter = refreshes.clone();

    let poller = Poller::start(Duration::from_millis(25), move || {
        let client = client.clone();
        let counter = counter.clone();
        async move {
            if let PredictionsOutcome::Ready(_) = client.predictions("nba", None, None).await? {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            Ok::<(), courtside_dashboard::dashboard::ClientError>(())
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    poller.stop().await;

    assert!(refreshes.load(Ordering::SeqCst) >= 2);
}
