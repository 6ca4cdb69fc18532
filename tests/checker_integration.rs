//! End-to-end tests: real HTTP probes against mock endpoints, and the status
//! server queried over TCP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use simplcheck::config::loader::{parse_config, Format};
use simplcheck::config::Config;
use simplcheck::health::{CheckError, Checker, FetchError, Fetcher, HttpFetcher, State};
use simplcheck::http::StatusServer;
use simplcheck::lifecycle::{RestartPolicy, Shutdown, Supervisor};

mod common;

fn url(addr: SocketAddr) -> String {
    format!("http://{}/", addr)
}

#[tokio::test]
async fn http_fetcher_reports_status_codes() {
    let ok = common::start_mock_backend(200).await;
    let broken = common::start_mock_backend(503).await;
    let fetcher = HttpFetcher::new().unwrap();

    assert_eq!(fetcher.fetch(&url(ok), Duration::from_secs(2)).await, Ok(200));
    assert_eq!(fetcher.fetch(&url(broken), Duration::from_secs(2)).await, Ok(503));
}

#[tokio::test]
async fn http_fetcher_times_out_on_stalled_endpoint() {
    let stalled = common::start_stalled_backend().await;
    let fetcher = HttpFetcher::new().unwrap();

    let timeout = Duration::from_millis(100);
    assert_eq!(
        fetcher.fetch(&url(stalled), timeout).await,
        Err(FetchError::Timeout(timeout))
    );
}

#[tokio::test]
async fn checker_tracks_flapping_endpoint() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let flapping = common::start_programmable_backend(move || {
        let counter = counter.clone();
        async move {
            // Two passes, then failures.
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => (200, "up".into()),
                _ => (500, "down".into()),
            }
        }
    })
    .await;

    let endpoint = url(flapping);
    let checker = Checker::new(Arc::new(HttpFetcher::new().unwrap()));
    checker
        .load_config(&Config::new(Duration::from_secs(5), [endpoint.clone()]))
        .await;

    let streaks: Vec<(State, u64)> = {
        let mut out = Vec::new();
        for _ in 0..4 {
            let status = checker.check(&endpoint).await.unwrap();
            out.push((status.state, status.streak));
        }
        out
    };
    assert_eq!(
        streaks,
        vec![
            (State::Passing, 1),
            (State::Passing, 2),
            (State::Failing, 1),
            (State::Failing, 2),
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn unreachable_endpoint_is_recorded_as_failing() {
    let endpoint = url(common::closed_port());
    let checker = Checker::new(Arc::new(HttpFetcher::new().unwrap()));
    checker
        .load_config(&Config::new(Duration::from_secs(5), [endpoint.clone()]))
        .await;

    let err = checker.check(&endpoint).await.unwrap_err();
    let CheckError::Fetch { status, source } = err else {
        panic!("expected fetch failure");
    };
    assert_eq!((status.state, status.streak), (State::Failing, 1));
    assert!(matches!(source, FetchError::Transport(_)));
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn status_server_reports_live_checks() {
    let up = url(common::start_mock_backend(200).await);
    let down = url(common::start_mock_backend(500).await);

    let document = format!(
        r#"{{"settings": {{"interval": "50ms", "timeout": "1s"}}, "applications": ["{up}", "{down}"]}}"#
    );
    let config = parse_config(&document, Format::Json).unwrap();

    let checker = Arc::new(Checker::new(Arc::new(HttpFetcher::new().unwrap())));
    checker.load_config(&config).await;

    let shutdown = Shutdown::new();
    let supervisor = Supervisor::new(RestartPolicy::default(), shutdown.clone());
    let run_checker = checker.clone();
    let supervised = tokio::spawn(async move {
        supervisor
            .supervise("checker", move |signal| run_checker.clone().run(signal))
            .await
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr = listener.local_addr().unwrap();
    let server = tokio::spawn(StatusServer::new(checker.clone()).run(listener, shutdown.subscribe()));

    let report_checker = checker.clone();
    let settled = common::eventually(Duration::from_secs(5), move || {
        let checker = report_checker.clone();
        async move { checker.report().await.iter().all(|s| s.streak >= 2) }
    })
    .await;
    assert!(settled, "checks did not run: {:?}", checker.report().await);

    let client = common::client();
    let base = format!("http://{}", server_addr);

    let text = client.get(&base).send().await.unwrap();
    assert_eq!(text.status(), 200);
    let body = text.text().await.unwrap();
    assert!(body.contains(&format!("{up}: passing for the past")), "{body}");
    assert!(body.contains(&format!("{down}: failing for the past")), "{body}");

    let html = client
        .get(&base)
        .header("accept", "text/html")
        .send()
        .await
        .unwrap();
    assert!(html.headers()["content-type"].to_str().unwrap().starts_with("text/html"));
    assert!(html.text().await.unwrap().contains("<ul>"));

    let json: serde_json::Value = client
        .get(format!("{base}/?format=json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.get("last_error").is_none()));

    let missing = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(missing.status(), 404);

    shutdown.trigger();
    server.await.unwrap().unwrap();
    supervised.await.unwrap().unwrap();
}

#[tokio::test]
async fn reload_restarts_streaks_for_new_endpoints() {
    let first = url(common::start_mock_backend(200).await);
    let second = url(common::start_mock_backend(200).await);

    let checker = Checker::new(Arc::new(HttpFetcher::new().unwrap()));
    checker
        .load_config(&Config::new(Duration::from_secs(5), [first.clone()]))
        .await;
    checker.check(&first).await.unwrap();
    checker.check(&first).await.unwrap();

    let toml = format!("applications = [\"{second}\"]\n\n[settings]\ninterval = \"1s\"\n");
    checker.load_config(&parse_config(&toml, Format::Toml).unwrap()).await;

    assert!(matches!(
        checker.check(&first).await,
        Err(CheckError::UnconfiguredEndpoint(_))
    ));
    let status = checker.check(&second).await.unwrap();
    assert_eq!((status.state, status.streak), (State::Passing, 1));
    assert_eq!(checker.settings().interval, Duration::from_secs(1));
}
