use mockito::Matcher;
use std::sync::Arc;
use std::time::Duration;
use ttlastfm::{LastfmClient, RetryPolicy};
use ttstore::ScrobbleStore;
use ttsync::{Scheduler, SyncEngine, SyncOptions, SyncOutcome};

fn test_options() -> SyncOptions {
    SyncOptions {
        page_limit: 5,
        page_delay: Duration::ZERO,
    }
}

fn client_for(server: &mockito::ServerGuard) -> Arc<LastfmClient> {
    Arc::new(
        LastfmClient::builder()
            .api_key("k")
            .username("alice")
            .base_url(server.url())
            .retry(RetryPolicy::none())
            .build()
            .unwrap(),
    )
}

fn page_body(tracks: &str, total_pages: u32) -> String {
    format!(
        r#"{{"recenttracks": {{"track": [{tracks}], "@attr": {{"totalPages": "{total_pages}"}}}}}}"#
    )
}

fn track_json(artist: &str, track: &str, album: &str, uts: i64) -> String {
    format!(
        r##"{{"name": "{track}", "artist": {{"#text": "{artist}"}},
            "album": {{"#text": "{album}"}}, "date": {{"uts": "{uts}"}}}}"##
    )
}

fn now_playing_json(artist: &str, track: &str) -> String {
    format!(
        r##"{{"name": "{track}", "artist": {{"#text": "{artist}"}},
            "album": {{"#text": ""}}, "@attr": {{"nowplaying": "true"}}}}"##
    )
}

#[tokio::test]
async fn sync_is_idempotent_across_runs() {
    let mut server = mockito::Server::new_async().await;
    let tracks = format!(
        "{},{},{}",
        now_playing_json("Caribou", "Never Come Back"),
        track_json("Caribou", "Odessa", "Swim", 1_700_000_000),
        track_json("Four Tet", "Baby", "Sixteen Oceans", 1_700_000_100),
    );
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded("page".to_string(), "1".to_string()))
        .with_body(page_body(&tracks, 1))
        .expect(2)
        .create_async()
        .await;

    let store = Arc::new(ScrobbleStore::open_in_memory().unwrap());
    let engine = SyncEngine::new(client_for(&server), store.clone(), test_options());

    let first = engine.run().await.unwrap();
    match first {
        SyncOutcome::Completed(report) => {
            assert_eq!(report.pages_processed, 1);
            // The now-playing entry is excluded.
            assert_eq!(report.inserted, 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let second = engine.run().await.unwrap();
    match second {
        SyncOutcome::Completed(report) => assert_eq!(report.inserted, 0),
        other => panic!("unexpected outcome: {other:?}"),
    }

    mock.assert_async().await;
    assert_eq!(store.event_count().unwrap(), 2);
}

#[tokio::test]
async fn pagination_follows_the_reported_page_count() {
    let mut server = mockito::Server::new_async().await;
    for page in 1..=3u32 {
        let uts = 1_700_000_000 + i64::from(page);
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("page".to_string(), page.to_string()))
            .with_body(page_body(&track_json("Caribou", "Odessa", "Swim", uts), 3))
            .expect(1)
            .create_async()
            .await;
    }

    let store = Arc::new(ScrobbleStore::open_in_memory().unwrap());
    let engine = SyncEngine::new(client_for(&server), store.clone(), test_options());

    let outcome = engine.run().await.unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Completed(ttsync::SyncReport {
            pages_processed: 3,
            inserted: 3,
        })
    );
}

#[tokio::test]
async fn an_absurd_page_count_still_terminates_at_the_ceiling() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_body(page_body(
            &track_json("Caribou", "Odessa", "Swim", 1_700_000_000),
            9999,
        ))
        .expect(5)
        .create_async()
        .await;

    let store = Arc::new(ScrobbleStore::open_in_memory().unwrap());
    let engine = SyncEngine::new(client_for(&server), store, test_options());

    let outcome = engine.run().await.unwrap();
    mock.assert_async().await;
    match outcome {
        SyncOutcome::Completed(report) => assert_eq!(report.pages_processed, 5),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn an_empty_page_is_a_successful_run() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_body(page_body("", 1))
        .create_async()
        .await;

    let store = Arc::new(ScrobbleStore::open_in_memory().unwrap());
    let engine = SyncEngine::new(client_for(&server), store.clone(), test_options());

    let outcome = engine.run().await.unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Completed(ttsync::SyncReport {
            pages_processed: 1,
            inserted: 0,
        })
    );
    assert_eq!(store.event_count().unwrap(), 0);
}

#[tokio::test]
async fn a_mid_run_failure_keeps_committed_rows_and_releases_the_lock() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded("page".to_string(), "1".to_string()))
        .with_body(page_body(&track_json("Caribou", "Odessa", "Swim", 1_700_000_000), 3))
        .create_async()
        .await;
    server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded("page".to_string(), "2".to_string()))
        .with_status(500)
        .create_async()
        .await;

    let store = Arc::new(ScrobbleStore::open_in_memory().unwrap());
    let engine = SyncEngine::new(client_for(&server), store.clone(), test_options());

    assert!(engine.run().await.is_err());
    // Page 1 stayed committed and the engine is ready for the next run.
    assert_eq!(store.event_count().unwrap(), 1);
    assert!(!engine.is_running());
}

#[tokio::test]
async fn the_scheduler_fires_an_initial_run() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_body(page_body(&track_json("Caribou", "Odessa", "Swim", 1_700_000_000), 1))
        .create_async()
        .await;

    let store = Arc::new(ScrobbleStore::open_in_memory().unwrap());
    let engine = Arc::new(SyncEngine::new(
        client_for(&server),
        store.clone(),
        test_options(),
    ));
    let handle = Scheduler::spawn(engine, Duration::from_secs(3600));

    // The first tick is immediate; give it a moment to complete.
    for _ in 0..50 {
        if store.event_count().unwrap() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(store.event_count().unwrap(), 1);
    handle.abort();
}
