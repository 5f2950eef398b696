// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use meno_stats::config::Config;
use meno_stats::db::{Db, FirestoreDb, MemoryDb};
use meno_stats::routes::create_router;
use meno_stats::services::{Sampler, SiteClient};
use meno_stats::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> Db {
    FirestoreDb::new_mock().into()
}

/// Create an in-memory store.
#[allow(dead_code)]
pub fn test_db_memory() -> Db {
    MemoryDb::new().into()
}

/// Create a test app over an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_memory();

    let state = Arc::new(AppState { config, db });

    (create_router(state.clone()), state)
}

/// Create a test app whose store is unreachable.
#[allow(dead_code)]
pub fn create_offline_test_app() -> axum::Router {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: test_db_offline(),
    });
    create_router(state)
}

// ─── Fake Game Site ──────────────────────────────────────────

#[derive(Default)]
struct SitePages {
    online: Option<String>,
    /// Profile pages by account id
    profiles: HashMap<u64, String>,
    requests: Vec<String>,
}

/// A local stand-in for the game site.
///
/// Serves `/stats` and `/profile/view,{aid}`; anything not configured is a 404.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FakeSite {
    pages: Arc<Mutex<SitePages>>,
    pub base_url: String,
}

#[allow(dead_code)]
impl FakeSite {
    /// Start the server on an ephemeral port.
    pub async fn start() -> Self {
        let pages = Arc::new(Mutex::new(SitePages::default()));
        let app = Router::new()
            .route("/stats", get(serve_online))
            .fallback(serve_profile)
            .with_state(pages.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake site");
        let addr = listener.local_addr().expect("fake site address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake site server");
        });

        Self {
            pages,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn set_online_page(&self, html: impl Into<String>) {
        self.pages.lock().unwrap().online = Some(html.into());
    }

    pub fn set_profile_page(&self, account_id: u64, html: impl Into<String>) {
        self.pages
            .lock()
            .unwrap()
            .profiles
            .insert(account_id, html.into());
    }

    /// Paths requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.pages.lock().unwrap().requests.clone()
    }

    pub fn client(&self) -> SiteClient {
        SiteClient::new(&self.base_url, Duration::from_secs(2)).expect("site client")
    }

    /// A sampler over `db` that scans every block of the online page.
    pub fn sampler(&self, db: Db) -> Sampler {
        Sampler::new(db, self.client(), 0..9, Duration::from_millis(10))
    }
}

async fn serve_online(State(pages): State<Arc<Mutex<SitePages>>>) -> Response {
    let mut pages = pages.lock().unwrap();
    pages.requests.push("/stats".to_string());
    match pages.online.clone() {
        Some(html) => html.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve_profile(State(pages): State<Arc<Mutex<SitePages>>>, uri: Uri) -> Response {
    let mut pages = pages.lock().unwrap();
    pages.requests.push(uri.path().to_string());
    let page = uri
        .path()
        .strip_prefix("/profile/view,")
        .and_then(|aid| aid.parse::<u64>().ok())
        .and_then(|aid| pages.profiles.get(&aid).cloned());
    match page {
        Some(html) => html.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ─── Page Builders ───────────────────────────────────────────

/// Online page with one `news-body` block per entry of `blocks`, each
/// holding profile links for the given (aid, cid, world) triples.
#[allow(dead_code)]
pub fn online_page(blocks: &[&[(u64, u64, &str)]]) -> String {
    let body: String = blocks
        .iter()
        .map(|links| {
            let anchors: String = links
                .iter()
                .map(|(aid, cid, world)| {
                    format!(
                        "<a href=\"https://www.margonem.pl/profile/view,{aid}#char_{cid},{world}\">x</a>"
                    )
                })
                .collect();
            format!("<div class=\"news-body\">{anchors}</div>")
        })
        .collect();
    format!("<html><body>{body}</body></html>")
}

/// One character entry of an account profile page.
#[allow(dead_code)]
pub fn profile_entry(cid: u64, nick: &str, level: &str, profession: &str) -> String {
    let lead = "background-image: url('";
    let style = format!(
        "{lead}{}/obrazki/postacie/w/woj.gif');",
        "x".repeat(70 - lead.len())
    );
    format!(
        r#"<li class="char-row" data-id="{cid}">
            <span class="cimg" style="{style}"></span>
            <input type="hidden" class="chnick" value="{nick}">
            <input type="hidden" class="chlvl" value="{level}">
            <input type="hidden" class="chprof" value="{profession}">
        </li>"#
    )
}

/// Account profile page wrapping `entries`.
#[allow(dead_code)]
pub fn profile_page(entries: &[String]) -> String {
    format!("<html><body><ul>{}</ul></body></html>", entries.concat())
}
