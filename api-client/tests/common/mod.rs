use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use hirelane_api_client::Client;
use hirelane_api_client::DEFAULT_REQUEST_TIMEOUT;
use hirelane_api_client::MemorySessionStore;
use hirelane_api_client::NavigationNotifier;
use wiremock::Match;
use wiremock::MockServer;
use wiremock::Request;

/// Counts login redirects so tests can assert the side effect fired exactly
/// as often as expected.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl NavigationNotifier for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct TestClient {
    pub server: MockServer,
    pub client: Client,
    pub store: Arc<MemorySessionStore>,
    pub navigator: Arc<RecordingNavigator>,
}

pub async fn start() -> TestClient {
    start_with_timeout(DEFAULT_REQUEST_TIMEOUT).await
}

pub async fn start_with_timeout(timeout: Duration) -> TestClient {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = Client::builder()
        .base_url(server.uri())
        .session_store(store.clone())
        .navigator(navigator.clone())
        .request_timeout(timeout)
        .build();
    TestClient {
        server,
        client,
        store,
        navigator,
    }
}

/// Matches requests that do not carry the header at all.
pub fn without_header(name: &'static str) -> impl Match {
    WithoutHeader { name }
}

struct WithoutHeader {
    name: &'static str,
}

impl Match for WithoutHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key(self.name)
    }
}
