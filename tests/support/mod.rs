// Shared primitives for one-time server bootstrapping across integration tests.
use neon_drive::domain::SimTuning;
use std::{
    // `Arc` shares the published URL slot with the server thread; `OnceLock` writes it once.
    sync::{Arc, OnceLock},
    // Sleep durations are used in the readiness polling loops.
    time::Duration,
};

// Base URL used by every test once the server has published its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// Guard that runs the bootstrap path exactly once per test binary.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Fast ticks keep polling tests short; the world still advances in whole ticks.
const TEST_TICK_INTERVAL: Duration = Duration::from_millis(5);

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    // Initialize once even when several tests call this concurrently.
    SERVER_READY.get_or_init(|| {
        // Slot the server thread publishes its URL into.
        let published_url = Arc::new(OnceLock::<String>::new());
        // Clone so the spawned thread can write into the same slot.
        let published_url_thread = Arc::clone(&published_url);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            // The server thread owns its own Tokio runtime.
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                // Capture the address the OS actually assigned.
                let addr = listener.local_addr().expect("get local addr");
                // Publish the base URL so tests target the right server.
                let _ = published_url_thread.set(format!("http://{addr}"));
                // Default tuning keeps the four-emitter layout the tests assert on.
                neon_drive::serve(listener, SimTuning::default(), TEST_TICK_INTERVAL)
                    .await
                    .expect("server failed");
            });
        });
        // Block until the URL is published and the port accepts connections.
        wait_for_readiness(published_url);
    });

    // Return the stable URL shared by all tests in this binary.
    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for URL publication, then for the server socket to accept TCP connections.
fn wait_for_readiness(published_url: Arc<OnceLock<String>>) {
    // Poll until the server thread publishes its base URL.
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        // Avoid a tight loop while the background thread starts.
        std::thread::sleep(Duration::from_millis(10));
    };
    // Persist the URL globally so every test gets the same endpoint.
    let _ = SERVER_URL.set(base_url.clone());

    // Strip the scheme so the raw TCP probe can use host:port.
    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    // Retry briefly to avoid racing the bind/accept.
    for _ in 0..100 {
        // A successful connect means the listener is accepting.
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    // Fail loudly rather than letting every test time out on its own.
    panic!("test server did not become ready at {addr}");
}
