use declarations_common::observability::init_tracing;
use declarations_common::resilience::MockClock;
use declarations_domain::{BreakerSettings, EndpointConfig, SubmissionConfig};
use declarations_infra::DeclarationClient;
use wiremock::{MockServer, Request};

pub const LEGACY_PATH: &str = "/declarations/passengerdeclaration/v1";
pub const MODERNIZED_PATH: &str = "/passengerdeclaration/v1";
pub const LEGACY_TOKEN: &str = "legacy-token";
pub const MODERNIZED_TOKEN: &str = "modernized-token";

/// Both integrations pointed at the same mock server; they differ by path
/// and bearer token.
pub fn submission_config(
    server: &MockServer,
    modernized_enabled: bool,
    max_failures: u64,
    reset_timeout_secs: u64,
) -> SubmissionConfig {
    SubmissionConfig {
        legacy: EndpointConfig {
            base_url: server.uri(),
            path: None,
            bearer_token: LEGACY_TOKEN.to_string(),
        },
        modernized: EndpointConfig {
            base_url: server.uri(),
            path: None,
            bearer_token: MODERNIZED_TOKEN.to_string(),
        },
        modernized_enabled,
        circuit_breaker: BreakerSettings { max_failures, reset_timeout_secs },
        request_timeout_secs: 5,
    }
}

/// Client with a controllable clock. Also installs a `RUST_LOG`-driven
/// subscriber so failing scenarios show the client's events.
pub fn client(
    server: &MockServer,
    modernized_enabled: bool,
    max_failures: u64,
) -> (DeclarationClient<MockClock>, MockClock) {
    init_tracing("warn");
    let clock = MockClock::new();
    let config = submission_config(server, modernized_enabled, max_failures, 30);
    let client =
        DeclarationClient::with_clock(&config, clock.clone()).expect("client should build");
    (client, clock)
}

pub async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.expect("request recording should be enabled")
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|value| value.to_str().ok())
}
