//! Declaration submission client
//!
//! Each call runs the same pipeline:
//! 1. route to the legacy or modernized integration
//! 2. build headers (a missing amendment correlation id fails here)
//! 3. refine the payload (a missing amendment body fails here, a schema
//!    failure short-circuits to `ParsingException`)
//! 4. assemble the HTTP request (a value that is not a legal header fails
//!    here)
//! 5. send it through the integration's circuit breaker
//!
//! Steps 1-4 never touch the network or the breaker, so bad client data can
//! not open a circuit.

use async_trait::async_trait;
use chrono::Utc;
use declarations_common::resilience::{
    CircuitBreakerConfig, CircuitBreakerMetrics, CircuitBreakerRegistry, Clock, ResilienceError,
    SystemClock,
};
use declarations_core::submission::{
    CanonicalPayload, DeclarationSubmitter, EndpointRouter, HeaderBuilder, PayloadRefiner, Route,
    RoutingTarget, SubmissionContext, SubmissionHeaders,
};
use declarations_domain::constants::HEADER_AUTHORIZATION;
use declarations_domain::{
    Declaration, DeclarationResponse, DeclarationsError, EndpointKind, PreconditionViolation,
    Result, SubmissionConfig, SubmissionOutcome, SubmissionPayload,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, StatusCode};
use tracing::{debug, info, instrument, warn};

use super::errors::SubmissionFailure;
use crate::http::HttpClient;

/// Submits declarations to the configured downstream integration.
///
/// Holds the routing decision, the HTTP transport and one circuit breaker per
/// [`EndpointKind`] for its whole lifetime. Construct it once at startup and
/// share it.
pub struct DeclarationClient<C: Clock + Clone = SystemClock> {
    router: EndpointRouter,
    headers: HeaderBuilder,
    refiner: PayloadRefiner,
    http: HttpClient,
    breakers: CircuitBreakerRegistry<EndpointKind, C>,
}

impl DeclarationClient<SystemClock> {
    pub fn new(config: &SubmissionConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> DeclarationClient<C> {
    /// Create a client whose breakers use `clock` (useful for testing).
    pub fn with_clock(config: &SubmissionConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let breaker_config = CircuitBreakerConfig::builder()
            .failure_threshold(config.circuit_breaker.max_failures)
            .cool_down(config.circuit_breaker.reset_timeout())
            .build()
            .map_err(|e| DeclarationsError::Config(e.to_string()))?;
        let breakers = CircuitBreakerRegistry::with_clock(breaker_config, clock)
            .map_err(|e| DeclarationsError::Config(e.to_string()))?;

        let http = HttpClient::builder().timeout(config.request_timeout()).build()?;
        let router = EndpointRouter::from_config(config);

        info!(
            endpoint = %router.route().target.kind,
            max_failures = config.circuit_breaker.max_failures,
            reset_timeout_secs = config.circuit_breaker.reset_timeout_secs,
            "Declaration client initialised"
        );

        Ok(Self { router, headers: HeaderBuilder, refiner: PayloadRefiner, http, breakers })
    }

    /// Submit `declaration`, or its amendment when `is_amendment` is set.
    ///
    /// Returns the outcome in the taxonomy of the integration used. A
    /// declaration missing its amendment correlation id or amendment body, or
    /// whose correlation id cannot be sent as a header, fails with
    /// `DeclarationsError::Precondition` before any network call.
    #[instrument(
        skip(self, declaration),
        fields(
            charge_reference = %declaration.charge_reference,
            correlation_id = %declaration.correlation_id
        )
    )]
    pub async fn submit(
        &self,
        declaration: &Declaration,
        is_amendment: bool,
    ) -> Result<DeclarationResponse> {
        let Route { target, taxonomy } = self.router.route();

        let context = SubmissionContext::for_declaration(declaration, is_amendment);
        let headers = self.headers.build(&target, &context, Utc::now())?;

        let payload = match self.refiner.refine(declaration, is_amendment)? {
            CanonicalPayload::Refined(payload) => payload,
            CanonicalPayload::Empty => {
                return Ok(taxonomy.adapt(SubmissionOutcome::ParsingException));
            }
        };

        let request = self.prepare(&target, &headers, &payload, declaration)?;

        let breaker = self.breakers.breaker(&target.kind);
        let outcome = match breaker.execute(|| self.post(target.kind, request)).await {
            Ok(()) => {
                info!(endpoint = %target.kind, "Declaration submitted");
                SubmissionOutcome::Submitted
            }
            Err(ResilienceError::CircuitOpen) => {
                warn!(endpoint = %target.kind, "Circuit open, declaration not sent");
                SubmissionOutcome::Error
            }
            Err(ResilienceError::OperationFailed { source }) => {
                warn!(
                    endpoint = %target.kind,
                    status = ?source.status(),
                    error = %source,
                    "Declaration submission failed"
                );
                SubmissionOutcome::Error
            }
        };

        Ok(taxonomy.adapt(outcome))
    }

    /// Assemble the outbound request without touching the network.
    fn prepare(
        &self,
        target: &RoutingTarget,
        headers: &SubmissionHeaders,
        payload: &SubmissionPayload,
        declaration: &Declaration,
    ) -> Result<Request> {
        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            let invalid = || PreconditionViolation::InvalidHeaderValue {
                header: name.to_string(),
                correlation_id: declaration.correlation_id.clone(),
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let mut header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            if name == HEADER_AUTHORIZATION {
                header_value.set_sensitive(true);
            }
            header_map.insert(header_name, header_value);
        }

        let builder =
            self.http.request(Method::POST, target.url()).headers(header_map).json(payload);
        self.http.prepare(builder)
    }

    async fn post(
        &self,
        kind: EndpointKind,
        request: Request,
    ) -> std::result::Result<(), SubmissionFailure> {
        let response = self.http.execute(request).await?;
        let status = response.status();
        debug!(endpoint = %kind, %status, "Downstream responded");

        if status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(SubmissionFailure::UnexpectedStatus { status })
        }
    }

    /// Breaker metrics for `kind`, or `None` before its first network call.
    pub fn breaker_metrics(&self, kind: EndpointKind) -> Option<CircuitBreakerMetrics> {
        self.breakers.metrics(&kind)
    }

    /// Force every breaker back to closed.
    pub fn reset_breakers(&self) {
        self.breakers.reset_all();
    }

    pub fn endpoint(&self) -> EndpointKind {
        self.router.route().target.kind
    }
}

#[async_trait]
impl<C: Clock + Clone> DeclarationSubmitter for DeclarationClient<C> {
    async fn submit(
        &self,
        declaration: &Declaration,
        is_amendment: bool,
    ) -> Result<DeclarationResponse> {
        DeclarationClient::submit(self, declaration, is_amendment).await
    }
}
