//! Protocol header set for outbound submissions

use chrono::{DateTime, Utc};
use declarations_common::time::format_http_date;
use declarations_domain::constants::{
    FORWARDED_HOST_MARKER, HEADER_ACCEPT, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
    HEADER_CORRELATION_ID, HEADER_DATE, HEADER_FORWARDED_HOST, MIME_JSON,
};
use declarations_domain::{Declaration, EndpointKind, PreconditionViolation};

use super::router::RoutingTarget;

/// Per-call inputs to the header builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    pub is_amendment: bool,
    pub correlation_id: String,
    pub amend_correlation_id: Option<String>,
}

impl SubmissionContext {
    pub fn for_declaration(declaration: &Declaration, is_amendment: bool) -> Self {
        Self {
            is_amendment,
            correlation_id: declaration.correlation_id.clone(),
            amend_correlation_id: declaration.amend_correlation_id.clone(),
        }
    }

    /// Correlation id sent downstream: the amendment id for amendments.
    pub fn selected_correlation_id(&self) -> Result<&str, PreconditionViolation> {
        if !self.is_amendment {
            return Ok(&self.correlation_id);
        }

        self.amend_correlation_id.as_deref().ok_or_else(|| {
            PreconditionViolation::MissingAmendmentCorrelationId {
                correlation_id: self.correlation_id.clone(),
            }
        })
    }
}

/// Ordered header list ready to be applied to a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionHeaders {
    entries: Vec<(&'static str, String)>,
}

impl SubmissionHeaders {
    fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.entries.push((name, value.into()));
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the header set for one submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderBuilder;

impl HeaderBuilder {
    /// Build headers for `target`, stamped with `now`.
    ///
    /// Fails with a [`PreconditionViolation`] when an amendment has no
    /// amendment correlation id. The legacy integration receives `Accept`
    /// only; its `Content-Type` comes from the transport when the JSON body
    /// is attached.
    pub fn build(
        &self,
        target: &RoutingTarget,
        context: &SubmissionContext,
        now: DateTime<Utc>,
    ) -> Result<SubmissionHeaders, PreconditionViolation> {
        let correlation_id = context.selected_correlation_id()?;

        let mut headers = SubmissionHeaders::default();
        headers.push(HEADER_ACCEPT, MIME_JSON);
        if target.kind == EndpointKind::Modernized {
            headers.push(HEADER_CONTENT_TYPE, MIME_JSON);
        }
        headers.push(HEADER_DATE, format_http_date(now));
        headers.push(HEADER_CORRELATION_ID, correlation_id);
        headers.push(HEADER_FORWARDED_HOST, FORWARDED_HOST_MARKER);
        headers.push(HEADER_AUTHORIZATION, format!("Bearer {}", target.bearer_token));

        Ok(headers)
    }
}
