//! Submission pipeline building blocks
//!
//! Routing, header construction and payload refinement are synchronous and
//! side-effect free apart from logging. The infra layer composes them with
//! the circuit breaker and the HTTP transport.

pub mod headers;
pub mod ports;
pub mod refiner;
pub mod router;

pub use headers::{HeaderBuilder, SubmissionContext, SubmissionHeaders};
pub use ports::DeclarationSubmitter;
pub use refiner::{CanonicalPayload, PayloadRefiner};
pub use router::{EndpointRouter, Route, RoutingTarget};
