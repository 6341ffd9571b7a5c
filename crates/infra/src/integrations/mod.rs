//! External service integrations

pub mod declarations;
