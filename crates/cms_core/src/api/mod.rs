//! Caller-facing surface.
//!
//! # Responsibility
//! - Wrap service results in the `{payload}` / `{exception}` envelope
//!   ([`envelope`]).
//! - Route JSON commands to services ([`command`]).

pub mod command;
pub mod envelope;
