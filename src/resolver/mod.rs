//! The resolver: configuration and event dispatch.

mod config;
mod dispatch;

pub use config::{ResolverConfig, DEBUG_ENV};
pub use dispatch::Resolver;
