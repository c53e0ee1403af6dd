//! Response building: JSON coercion, CORS, compression and envelopes.

mod builder;
mod cors;
mod encoding;

pub use builder::{build, ResponseBuilder};
pub use cors::{CorsConfig, REQUIRED_HEADERS};
pub use encoding::accepts_gzip;
