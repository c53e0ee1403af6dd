//! HTTP types shared by the normalizer, the handlers and the response builder.

mod headers;
mod request;
mod response;

pub use headers::MultiValueMap;
pub use request::{Method, Request, RequestContext, UnknownMethod};
pub use response::{Body, ProxyResponse, Response, StatusCode};
