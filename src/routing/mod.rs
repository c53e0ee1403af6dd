//! Path templates and the route table.

mod table;
mod template;

pub use table::{Resolution, Route, RouteOptions, RouteTable};
pub use template::{PathParams, RouteTemplate, Segment};
