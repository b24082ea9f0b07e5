// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ContextSummary, Driver, FleetContext, Stop, Trip, Vehicle};
pub use requests::{DispatchRequest, FormatRequest};
pub use responses::{DispatchResponse, ErrorResponse, FormatResponse, HealthResponse, PresetsResponse};
