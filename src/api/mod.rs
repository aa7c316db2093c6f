//! API Layer
//!
//! HTTP endpoints, extractors and authentication middleware for the biodata
//! service.

pub mod biodata_handlers;
pub mod contact_handlers;
pub mod extract;
pub mod favourite_handlers;
pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use extract::{BiodataSubmission, JsonBody, JsonOrDefault, PathParam, QueryParams};
pub use handlers::{AppState, SuccessResponse};
pub use middleware::{auth_middleware, optional_auth_middleware, AuthUser};
pub use routes::{create_routes, RouterBuilder};
