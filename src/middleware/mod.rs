mod auth;
mod error_handler;
mod rate_limit;
mod request_id;

pub use auth::auth_middleware;
pub use error_handler::log_requests;
pub use rate_limit::{
    BearerIdentity, ClientKeyExtractor, PeerIp, RateLimitGate, rate_limit,
};
pub use request_id::{REQUEST_ID_HEADER, RequestId, current_request_id, request_id};
