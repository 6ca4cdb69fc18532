//! Request identification.
//!
//! Every request gets an `x-request-id` (UUID v4) unless the client sent one;
//! the id is echoed on the response and recorded by the trace layer.

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_uuids() {
        let request = Request::new(());
        let mut make = MakeRequestUuid;
        let a = make.make_request_id(&request).unwrap();
        let b = make.make_request_id(&request).unwrap();

        let a = a.header_value().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b.header_value().to_str().unwrap());
    }
}
