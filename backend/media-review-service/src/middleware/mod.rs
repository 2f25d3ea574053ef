/// HTTP middleware
pub mod request_id;
pub mod timeout;

pub use request_id::{RequestId, RequestIdValue, REQUEST_ID_HEADER};
pub use timeout::RequestTimeout;

/// Access log format: the usual fields plus the request id
pub const ACCESS_LOG_FORMAT: &str =
    r#"%a "%r" %s %b %T request_id=%{x-request-id}o"#;
