//! Per-request context injected by middleware.

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    /// Caller identity from `X-Requester`, forwarded to the module source.
    pub requester: String,
}

impl RequestContext {
    pub const ANONYMOUS: &'static str = "anonymous";
}
