/// Per-request correlation data passed explicitly into every auth operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: String,
}

impl RequestContext {
    /// Context with a freshly generated request id.
    pub fn new() -> Self {
        RequestContext {
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Reuse an id assigned upstream (e.g. by an `x-request-id` header).
    pub fn from_request_id(request_id: impl Into<String>) -> Self {
        RequestContext {
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
