use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
}

impl Health {
    pub fn ok(service: &'static str) -> Self {
        Self { status: "ok", service }
    }
}

/// JSON body returned with every non-2xx response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}
