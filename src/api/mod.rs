//! Operation surface helpers for hosting façades
//!
//! The core is transport-agnostic; a façade maps these payloads and the
//! orchestrator operations onto whatever protocol it serves.

use serde::{Deserialize, Serialize};

/// Liveness / readiness payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Liveness probe: the process is up
pub fn health() -> StatusResponse {
    StatusResponse {
        status: "ok".to_string(),
        message: "Application is healthy.".to_string(),
    }
}

/// Readiness probe: the core can accept work
pub fn ready() -> StatusResponse {
    StatusResponse {
        status: "ready".to_string(),
        message: "Application is ready to serve traffic.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_payloads() {
        assert_eq!(health().status, "ok");
        assert_eq!(ready().status, "ready");
    }
}
