//! Capability negotiation during initialization.

use crate::types::{ClientCapabilities, InitializeParams, InitializeResult, MCP_VERSION};

/// Client state recorded by the handshake.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub client: ClientCapabilities,
    pub client_name: Option<String>,
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Record the client and answer with the server's fixed capabilities.
    /// A different protocol version is logged, not refused.
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                requested = %params.protocol_version,
                supported = MCP_VERSION,
                "Protocol version mismatch, answering with server version"
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );
        self.client = params.capabilities;
        self.client_name = Some(params.client_info.name);

        InitializeResult::default_result()
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Implementation;

    #[test]
    fn test_negotiate_records_client() {
        let mut caps = NegotiatedCapabilities::default();
        let result = caps.negotiate(InitializeParams {
            protocol_version: "1999-01-01".to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "matrix-client".to_string(),
                version: "0.0.1".to_string(),
            },
        });
        assert_eq!(result.protocol_version, MCP_VERSION);
        assert_eq!(caps.client_name.as_deref(), Some("matrix-client"));
        assert!(!caps.initialized);
        caps.mark_initialized();
        assert!(caps.initialized);
    }
}
