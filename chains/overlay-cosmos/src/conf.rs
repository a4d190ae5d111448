use std::time::Duration;

/// Cosmos connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConf {
    /// The node endpoint to connect to.
    rpc_url: String,
    /// The chain ID.
    chain_id: String,
    /// The bech32 human-readable prefix for account addresses.
    prefix: String,
    /// Base denomination for fees and balances.
    denom: String,
    /// Whether the outer HTTP adapter may follow redirects.
    follow_redirects: bool,
    /// How long a followed redirect stays pinned before reverting to the
    /// original URL.
    redirect_ttl: Duration,
}

/// An error type when parsing a connection configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConnectionConfError {
    /// Missing `rpc` for connection configuration
    #[error("Missing `rpc` for connection configuration")]
    MissingRpcUrl,
    /// Missing `chainId` for connection configuration
    #[error("Missing `chainId` for connection configuration")]
    MissingChainId,
    /// Invalid `rpc` url for connection configuration
    #[error("Invalid `rpc` url for connection configuration: `{0}` ({1})")]
    InvalidRpcUrl(String, url::ParseError),
}

impl ConnectionConf {
    /// Create a new connection configuration, validating the endpoint URL.
    pub fn new(
        rpc_url: String,
        chain_id: String,
        prefix: String,
        denom: String,
        follow_redirects: bool,
        redirect_ttl: Duration,
    ) -> Result<Self, ConnectionConfError> {
        if rpc_url.is_empty() {
            return Err(ConnectionConfError::MissingRpcUrl);
        }
        if chain_id.is_empty() {
            return Err(ConnectionConfError::MissingChainId);
        }
        url::Url::parse(&rpc_url)
            .map_err(|e| ConnectionConfError::InvalidRpcUrl(rpc_url.clone(), e))?;
        Ok(Self {
            rpc_url,
            chain_id,
            prefix,
            denom,
            follow_redirects,
            redirect_ttl,
        })
    }

    /// Get the node endpoint
    pub fn get_rpc_url(&self) -> String {
        self.rpc_url.clone()
    }

    /// Get the chain ID
    pub fn get_chain_id(&self) -> String {
        self.chain_id.clone()
    }

    /// Get the bech32 prefix
    pub fn get_prefix(&self) -> String {
        self.prefix.clone()
    }

    /// Get the base denomination
    pub fn get_denom(&self) -> String {
        self.denom.clone()
    }

    /// Whether the HTTP adapter may follow redirects
    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// TTL of a followed redirect
    pub fn redirect_ttl(&self) -> Duration {
        self.redirect_ttl
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_malformed_urls() {
        let conf = ConnectionConf::new(
            "not a url".to_string(),
            "seda-1".to_string(),
            "seda".to_string(),
            "aseda".to_string(),
            false,
            Duration::ZERO,
        );
        assert!(matches!(conf, Err(ConnectionConfError::InvalidRpcUrl(..))));
    }

    #[test]
    fn rejects_missing_chain_id() {
        let conf = ConnectionConf::new(
            "http://127.0.0.1:9090".to_string(),
            String::new(),
            "seda".to_string(),
            "aseda".to_string(),
            false,
            Duration::ZERO,
        );
        assert!(matches!(conf, Err(ConnectionConfError::MissingChainId)));
    }
}
