use std::collections::BTreeSet;

use url::Url;

use crate::error::RegistryError;

/// Known peers, stored as normalized `host:port` authorities.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    nodes: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `address` and add its authority. Returns the stored form.
    ///
    /// Accepts full URLs (`http://10.0.0.2:5000/`) as well as bare
    /// `host:port` strings with or without a trailing path.
    pub fn register(&mut self, address: &str) -> Result<String, RegistryError> {
        let authority = normalize(address)?;
        self.nodes.insert(authority.clone());
        Ok(authority)
    }

    /// Registered peers in ascending order.
    pub fn list(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Reduce an address to its lowercase `host:port` authority.
pub fn normalize(address: &str) -> Result<String, RegistryError> {
    let trimmed = address.trim();
    let invalid = |reason: &str| RegistryError::InvalidAddress(format!("{trimmed:?}: {reason}"));

    // Without a scheme, "host:5000" would parse as scheme "host".
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid("missing host"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid("missing port"))?;

    Ok(format!("{host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::{PeerRegistry, normalize};
    use crate::error::RegistryError;

    #[test]
    fn url_and_bare_forms_dedup_to_one_authority() {
        let mut reg = PeerRegistry::new();
        assert_eq!(
            reg.register("http://192.168.0.5:5000").unwrap(),
            "192.168.0.5:5000"
        );
        assert_eq!(reg.register("192.168.0.5:5000/").unwrap(), "192.168.0.5:5000");
        assert_eq!(reg.list(), vec!["192.168.0.5:5000".to_string()]);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn host_is_lowercased_and_default_port_filled() {
        assert_eq!(normalize("http://Node-A.local").unwrap(), "node-a.local:80");
        assert_eq!(normalize("https://peer.example/chain").unwrap(), "peer.example:443");
        assert_eq!(normalize("  localhost:5001  ").unwrap(), "localhost:5001");
    }

    #[test]
    fn list_is_sorted() {
        let mut reg = PeerRegistry::new();
        reg.register("10.0.0.9:5000").unwrap();
        reg.register("10.0.0.1:5000").unwrap();
        assert_eq!(reg.list(), vec!["10.0.0.1:5000", "10.0.0.9:5000"]);
    }

    #[test]
    fn addresses_without_host_are_rejected() {
        let mut reg = PeerRegistry::new();
        assert!(matches!(
            reg.register(""),
            Err(RegistryError::InvalidAddress(_))
        ));
        assert!(matches!(
            reg.register("http://"),
            Err(RegistryError::InvalidAddress(_))
        ));
        assert!(reg.is_empty());
    }
}
