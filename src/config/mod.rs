//! Peer configuration: resolves `self_id`, listen address, and
//! successor address from CLI flags and/or an optional TOML peer-table
//! file, following the teacher's `Config::load_from_file` / `validate`
//! pipeline trimmed to the three fields this core needs (spec §6).

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::protocol::constants::PLAYERS;
use crate::protocol::types::PlayerId;

/// The resolved address book entry for one peer: who it is, what it
/// listens on, and where it forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    pub self_id: PlayerId,
    pub listen: SocketAddr,
    pub successor: SocketAddr,
}

#[derive(Debug, Deserialize)]
struct PeerTable {
    peer: Vec<PeerEntry>,
}

#[derive(Debug, Deserialize)]
struct PeerEntry {
    id: PlayerId,
    listen: SocketAddr,
    successor: SocketAddr,
}

impl PeerConfig {
    pub fn new(self_id: PlayerId, listen: SocketAddr, successor: SocketAddr) -> Result<Self> {
        let config = PeerConfig {
            self_id,
            listen,
            successor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a `[[peer]]` TOML table and pick the entry for `self_id`.
    pub fn load_from_file(path: &Path, self_id: PlayerId) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file: {e}")))?;
        let table: PeerTable =
            toml::from_str(&contents).map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;

        let entry = table
            .peer
            .into_iter()
            .find(|p| p.id == self_id)
            .ok_or_else(|| Error::Config(format!("no peer entry for id {self_id}")))?;

        PeerConfig::new(self_id, entry.listen, entry.successor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.self_id as usize >= PLAYERS {
            return Err(Error::Config(format!(
                "self_id {} must be in 0..{}",
                self.self_id, PLAYERS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_an_out_of_range_self_id() {
        let result = PeerConfig::new(4, "127.0.0.1:9000".parse().unwrap(), "127.0.0.1:9001".parse().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file_picks_the_matching_peer_entry() {
        let toml = r#"
            [[peer]]
            id = 0
            listen = "127.0.0.1:9000"
            successor = "127.0.0.1:9001"

            [[peer]]
            id = 1
            listen = "127.0.0.1:9001"
            successor = "127.0.0.1:9002"
        "#;
        let dir = std::env::temp_dir();
        let path = dir.join("hearts_ring_peer_config_test.toml");
        std::fs::write(&path, toml).unwrap();

        let config = PeerConfig::load_from_file(&path, 1).unwrap();
        assert_eq!(config.self_id, 1);
        assert_eq!(config.listen, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(config.successor, "127.0.0.1:9002".parse().unwrap());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_from_file_rejects_a_missing_peer_id() {
        let toml = r#"
            [[peer]]
            id = 0
            listen = "127.0.0.1:9000"
            successor = "127.0.0.1:9001"
        "#;
        let dir = std::env::temp_dir();
        let path = dir.join("hearts_ring_peer_config_missing_test.toml");
        std::fs::write(&path, toml).unwrap();

        let result = PeerConfig::load_from_file(&path, 2);
        assert!(result.is_err());

        std::fs::remove_file(&path).ok();
    }
}
