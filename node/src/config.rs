//! # Node Configuration
//!
//! The node reads one TOML file:
//!
//! ```toml
//! [verifier]
//! app_id = "0x112a692a2005259c25f6094161007967"
//! schemes = ["hydra-s3.1"]          # default: all
//! registry_timeout_ms = 10000
//!
//! [registry]
//! commitment_mapper_pub_key = ["0x07f6...", "0x20a0..."]
//! available_roots = ["0x1a2b..."]
//! accept_any_root = false
//!
//! [proof_system.verifying_keys]
//! "hydra-s3.1" = "keys/hydra-s3.vk"  # arkworks compressed
//!
//! [server]
//! listen_addr = "0.0.0.0:8080"
//! metrics_addr = "0.0.0.0:9090"
//! log_format = "json"
//! ```
//!
//! `SISMO_APP_ID`, `SISMO_LISTEN_ADDR` and `SISMO_METRICS_ADDR` override the
//! file; command-line flags override both.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy_primitives::U256;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use sismo_connect_protocol::config::{SISMO_CONNECT_VERSION, DEFAULT_REGISTRY_TIMEOUT};
use sismo_connect_protocol::registry::StaticRegistry;
use sismo_connect_protocol::request::AppId;
use sismo_connect_protocol::scheme::ProvingScheme;
use sismo_connect_protocol::serde_utils::parse_u256;
use sismo_connect_protocol::zkp::Groth16ProofSystem;
use sismo_connect_protocol::{SismoConnectVerifier, VerifierConfig};

use crate::logging::LogFormat;

pub const ENV_APP_ID: &str = "SISMO_APP_ID";
pub const ENV_LISTEN_ADDR: &str = "SISMO_LISTEN_ADDR";
pub const ENV_METRICS_ADDR: &str = "SISMO_METRICS_ADDR";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub verifier: VerifierSection,
    pub registry: RegistrySection,
    #[serde(default)]
    pub proof_system: ProofSystemSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierSection {
    pub app_id: AppId,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_schemes")]
    pub schemes: Vec<ProvingScheme>,
    #[serde(default = "default_registry_timeout_ms")]
    pub registry_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// X and Y, as `0x` hex or decimal strings.
    pub commitment_mapper_pub_key: [String; 2],
    #[serde(default)]
    pub available_roots: Vec<String>,
    /// Dev setups only.
    #[serde(default)]
    pub accept_any_root: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProofSystemSection {
    /// Scheme tag to verifying key file. Paths are relative to the config
    /// file.
    #[serde(default)]
    pub verifying_keys: BTreeMap<ProvingScheme, PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: SocketAddr,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            metrics_addr: default_metrics_addr(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_version() -> String {
    SISMO_CONNECT_VERSION.to_string()
}

fn default_schemes() -> Vec<ProvingScheme> {
    ProvingScheme::ALL.to_vec()
}

fn default_registry_timeout_ms() -> u64 {
    DEFAULT_REGISTRY_TIMEOUT.as_millis() as u64
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_metrics_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9090))
}

impl NodeConfig {
    /// Parse a config document. Relative key paths stay relative.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid node configuration")
    }

    /// Read `path`, resolve key paths against its directory, and apply
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("in config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            for key_path in config.proof_system.verifying_keys.values_mut() {
                if key_path.is_relative() {
                    *key_path = base.join(&*key_path);
                }
            }
        }
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `SISMO_*` overrides looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(app_id) = var(ENV_APP_ID) {
            self.verifier.app_id = app_id
                .parse()
                .with_context(|| format!("{ENV_APP_ID} is not a bytes16 hex value"))?;
        }
        if let Some(addr) = var(ENV_LISTEN_ADDR) {
            self.server.listen_addr = addr
                .parse()
                .with_context(|| format!("{ENV_LISTEN_ADDR} is not a socket address"))?;
        }
        if let Some(addr) = var(ENV_METRICS_ADDR) {
            self.server.metrics_addr = addr
                .parse()
                .with_context(|| format!("{ENV_METRICS_ADDR} is not a socket address"))?;
        }
        Ok(())
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        let section = &self.verifier;
        let mut config = VerifierConfig::new(section.app_id.clone())
            .with_schemes(section.schemes.iter().copied());
        config.version = section.version.clone();
        config.registry_timeout_ms = section.registry_timeout_ms;
        config
    }

    pub fn static_registry(&self) -> Result<StaticRegistry> {
        let [x, y] = &self.registry.commitment_mapper_pub_key;
        let pub_key = [
            parse_word("commitment_mapper_pub_key[0]", x)?,
            parse_word("commitment_mapper_pub_key[1]", y)?,
        ];
        let roots = self
            .registry
            .available_roots
            .iter()
            .map(|root| parse_word("available_roots", root))
            .collect::<Result<Vec<_>>>()?;

        let mut registry = StaticRegistry::new(pub_key).with_roots(roots);
        if self.registry.accept_any_root {
            tracing::warn!("registry accepts any root; never use this outside development");
            registry = registry.accept_any_root();
        }
        Ok(registry)
    }

    pub fn proof_system(&self) -> Result<Groth16ProofSystem> {
        let mut system = Groth16ProofSystem::new();
        for (scheme, path) in &self.proof_system.verifying_keys {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read verifying key {}", path.display()))?;
            system
                .insert_verifying_key_bytes(*scheme, &bytes)
                .with_context(|| format!("verifying key {} for {scheme}", path.display()))?;
            tracing::info!(%scheme, path = %path.display(), "verifying key loaded");
        }
        for scheme in &self.verifier.schemes {
            if !self.proof_system.verifying_keys.contains_key(scheme) {
                tracing::warn!(%scheme, "scheme enabled without a verifying key, its proofs will be rejected");
            }
        }
        Ok(system)
    }

    /// Wire everything into a verifier.
    pub fn build_verifier(&self) -> Result<SismoConnectVerifier> {
        let registry = Arc::new(self.static_registry()?);
        let proof_system = Arc::new(self.proof_system()?);
        SismoConnectVerifier::new(self.verifier_config(), registry.clone(), registry, proof_system)
            .context("invalid verifier configuration")
    }
}

fn parse_word(field: &str, value: &str) -> Result<U256> {
    parse_u256(value).map_err(|e| anyhow!("registry.{field}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [verifier]
        app_id = "0x112a692a2005259c25f6094161007967"

        [registry]
        commitment_mapper_pub_key = ["0x0c6a", "12091"]
        available_roots = ["0x1a2b3c4d"]
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = NodeConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.verifier.schemes, ProvingScheme::ALL.to_vec());
        assert_eq!(config.server.listen_addr, default_listen_addr());
        assert_eq!(config.server.log_format, LogFormat::Pretty);
        assert!(config.proof_system.verifying_keys.is_empty());

        let verifier = config.verifier_config();
        assert_eq!(verifier.version, SISMO_CONNECT_VERSION);
        assert!(verifier.validate().is_ok());

        let registry = config.static_registry().unwrap();
        assert_eq!(registry.pub_key(), [U256::from(0x0c6a_u64), U256::from(12091u64)]);
    }

    #[test]
    fn full_config_parses() {
        let config = NodeConfig::from_toml(
            r#"
            [verifier]
            app_id = "0x112a692a2005259c25f6094161007967"
            schemes = ["hydra-s3.1"]
            registry_timeout_ms = 2500

            [registry]
            commitment_mapper_pub_key = ["0x1", "0x2"]
            accept_any_root = true

            [proof_system.verifying_keys]
            "hydra-s3.1" = "keys/hydra-s3.vk"

            [server]
            listen_addr = "127.0.0.1:3000"
            metrics_addr = "127.0.0.1:3001"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.verifier.schemes, vec![ProvingScheme::HydraS3]);
        assert_eq!(config.verifier_config().registry_timeout_ms, 2500);
        assert_eq!(
            config.proof_system.verifying_keys[&ProvingScheme::HydraS3],
            PathBuf::from("keys/hydra-s3.vk")
        );
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.server.metrics_addr.port(), 3001);
    }

    #[test]
    fn unknown_keys_and_schemes_are_rejected() {
        assert!(NodeConfig::from_toml(&format!("{MINIMAL}\n[extra]\nx = 1\n")).is_err());
        let bad_scheme = MINIMAL.replace(
            "[registry]",
            "schemes = [\"hydra-s9\"]\n[registry]",
        );
        assert!(NodeConfig::from_toml(&bad_scheme).is_err());
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut config = NodeConfig::from_toml(MINIMAL).unwrap();
        config
            .apply_env(|name| match name {
                ENV_APP_ID => Some("0xf68985adfc209fafebfb1a956913e7fa".into()),
                ENV_LISTEN_ADDR => Some("127.0.0.1:18080".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.verifier.app_id.as_str(), "0xf68985adfc209fafebfb1a956913e7fa");
        assert_eq!(config.server.listen_addr.port(), 18080);
        assert_eq!(config.server.metrics_addr, default_metrics_addr());

        let err = config
            .apply_env(|name| (name == ENV_METRICS_ADDR).then(|| "nope".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_METRICS_ADDR));
    }

    #[test]
    fn bad_registry_values_name_the_field() {
        let config = NodeConfig::from_toml(&MINIMAL.replace("12091", "0xzz")).unwrap();
        let err = config.static_registry().unwrap_err();
        assert!(err.to_string().contains("commitment_mapper_pub_key[1]"), "{err}");
    }

    #[test]
    fn missing_key_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(
            &path,
            format!("{MINIMAL}\n[proof_system.verifying_keys]\n\"hydra-s2.1\" = \"missing.vk\"\n"),
        )
        .unwrap();

        let config = NodeConfig::load(&path).unwrap();
        assert_eq!(
            config.proof_system.verifying_keys[&ProvingScheme::HydraS2],
            dir.path().join("missing.vk")
        );
        assert!(config.build_verifier().is_err());
    }
}
