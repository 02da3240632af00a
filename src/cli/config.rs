//! Deployment configuration file handling
//!
//! A governance deployment is described by one TOML file: the group it is
//! backed by, the voting rules, the initial members, display metadata and
//! logging. `dao-gov init` writes a commented template; `dao-gov validate`
//! loads it and instantiates an engine from it.

use dao_gov::governance::{Duration, Executor, Member, Threshold};
use dao_gov::msg::{InstantiateMsg, Metadata};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Governance deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovConfig {
    pub group: GroupConfig,

    pub governance: VotingConfig,

    #[serde(default)]
    pub members: Vec<Member>,

    #[serde(default)]
    pub metadata: Option<Metadata>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backing registry and contract addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Address of the group registry
    pub address: String,

    /// Address the governance contract (and its treasury) lives at
    #[serde(default = "default_contract")]
    pub contract: String,
}

/// Voting rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    pub threshold: Threshold,

    /// "7d", "48h", "100 blocks"
    pub max_voting_period: String,

    /// Omit to let anyone execute passed proposals
    #[serde(default)]
    pub executor: Option<Executor>,

    #[serde(default)]
    pub proposer_votes_yes: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_contract() -> String {
    "dao-gov".to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl GovConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: GovConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Parsed maximum voting period
    pub fn max_voting_period(&self) -> Result<Duration, String> {
        self.governance.max_voting_period.parse()
    }

    /// Instantiation parameters for the engine
    pub fn to_instantiate_msg(&self) -> Result<InstantiateMsg, Box<dyn std::error::Error>> {
        Ok(InstantiateMsg {
            group_addr: self.group.address.clone(),
            members: self.members.clone(),
            threshold: self.governance.threshold.clone(),
            max_voting_period: self.max_voting_period()?,
            executor: self.governance.executor.clone(),
            proposer_votes_yes: self.governance.proposer_votes_yes,
            metadata: self.metadata.clone(),
        })
    }

    /// Default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        r#"# DAO governance deployment

[group]
# Address of the group registry backing the DAO
address = "group"

# Address of the governance contract (holds the treasury)
contract = "dao-gov"

[governance]
# One of:
#   threshold = { absolute_count = { weight = 3 } }
#   threshold = { absolute_percentage = { percentage = "0.5" } }
#   threshold = { threshold_quorum = { threshold = "0.6", quorum = "0.5" } }
threshold = { absolute_percentage = { percentage = "0.5" } }

# Longest voting window a proposal may ask for: "7d", "48h" or "100 blocks"
max_voting_period = "7d"

# Who may execute passed proposals: "Member" or { Only = "<address>" }
# Leave commented to let anyone execute
# executor = "Member"

# Record the proposer's ballot as Yes on creation
proposer_votes_yes = false

[[members]]
addr = "alice"
weight = 3

[[members]]
addr = "bob"
weight = 2

[[members]]
addr = "carol"
weight = 1

[metadata]
name = "My DAO"
description = ""
image = ""

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
level = "info"
"#
        .to_string()
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, Self::generate_default_toml()).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Default config file path: ~/.local/share/dao-gov/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dao-gov")
        .join("config.toml")
}
