//! `dao-gov validate`: instantiate the engine a config describes and report
//! what it would enforce.

use super::config::{default_config_path, GovConfig};
use super::init_logging;
use dao_gov::actions::SimulatedChain;
use dao_gov::client::{GovQueryClient, LocalChain};
use dao_gov::governance::{BlockInfo, Duration, Governance, ThresholdResponse, MAX_LIMIT};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

pub async fn execute(
    config: Option<String>,
    max_voting_period: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = config
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let mut config = GovConfig::load(&path)?;
    init_logging(&config.logging.level);

    if let Some(period) = max_voting_period {
        period.parse::<Duration>()?;
        config.governance.max_voting_period = period;
    }

    let msg = config.to_instantiate_msg()?;
    let period = msg.max_voting_period;
    let env = SimulatedChain::new(config.group.contract.clone());
    let governance = Governance::instantiate(msg, env)
        .map_err(|e| format!("Invalid governance config '{}': {}", path.display(), e))?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let chain = Arc::new(LocalChain::new(
        config.group.contract.clone(),
        governance,
        BlockInfo::new(1, now),
    ));
    let client = GovQueryClient::new(chain, config.group.contract.clone());

    let (threshold, group, voters, metadata) = futures::try_join!(
        client.threshold(),
        client.group(),
        client.list_voters(None, Some(MAX_LIMIT)),
        client.metadata(),
    )?;

    info!(config = %path.display(), "config validated");

    println!("Config:            {}", path.display());
    println!("Group:             {}", group.group);
    println!("Total weight:      {}", group.total_weight);
    println!("Threshold:         {}", describe(&threshold));
    println!("Max voting period: {}", period);
    match &config.governance.executor {
        Some(executor) => println!("Executor:          {:?}", executor),
        None => println!("Executor:          anyone"),
    }
    if !metadata.name.is_empty() {
        println!("Name:              {}", metadata.name);
    }
    println!("Members:");
    for voter in voters.voters {
        println!("  {:<24} {}", voter.addr, voter.weight);
    }
    if config.members.len() > MAX_LIMIT as usize {
        println!("  ... ({} members total)", config.members.len());
    }

    Ok(())
}

fn describe(threshold: &ThresholdResponse) -> String {
    match threshold {
        ThresholdResponse::AbsoluteCount {
            weight,
            total_weight,
        } => format!("{} of {} weight", weight, total_weight),
        ThresholdResponse::AbsolutePercentage { percentage, .. } => {
            format!("{} of total weight", percentage)
        }
        ThresholdResponse::ThresholdQuorum {
            threshold, quorum, ..
        } => format!("{} of votes cast, quorum {}", threshold, quorum),
    }
}
