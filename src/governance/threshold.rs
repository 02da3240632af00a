//! Threshold policies and the pass/fail verdict.
//!
//! `evaluate` is a pure function of the tally, the total weight snapshot, the
//! threshold snapshot and whether the voting window has closed. Nothing here
//! touches stored state.

use super::ballots::Votes;
use super::decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Threshold construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("Invalid voting threshold percentage, must be in the 0.0-1.0 range (exclusive of 0)")]
    InvalidThreshold,

    #[error("Required quorum threshold cannot be zero")]
    ZeroQuorumThreshold,

    #[error("Not possible to reach required (passing) weight")]
    UnreachableWeight,

    #[error("Required weight cannot be zero")]
    ZeroWeight,

    #[error("Group total weight is zero; no threshold can ever be met")]
    ZeroTotalWeight,
}

/// Rule deciding when accumulated yes-weight is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Passes once yes-weight reaches `weight`.
    AbsoluteCount { weight: u64 },
    /// Passes once yes-weight / total-weight reaches `percentage`.
    AbsolutePercentage { percentage: Decimal },
    /// Requires participation of `quorum` of the total weight and `threshold`
    /// of the non-abstaining votes.
    ThresholdQuorum { threshold: Decimal, quorum: Decimal },
}

/// Outcome of evaluating a tally against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Rejected,
    /// Undecided while the window is open.
    Pending,
}

/// Threshold as reported by queries, alongside the weight it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdResponse {
    AbsoluteCount {
        weight: u64,
        total_weight: u64,
    },
    AbsolutePercentage {
        percentage: Decimal,
        total_weight: u64,
    },
    ThresholdQuorum {
        threshold: Decimal,
        quorum: Decimal,
        total_weight: u64,
    },
}

impl Threshold {
    /// Percentage threshold; rejects 0 and values above 1.
    pub fn absolute_percentage(percentage: Decimal) -> Result<Self, ThresholdError> {
        valid_fraction(percentage)?;
        Ok(Threshold::AbsolutePercentage { percentage })
    }

    /// Quorum threshold; both fractions must lie in (0, 1].
    pub fn threshold_quorum(threshold: Decimal, quorum: Decimal) -> Result<Self, ThresholdError> {
        valid_fraction(threshold)?;
        valid_quorum(quorum)?;
        Ok(Threshold::ThresholdQuorum { threshold, quorum })
    }

    /// Check the threshold can be met by a group of `total_weight`.
    pub fn validate(&self, total_weight: u64) -> Result<(), ThresholdError> {
        if total_weight == 0 {
            return Err(ThresholdError::ZeroTotalWeight);
        }
        match self {
            Threshold::AbsoluteCount { weight } => {
                if *weight == 0 {
                    Err(ThresholdError::ZeroWeight)
                } else if *weight > total_weight {
                    Err(ThresholdError::UnreachableWeight)
                } else {
                    Ok(())
                }
            }
            Threshold::AbsolutePercentage { percentage } => valid_fraction(*percentage),
            Threshold::ThresholdQuorum { threshold, quorum } => {
                valid_fraction(*threshold)?;
                valid_quorum(*quorum)
            }
        }
    }

    pub fn to_response(&self, total_weight: u64) -> ThresholdResponse {
        match self.clone() {
            Threshold::AbsoluteCount { weight } => ThresholdResponse::AbsoluteCount {
                weight,
                total_weight,
            },
            Threshold::AbsolutePercentage { percentage } => {
                ThresholdResponse::AbsolutePercentage {
                    percentage,
                    total_weight,
                }
            }
            Threshold::ThresholdQuorum { threshold, quorum } => {
                ThresholdResponse::ThresholdQuorum {
                    threshold,
                    quorum,
                    total_weight,
                }
            }
        }
    }
}

fn valid_fraction(value: Decimal) -> Result<(), ThresholdError> {
    if value.is_unit_fraction() {
        Ok(())
    } else {
        Err(ThresholdError::InvalidThreshold)
    }
}

fn valid_quorum(value: Decimal) -> Result<(), ThresholdError> {
    if value.is_zero() {
        Err(ThresholdError::ZeroQuorumThreshold)
    } else if value > Decimal::one() {
        Err(ThresholdError::InvalidThreshold)
    } else {
        Ok(())
    }
}

/// Decide a tally.
///
/// While the window is open only a pass is reported; everything else is
/// `Pending`. Once `expired` is set, anything short of a pass is `Rejected`.
///
/// `ThresholdQuorum` passes early only when no remaining weight can flip the
/// result: yes-weight must already reach `threshold` of every non-abstaining
/// vote that could still be cast. At expiry the ratio is taken over the cast
/// yes/no/veto weight; with no such votes the proposal cannot pass.
pub fn evaluate(
    tally: &Votes,
    total_weight: u64,
    threshold: &Threshold,
    expired: bool,
) -> Result<Verdict, ThresholdError> {
    if total_weight == 0 {
        return Err(ThresholdError::ZeroTotalWeight);
    }

    let passed = match threshold {
        Threshold::AbsoluteCount { weight } => tally.yes >= *weight,
        Threshold::AbsolutePercentage { percentage } => {
            percentage.is_reached_by(tally.yes, total_weight)
        }
        Threshold::ThresholdQuorum { threshold, quorum } => {
            if !quorum.is_reached_by(tally.total(), total_weight) {
                false
            } else if expired {
                let opinions = tally.yes + tally.no + tally.veto;
                threshold.is_reached_by(tally.yes, opinions)
            } else {
                let possible = total_weight.saturating_sub(tally.abstain);
                threshold.is_reached_by(tally.yes, possible)
            }
        }
    };

    Ok(match (passed, expired) {
        (true, _) => Verdict::Passed,
        (false, true) => Verdict::Rejected,
        (false, false) => Verdict::Pending,
    })
}
