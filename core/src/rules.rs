//! Deterministic rule checks.
//!
//! RULE: evaluation order is the order of RULES, and that order is the
//! order reasons appear on a verdict. Append new rules; never reorder.

use crate::{config::DetectionConfig, context::AggregateContext, record::SubsidyRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    DuplicateIdentity,
    DuplicateBeneficiary,
    HighIncome,
    ExcessDistributorVolume,
    ExcessClaimAmount,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity => "DUPLICATE_IDENTITY",
            Self::DuplicateBeneficiary => "DUPLICATE_BENEFICIARY",
            Self::HighIncome => "HIGH_INCOME",
            Self::ExcessDistributorVolume => "EXCESS_DISTRIBUTOR_VOLUME",
            Self::ExcessClaimAmount => "EXCESS_CLAIM_AMOUNT",
        }
    }

    /// Duplicate-identity fraud flags a record whatever its score.
    pub fn is_high_severity(&self) -> bool {
        matches!(self, Self::DuplicateIdentity | Self::DuplicateBeneficiary)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Predicate = fn(&SubsidyRecord, &AggregateContext<'_>, &DetectionConfig) -> bool;

/// A named predicate. Pure: reads the record and context, mutates nothing.
pub struct Rule {
    pub code: ReasonCode,
    pub fires: Predicate,
}

pub const RULES: [Rule; 5] = [
    Rule {
        code: ReasonCode::DuplicateIdentity,
        fires: duplicate_identity,
    },
    Rule {
        code: ReasonCode::DuplicateBeneficiary,
        fires: duplicate_beneficiary,
    },
    Rule {
        code: ReasonCode::HighIncome,
        fires: high_income,
    },
    Rule {
        code: ReasonCode::ExcessDistributorVolume,
        fires: excess_distributor_volume,
    },
    Rule {
        code: ReasonCode::ExcessClaimAmount,
        fires: excess_claim_amount,
    },
];

/// Total rule count; the denominator of rule strength.
pub const RULE_COUNT: usize = RULES.len();

/// Codes of every rule that fires for `record`, in evaluation order.
pub fn evaluate(
    record: &SubsidyRecord,
    ctx: &AggregateContext<'_>,
    config: &DetectionConfig,
) -> Vec<ReasonCode> {
    RULES
        .iter()
        .filter(|rule| (rule.fires)(record, ctx, config))
        .map(|rule| rule.code)
        .collect()
}

fn duplicate_identity(
    r: &SubsidyRecord,
    ctx: &AggregateContext<'_>,
    _: &DetectionConfig,
) -> bool {
    ctx.is_duplicate_identity(r)
}

fn duplicate_beneficiary(
    r: &SubsidyRecord,
    ctx: &AggregateContext<'_>,
    _: &DetectionConfig,
) -> bool {
    ctx.is_duplicate_beneficiary(r)
}

fn high_income(r: &SubsidyRecord, _: &AggregateContext<'_>, cfg: &DetectionConfig) -> bool {
    r.valid_income().is_some_and(|income| income > cfg.high_income_threshold)
}

fn excess_distributor_volume(
    r: &SubsidyRecord,
    ctx: &AggregateContext<'_>,
    cfg: &DetectionConfig,
) -> bool {
    ctx.distributor_volume(r) > cfg.distributor_daily_limit
}

fn excess_claim_amount(
    r: &SubsidyRecord,
    ctx: &AggregateContext<'_>,
    cfg: &DetectionConfig,
) -> bool {
    let Some(amount) = r.valid_amount() else {
        return false;
    };
    if ctx.pair_peers(r) < cfg.min_peer_records {
        return false;
    }
    ctx.pair_mean(r)
        .is_some_and(|mean| amount > mean * cfg.excess_amount_multiplier)
}
