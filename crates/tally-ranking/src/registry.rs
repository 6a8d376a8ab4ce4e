//! Rule Registry
//!
//! Metadata of every preset rule, for listing and lookup by name.

use crate::presets::RuleKind;
use std::collections::HashMap;

/// Rule categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Capital structure (equity ratio, gearing, goodwill)
    Solidity,
    /// Profitability (margins, return on assets)
    Profitability,
    /// Growth-adjusted valuation (PEG and friends)
    Valuation,
}

/// Rule metadata
#[derive(Debug, Clone)]
pub struct RuleInfo {
    /// Configuration name (unique identifier)
    pub name: &'static str,
    /// Preset the entry describes
    pub kind: RuleKind,
    /// Rule category
    pub category: RuleCategory,
    /// What the rule measures
    pub description: &'static str,
    /// Statement fields or descriptive values the rule reads
    pub required_fields: &'static [&'static str],
}

/// Get all available rule info
pub fn available_rules() -> Vec<RuleInfo> {
    vec![
        RuleInfo {
            name: RuleKind::EquityRatio.name(),
            kind: RuleKind::EquityRatio,
            category: RuleCategory::Solidity,
            description: "Equity as a percentage of total assets",
            required_fields: &["total_liabilities", "total_assets"],
        },
        RuleInfo {
            name: RuleKind::NettoMargin.name(),
            kind: RuleKind::NettoMargin,
            category: RuleCategory::Profitability,
            description: "Net income as a percentage of revenue",
            required_fields: &["net_income", "revenue"],
        },
        RuleInfo {
            name: RuleKind::ReturnOnAssets.name(),
            kind: RuleKind::ReturnOnAssets,
            category: RuleCategory::Profitability,
            description: "Net income as a percentage of total assets",
            required_fields: &["net_income", "total_assets"],
        },
        RuleInfo {
            name: RuleKind::Goodwill.name(),
            kind: RuleKind::Goodwill,
            category: RuleCategory::Solidity,
            description: "Goodwill as a percentage of equity",
            required_fields: &["goodwill", "total_assets", "total_liabilities"],
        },
        RuleInfo {
            name: RuleKind::Gearing.name(),
            kind: RuleKind::Gearing,
            category: RuleCategory::Solidity,
            description: "Net debt as a percentage of equity",
            required_fields: &["total_long_term_debt", "cash_and_short_term_investments", "total_liabilities"],
        },
        RuleInfo {
            name: RuleKind::DynamicGearing.name(),
            kind: RuleKind::DynamicGearing,
            category: RuleCategory::Solidity,
            description: "Years of free cash flow needed to repay net debt",
            required_fields: &["total_long_term_debt", "operating_cashflow", "capital_expenditure"],
        },
        RuleInfo {
            name: RuleKind::AssetCoverageRatio.name(),
            kind: RuleKind::AssetCoverageRatio,
            category: RuleCategory::Solidity,
            description: "Equity plus long-term debt as a percentage of non-current assets",
            required_fields: &["total_liabilities", "total_long_term_debt", "total_assets", "total_current_assets"],
        },
        RuleInfo {
            name: RuleKind::Peg.name(),
            kind: RuleKind::Peg,
            category: RuleCategory::Valuation,
            description: "Price/earnings over annualized earnings-per-share growth",
            required_fields: &["price", "net_income", "total_outstanding_shares_common_stock"],
        },
        RuleInfo {
            name: RuleKind::Prg.name(),
            kind: RuleKind::Prg,
            category: RuleCategory::Valuation,
            description: "Price/revenue over annualized revenue-per-share growth",
            required_fields: &["price", "revenue", "total_outstanding_shares_common_stock"],
        },
        RuleInfo {
            name: RuleKind::Pfcg.name(),
            kind: RuleKind::Pfcg,
            category: RuleCategory::Valuation,
            description: "Price/free cash flow over annualized free-cash-flow-per-share growth",
            required_fields: &[
                "price",
                "operating_cashflow",
                "capital_expenditure",
                "total_outstanding_shares_common_stock",
            ],
        },
        RuleInfo {
            name: RuleKind::Pbg.name(),
            kind: RuleKind::Pbg,
            category: RuleCategory::Valuation,
            description: "Price/book over annualized book-value-per-share growth",
            required_fields: &["price", "total_liabilities", "total_outstanding_shares_common_stock"],
        },
    ]
}

/// Get rules by category
pub fn rules_by_category(category: RuleCategory) -> Vec<RuleInfo> {
    available_rules()
        .into_iter()
        .filter(|r| r.category == category)
        .collect()
}

/// Get rule info by name
pub fn get_rule_info(name: &str) -> Option<RuleInfo> {
    available_rules().into_iter().find(|r| r.name == name)
}

/// Get a map of all rules indexed by name
pub fn rule_map() -> HashMap<&'static str, RuleInfo> {
    available_rules().into_iter().map(|r| (r.name, r)).collect()
}

/// List all rule names
pub fn list_rule_names() -> Vec<&'static str> {
    available_rules().into_iter().map(|r| r.name).collect()
}
