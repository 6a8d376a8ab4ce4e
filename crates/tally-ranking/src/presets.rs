//! Built-in business-metric rules.
//!
//! Every preset comes with default cutoffs and scores that can be replaced
//! through a [`RuleSpec`]. The growth-adjusted price ratios (PEG, PRG, PFCG,
//! PBG) only score companies with a positive price ratio and positive
//! per-share growth; the rest are flagged CONSTRAINT.

use crate::error::{RankingError, Result, RuleEvaluationError};
use crate::rule::{
    Accessor, Comparison, Constraint, RangeRankingObject, RankingObject, accessor, series_accessor,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tally_data::{Contract, Selection};

/// Default number of years for per-share growth.
pub const DEFAULT_GROWTH_YEARS: usize = 3;

/// The preset rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Equity over total assets.
    #[display("Equity Ratio")]
    EquityRatio,
    /// Net income over revenue.
    #[display("Netto Margin")]
    NettoMargin,
    /// Net income over total assets.
    #[display("Return on Assets")]
    ReturnOnAssets,
    /// Goodwill over equity.
    #[display("Goodwill")]
    Goodwill,
    /// Net debt over equity.
    #[display("Gearing")]
    Gearing,
    /// Net debt over free cash flow.
    #[display("Dynamic Gearing")]
    DynamicGearing,
    /// Equity plus long-term debt over non-current assets.
    #[display("Asset Coverage Ratio")]
    AssetCoverageRatio,
    /// Price/earnings over earnings-per-share growth.
    #[display("PEG")]
    Peg,
    /// Price/revenue over revenue-per-share growth.
    #[display("PRG")]
    Prg,
    /// Price/free cash flow over free-cash-flow-per-share growth.
    #[display("PFCG")]
    Pfcg,
    /// Price/book over book-value-per-share growth.
    #[display("PBG")]
    Pbg,
}

impl RuleKind {
    /// Every preset, in default ranking order.
    pub const fn all() -> [Self; 11] {
        [
            Self::EquityRatio,
            Self::NettoMargin,
            Self::ReturnOnAssets,
            Self::Goodwill,
            Self::Gearing,
            Self::DynamicGearing,
            Self::AssetCoverageRatio,
            Self::Peg,
            Self::Prg,
            Self::Pfcg,
            Self::Pbg,
        ]
    }

    /// Configuration name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EquityRatio => "equity_ratio",
            Self::NettoMargin => "netto_margin",
            Self::ReturnOnAssets => "return_on_assets",
            Self::Goodwill => "goodwill",
            Self::Gearing => "gearing",
            Self::DynamicGearing => "dynamic_gearing",
            Self::AssetCoverageRatio => "asset_coverage_ratio",
            Self::Peg => "peg",
            Self::Prg => "prg",
            Self::Pfcg => "pfcg",
            Self::Pbg => "pbg",
        }
    }

    /// Default cutoffs.
    pub fn default_cutoffs(&self) -> Vec<f64> {
        match self {
            Self::EquityRatio => vec![10.0, 30.0],
            Self::NettoMargin => vec![10.0, 20.0],
            Self::ReturnOnAssets => vec![5.0, 10.0],
            Self::Goodwill => vec![0.0, 30.0],
            Self::Gearing => vec![20.0, 60.0],
            Self::DynamicGearing => vec![2.0, 5.0],
            Self::AssetCoverageRatio => vec![100.0, 200.0],
            Self::Peg | Self::Prg | Self::Pfcg | Self::Pbg => vec![0.8, 1.2],
        }
    }

    /// Default scores.
    pub fn default_scores(&self) -> Vec<f64> {
        match self {
            Self::EquityRatio
            | Self::NettoMargin
            | Self::ReturnOnAssets
            | Self::AssetCoverageRatio => vec![0.0, 1.0, 2.0],
            Self::Goodwill => vec![0.0, 1.0, 0.0],
            Self::Gearing
            | Self::DynamicGearing
            | Self::Peg
            | Self::Prg
            | Self::Pfcg
            | Self::Pbg => vec![2.0, 1.0, 0.0],
        }
    }

    /// Whether the rule depends on per-share growth.
    pub const fn is_growth_adjusted(&self) -> bool {
        matches!(self, Self::Peg | Self::Prg | Self::Pfcg | Self::Pbg)
    }

    /// Build the rule.
    ///
    /// # Errors
    ///
    /// [`RankingError::InvalidRule`] for malformed cutoffs or scores.
    pub fn build(
        self,
        cutoffs: Vec<f64>,
        scores: Vec<f64>,
        growth_years: usize,
    ) -> Result<RangeRankingObject> {
        let description = self.to_string();
        match self {
            Self::EquityRatio => RangeRankingObject::new(
                description,
                series_accessor(|c| c.balance().equity_ratio()),
                cutoffs,
                scores,
            ),
            Self::NettoMargin => RangeRankingObject::new(
                description,
                series_accessor(|c| c.income().netto_margin()),
                cutoffs,
                scores,
            ),
            Self::ReturnOnAssets => RangeRankingObject::new(
                description,
                series_accessor(Contract::return_on_assets),
                cutoffs,
                scores,
            ),
            Self::Goodwill => RangeRankingObject::new(
                description,
                series_accessor(|c| c.balance().goodwill_ratio()),
                cutoffs,
                scores,
            ),
            Self::Gearing => RangeRankingObject::new(
                description,
                series_accessor(|c| c.balance().gearing()),
                cutoffs,
                scores,
            ),
            Self::DynamicGearing => RangeRankingObject::new(
                description,
                series_accessor(Contract::dynamic_gearing),
                cutoffs,
                scores,
            ),
            Self::AssetCoverageRatio => RangeRankingObject::new(
                description,
                series_accessor(|c| c.balance().asset_coverage_ratio()),
                cutoffs,
                scores,
            ),
            Self::Peg => growth_adjusted(
                description,
                accessor(move |c, at| Ok(c.peg(growth_years, at)?)),
                ("PE > 0", accessor(|c, at| Ok(c.price_to_earnings(at)?))),
                accessor(move |c, at| per_share_growth(Self::Peg, c, at, growth_years)),
                cutoffs,
                scores,
            ),
            Self::Prg => growth_adjusted(
                description,
                accessor(move |c, at| Ok(c.prg(growth_years, at)?)),
                ("PR > 0", accessor(|c, at| Ok(c.price_to_revenue(at)?))),
                accessor(move |c, at| per_share_growth(Self::Prg, c, at, growth_years)),
                cutoffs,
                scores,
            ),
            Self::Pfcg => growth_adjusted(
                description,
                accessor(move |c, at| Ok(c.pfcg(growth_years, at)?)),
                ("PFC > 0", accessor(|c, at| Ok(c.price_to_free_cashflow(at)?))),
                accessor(move |c, at| per_share_growth(Self::Pfcg, c, at, growth_years)),
                cutoffs,
                scores,
            ),
            Self::Pbg => growth_adjusted(
                description,
                accessor(move |c, at| Ok(c.pbg(growth_years, at)?)),
                ("PB > 0", accessor(|c, at| Ok(c.price_to_book(at)?))),
                accessor(move |c, at| per_share_growth(Self::Pbg, c, at, growth_years)),
                cutoffs,
                scores,
            ),
        }
    }

    /// Build the rule with its default cutoffs and scores.
    pub fn build_default(self) -> Result<RangeRankingObject> {
        self.build(
            self.default_cutoffs(),
            self.default_scores(),
            DEFAULT_GROWTH_YEARS,
        )
    }
}

impl FromStr for RuleKind {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::all()
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s) || k.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| RankingError::UnknownRule(s.to_string()))
    }
}

fn growth_adjusted(
    description: String,
    ratio: Accessor,
    price_ratio: (&str, Accessor),
    growth: Accessor,
    cutoffs: Vec<f64>,
    scores: Vec<f64>,
) -> Result<RangeRankingObject> {
    let (price_label, price_accessor) = price_ratio;
    let growth_label = format!("{description} growth > 0");
    Ok(RangeRankingObject::new(description, ratio, cutoffs, scores)?
        .with_constraint(Constraint::value(
            price_label,
            price_accessor,
            Comparison::Greater,
            0.0,
        ))
        .with_constraint(Constraint::value(
            growth_label,
            growth,
            Comparison::Greater,
            0.0,
        )))
}

/// Configured rule: a preset with optional overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Preset to build.
    pub rule: RuleKind,
    /// Cutoffs, the preset's when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoffs: Option<Vec<f64>>,
    /// Scores, the preset's when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
    /// Growth years of growth-adjusted rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_years: Option<usize>,
}

impl RuleSpec {
    /// Spec of a preset with its defaults.
    pub const fn preset(rule: RuleKind) -> Self {
        Self {
            rule,
            cutoffs: None,
            scores: None,
            growth_years: None,
        }
    }

    /// Build the rule.
    ///
    /// # Errors
    ///
    /// [`RankingError::InvalidRule`] for malformed overrides.
    pub fn build(&self) -> Result<Box<dyn RankingObject>> {
        let rule = self.rule.build(
            self.cutoffs
                .clone()
                .unwrap_or_else(|| self.rule.default_cutoffs()),
            self.scores
                .clone()
                .unwrap_or_else(|| self.rule.default_scores()),
            self.growth_years.unwrap_or(DEFAULT_GROWTH_YEARS),
        )?;
        Ok(Box::new(rule))
    }
}

/// Build every spec.
///
/// # Errors
///
/// The first invalid spec.
pub fn build_rules(specs: &[RuleSpec]) -> Result<Vec<Box<dyn RankingObject>>> {
    specs.iter().map(RuleSpec::build).collect()
}

/// Specs of every preset with defaults.
pub fn default_specs() -> Vec<RuleSpec> {
    RuleKind::all().into_iter().map(RuleSpec::preset).collect()
}

/// Every preset with defaults.
pub fn default_rules() -> Result<Vec<Box<dyn RankingObject>>> {
    build_rules(&default_specs())
}

/// Per-share growth behind a growth-adjusted preset, the value of its
/// "growth > 0" constraint.
///
/// # Errors
///
/// [`RuleEvaluationError::Unavailable`] for presets that are not growth
/// adjusted.
pub fn per_share_growth(
    kind: RuleKind,
    contract: &Contract,
    at: &Selection,
    growth_years: usize,
) -> std::result::Result<f64, RuleEvaluationError> {
    let series = match kind {
        RuleKind::Peg => contract.earnings_per_share_growth(growth_years),
        RuleKind::Prg => contract.revenue_per_share_growth(growth_years),
        RuleKind::Pfcg => contract.free_cashflow_per_share_growth(growth_years),
        RuleKind::Pbg => contract.book_value_per_share_growth(growth_years),
        other => {
            return Err(RuleEvaluationError::Unavailable(format!(
                "{other} is not growth adjusted"
            )));
        }
    };
    Ok(contract.value_at(&series, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::RankingFlag;
    use chrono::NaiveDate;
    use tally_data::{BalanceField, ContractInfo, IncomeField};

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
    }

    fn contract(price: f64, eps: [f64; 4]) -> Contract {
        let mut info = ContractInfo::new("Acme", "Industrials");
        info.price = price;
        let mut c = Contract::new("ACME").with_info(info);
        c.set_periods(
            vec![2023, 2022, 2021, 2020],
            vec![date(2023), date(2022), date(2021), date(2020)],
        )
        .unwrap();
        c.income_mut()
            .set_field(IncomeField::NetIncome, eps.to_vec())
            .unwrap();
        c.balance_mut()
            .set_field(BalanceField::TotalOutstandingSharesCommonStock, vec![1.0; 4])
            .unwrap();
        c
    }

    #[test]
    fn test_defaults_are_valid() {
        let rules = default_rules().unwrap();
        assert_eq!(rules.len(), 11);
        assert_eq!(rules[0].description(), "Equity Ratio");
        assert_eq!(rules[0].cutoffs(), &[10.0, 30.0]);
        assert_eq!(rules[3].description(), "Goodwill");
    }

    #[test]
    fn test_rule_kind_parse() {
        assert_eq!("peg".parse::<RuleKind>().unwrap(), RuleKind::Peg);
        assert_eq!("Equity Ratio".parse::<RuleKind>().unwrap(), RuleKind::EquityRatio);
        assert!(matches!(
            "alpha".parse::<RuleKind>(),
            Err(RankingError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_spec_from_json() {
        let spec: RuleSpec =
            serde_json::from_str(r#"{"rule": "gearing", "cutoffs": [10, 50]}"#).unwrap();
        assert_eq!(spec.rule, RuleKind::Gearing);
        let rule = spec.build().unwrap();
        assert_eq!(rule.cutoffs(), &[10.0, 50.0]);
        assert_eq!(rule.description(), "Gearing");

        let bad: RuleSpec = serde_json::from_str(r#"{"rule": "gearing", "scores": [1, 2]}"#).unwrap();
        assert!(bad.build().is_err());
    }

    #[test]
    fn test_peg_scored() {
        // eps grows 10% a year over three years, PE is 10, PEG 1.0
        let c = contract(133.1, [13.31, 12.1, 11.0, 10.0]);
        let rule = RuleKind::Peg.build_default().unwrap();
        let result = rule.rank(&c, &Selection::latest());
        assert_eq!(result.flag(), RankingFlag::Ok);
        assert!((result.value() - 1.0).abs() < 1e-9);
        assert_eq!(result.score(), 0.5);
    }

    #[test]
    fn test_peg_negative_growth_is_constraint() {
        let c = contract(100.0, [8.0, 9.0, 10.0, 11.0]);
        let rule = RuleKind::Peg.build_default().unwrap();
        let result = rule.rank(&c, &Selection::latest());
        assert_eq!(result.flag(), RankingFlag::Constraint);
        assert_eq!(result.score(), 0.0);
        assert_eq!(result.max_score(), 2.0);
    }

    #[test]
    fn test_peg_without_price_is_no_data() {
        let c = contract(f64::NAN, [13.31, 12.1, 11.0, 10.0]);
        let result = RuleKind::Peg.build_default().unwrap().rank(&c, &Selection::latest());
        assert_eq!(result.flag(), RankingFlag::NoData);
    }

    #[test]
    fn test_per_share_growth() {
        let c = contract(100.0, [13.31, 12.1, 11.0, 10.0]);
        let g = per_share_growth(RuleKind::Peg, &c, &Selection::latest(), 1).unwrap();
        assert!((g - 10.0).abs() < 1e-9);
        assert!(per_share_growth(RuleKind::Gearing, &c, &Selection::latest(), 1).is_err());
    }
}
