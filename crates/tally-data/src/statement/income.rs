//! Income statement.

use super::{CoaType, LineItemField, NanPolicy, Statement, StatementKind, percent, zip_with};

/// Income statement line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IncomeField {
    /// Net income (`NINC`).
    NetIncome,
    /// Interest income, bank layout (`SIIB`).
    InterestIncome,
    /// Non-interest income, bank layout (`SNII`).
    NonInterestIncome,
    /// Revenue, industry layout (`RTLR`).
    Revenue,
    /// Gross profit (`SGRP`).
    GrossProfit,
    /// Selling, general and administrative expenses (`SSGA`).
    SellingGeneralAdmin,
    /// Total operating expenses (`ETOE`).
    TotalOperatingExpenses,
    /// Research and development (`ERAD`); missing values count as zero.
    ResearchDevelopment,
}

impl LineItemField for IncomeField {
    const KIND: StatementKind = StatementKind::Income;

    const ALL: &'static [Self] = &[
        Self::NetIncome,
        Self::InterestIncome,
        Self::NonInterestIncome,
        Self::Revenue,
        Self::GrossProfit,
        Self::SellingGeneralAdmin,
        Self::TotalOperatingExpenses,
        Self::ResearchDevelopment,
    ];

    fn code(self) -> &'static str {
        match self {
            Self::NetIncome => "NINC",
            Self::InterestIncome => "SIIB",
            Self::NonInterestIncome => "SNII",
            Self::Revenue => "RTLR",
            Self::GrossProfit => "SGRP",
            Self::SellingGeneralAdmin => "SSGA",
            Self::TotalOperatingExpenses => "ETOE",
            Self::ResearchDevelopment => "ERAD",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::NetIncome => "net_income",
            Self::InterestIncome => "interest_income",
            Self::NonInterestIncome => "non_interest_income",
            Self::Revenue => "revenue",
            Self::GrossProfit => "gross_profit",
            Self::SellingGeneralAdmin => "selling_general_admin",
            Self::TotalOperatingExpenses => "total_operating_expenses",
            Self::ResearchDevelopment => "research_development",
        }
    }

    fn nan_policy(self) -> NanPolicy {
        match self {
            Self::ResearchDevelopment => NanPolicy::Zero,
            _ => NanPolicy::Keep,
        }
    }

    fn applies_to(self, coa_type: CoaType) -> bool {
        match self {
            Self::NetIncome => true,
            Self::InterestIncome | Self::NonInterestIncome => coa_type == CoaType::Bank,
            _ => coa_type != CoaType::Bank,
        }
    }
}

/// Income statement. Banks use the interest-income layout; industry,
/// insurance and utility companies share the revenue layout.
pub type Income = Statement<IncomeField>;

impl Statement<IncomeField> {
    /// Net income.
    pub fn net_income(&self) -> &[f64] {
        self.field(IncomeField::NetIncome)
    }

    /// Revenue; for banks the sum of interest and non-interest income.
    pub fn revenue(&self) -> Vec<f64> {
        match self.coa_type() {
            CoaType::Bank => zip_with(
                self.field(IncomeField::InterestIncome),
                self.field(IncomeField::NonInterestIncome),
                |a, b| a + b,
            ),
            _ => self.field(IncomeField::Revenue).to_vec(),
        }
    }

    /// Earnings before interest and taxes. Undefined (NaN) for banks.
    pub fn ebit(&self) -> Vec<f64> {
        let revenue = self.revenue();
        match self.coa_type() {
            CoaType::Bank => vec![f64::NAN; revenue.len()],
            _ => zip_with(
                &revenue,
                self.field(IncomeField::TotalOperatingExpenses),
                |r, e| r - e,
            ),
        }
    }

    /// EBIT as a percentage of revenue.
    pub fn ebit_margin(&self) -> Vec<f64> {
        percent(&self.ebit(), &self.revenue())
    }

    /// Net income as a percentage of revenue.
    pub fn netto_margin(&self) -> Vec<f64> {
        percent(self.net_income(), &self.revenue())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn industry() -> Income {
        let mut income = Income::new(CoaType::Industry);
        income
            .set_periods(
                vec![2023, 2022],
                vec![
                    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                    NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
                ],
            )
            .unwrap();
        income.set_field(IncomeField::Revenue, vec![200.0, 100.0]).unwrap();
        income
            .set_field(IncomeField::TotalOperatingExpenses, vec![150.0, 90.0])
            .unwrap();
        income.set_field(IncomeField::NetIncome, vec![40.0, 5.0]).unwrap();
        income
    }

    #[test]
    fn test_fresh_statement_holds_sentinel() {
        let income = Income::new(CoaType::Industry);
        let revenue = income.field(IncomeField::Revenue);
        assert_eq!(revenue.len(), 1);
        assert!(revenue[0].is_nan());
        assert!(!income.is_populated(IncomeField::Revenue));
    }

    #[test]
    fn test_populated_nan_is_distinguishable() {
        let mut income = Income::new(CoaType::Industry);
        income.set_field(IncomeField::Revenue, vec![f64::NAN]).unwrap();
        assert!(income.is_populated(IncomeField::Revenue));
        assert!(income.revenue()[0].is_nan());
    }

    #[test]
    fn test_research_development_zero_policy() {
        let mut income = industry();
        income
            .set_field(IncomeField::ResearchDevelopment, vec![f64::NAN, 3.0])
            .unwrap();
        assert_eq!(income.field(IncomeField::ResearchDevelopment), &[0.0, 3.0]);
        income
            .set_field(IncomeField::GrossProfit, vec![f64::NAN, 3.0])
            .unwrap();
        assert!(income.field(IncomeField::GrossProfit)[0].is_nan());
    }

    #[test]
    fn test_industry_derived() {
        let income = industry();
        assert_eq!(income.ebit(), vec![50.0, 10.0]);
        assert_relative_eq!(income.ebit_margin()[0], 25.0);
        assert_relative_eq!(income.netto_margin()[0], 20.0);
        assert_relative_eq!(income.netto_margin()[1], 5.0);
    }

    #[test]
    fn test_bank_layout() {
        let mut income = Income::new(CoaType::Bank);
        income.set_field(IncomeField::InterestIncome, vec![60.0]).unwrap();
        income.set_field(IncomeField::NonInterestIncome, vec![40.0]).unwrap();
        income.set_field(IncomeField::NetIncome, vec![10.0]).unwrap();
        assert_eq!(income.revenue(), vec![100.0]);
        assert!(income.ebit()[0].is_nan());
        assert!(income.ebit_margin()[0].is_nan());
        assert_relative_eq!(income.netto_margin()[0], 10.0);
        assert!(!income.coa_items().contains_key("RTLR"));
        assert!(income.set_field(IncomeField::Revenue, vec![1.0]).is_err());
    }

    #[test]
    fn test_insurance_uses_industry_layout() {
        let income = Income::new(CoaType::Insurance);
        let codes = income.coa_items();
        assert!(codes.contains_key("RTLR"));
        assert!(codes.contains_key("NINC"));
        assert!(!codes.contains_key("SIIB"));
    }

    #[test]
    fn test_zero_revenue_gives_infinite_margin() {
        let mut income = Income::new(CoaType::Industry);
        income.set_field(IncomeField::Revenue, vec![0.0]).unwrap();
        income.set_field(IncomeField::NetIncome, vec![5.0]).unwrap();
        assert!(income.netto_margin()[0].is_infinite());
    }

    #[test]
    fn test_coa_item_round_trip() {
        let source = industry();
        let mut copy = Income::new(source.coa_type());
        copy.set_periods(
            source.fiscal_years().to_vec(),
            source.fiscal_year_end_dates().to_vec(),
        )
        .unwrap();
        for (code, field) in source.coa_items() {
            if source.is_populated(field) {
                copy.set_coa_item(code, source.field(field).to_vec()).unwrap();
            }
        }
        assert_eq!(copy.ebit(), source.ebit());
        assert_eq!(copy.netto_margin(), source.netto_margin());
        assert_eq!(copy.get_field("net_income").unwrap(), &[40.0, 5.0]);
    }

    #[test]
    fn test_switch_layout_keeps_shared_fields() {
        let mut income = industry();
        income.set_coa_type(CoaType::Bank);
        assert_eq!(income.net_income(), &[40.0, 5.0]);
        assert!(!income.is_populated(IncomeField::InterestIncome));
        assert!(income.get_field("revenue").is_err());
    }
}
