//! Cash flow statement.

use super::{LineItemField, NanPolicy, Statement, StatementKind, zip_with};

/// Cash flow line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CashFlowField {
    /// Cash from operating activities (`OTLO`).
    OperatingCashflow,
    /// Depreciation (`SDED`).
    Depreciation,
    /// Amortization (`SAMT`).
    Amortization,
    /// Capital expenditure (`SCEX`).
    CapitalExpenditure,
}

impl LineItemField for CashFlowField {
    const KIND: StatementKind = StatementKind::CashFlow;

    const ALL: &'static [Self] = &[
        Self::OperatingCashflow,
        Self::Depreciation,
        Self::Amortization,
        Self::CapitalExpenditure,
    ];

    fn code(self) -> &'static str {
        match self {
            Self::OperatingCashflow => "OTLO",
            Self::Depreciation => "SDED",
            Self::Amortization => "SAMT",
            Self::CapitalExpenditure => "SCEX",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::OperatingCashflow => "operating_cashflow",
            Self::Depreciation => "depreciation",
            Self::Amortization => "amortization",
            Self::CapitalExpenditure => "capital_expenditure",
        }
    }

    // add-backs and capex are reported blank when the company has none
    fn nan_policy(self) -> NanPolicy {
        match self {
            Self::OperatingCashflow => NanPolicy::Keep,
            _ => NanPolicy::Zero,
        }
    }
}

/// Cash flow statement.
pub type CashFlow = Statement<CashFlowField>;

impl Statement<CashFlowField> {
    /// Operating cash flow.
    pub fn operating_cashflow(&self) -> &[f64] {
        self.field(CashFlowField::OperatingCashflow)
    }

    /// Depreciation plus amortization.
    pub fn depreciation_and_amortization(&self) -> Vec<f64> {
        zip_with(
            self.field(CashFlowField::Depreciation),
            self.field(CashFlowField::Amortization),
            |d, a| d + a,
        )
    }

    /// Operating cash flow minus capital expenditure.
    pub fn free_cashflow(&self) -> Vec<f64> {
        zip_with(
            self.operating_cashflow(),
            self.field(CashFlowField::CapitalExpenditure),
            |o, c| o - c,
        )
    }
}
