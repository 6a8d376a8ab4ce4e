//! Balance sheet.

use super::{LineItemField, NanPolicy, Statement, StatementKind, percent, zip_with};

/// Balance sheet line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BalanceField {
    /// Common stock equity (`QTLE`).
    CommonStockEquity,
    /// Total debt (`STLD`).
    TotalDebt,
    /// Total liabilities (`LTLL`).
    TotalLiabilities,
    /// Total current assets (`ATCA`).
    TotalCurrentAssets,
    /// Total assets (`ATOT`).
    TotalAssets,
    /// Total common shares outstanding (`QTCO`).
    TotalOutstandingSharesCommonStock,
    /// Cash and short-term investments (`SCSI`).
    CashAndShortTermInvestments,
    /// Book value per share (`STBP`).
    BookValuePerShare,
    /// Goodwill (`AGWI`).
    Goodwill,
    /// Current portion of long-term debt and capital leases (`LCLD`).
    CurrentPortionOfLongTermDebtAndCapitalLeaseObligations,
    /// Short-term debt (`LSTD`).
    ShortTermDebt,
    /// Accrued expenses (`LAEX`).
    AccruedExpenses,
    /// Total long-term debt (`LTTD`).
    TotalLongTermDebt,
}

impl LineItemField for BalanceField {
    const KIND: StatementKind = StatementKind::Balance;

    const ALL: &'static [Self] = &[
        Self::CommonStockEquity,
        Self::TotalDebt,
        Self::TotalLiabilities,
        Self::TotalCurrentAssets,
        Self::TotalAssets,
        Self::TotalOutstandingSharesCommonStock,
        Self::CashAndShortTermInvestments,
        Self::BookValuePerShare,
        Self::Goodwill,
        Self::CurrentPortionOfLongTermDebtAndCapitalLeaseObligations,
        Self::ShortTermDebt,
        Self::AccruedExpenses,
        Self::TotalLongTermDebt,
    ];

    fn code(self) -> &'static str {
        match self {
            Self::CommonStockEquity => "QTLE",
            Self::TotalDebt => "STLD",
            Self::TotalLiabilities => "LTLL",
            Self::TotalCurrentAssets => "ATCA",
            Self::TotalAssets => "ATOT",
            Self::TotalOutstandingSharesCommonStock => "QTCO",
            Self::CashAndShortTermInvestments => "SCSI",
            Self::BookValuePerShare => "STBP",
            Self::Goodwill => "AGWI",
            Self::CurrentPortionOfLongTermDebtAndCapitalLeaseObligations => "LCLD",
            Self::ShortTermDebt => "LSTD",
            Self::AccruedExpenses => "LAEX",
            Self::TotalLongTermDebt => "LTTD",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::CommonStockEquity => "common_stock_equity",
            Self::TotalDebt => "total_debt",
            Self::TotalLiabilities => "total_liabilities",
            Self::TotalCurrentAssets => "total_current_assets",
            Self::TotalAssets => "total_assets",
            Self::TotalOutstandingSharesCommonStock => "total_outstanding_shares_common_stock",
            Self::CashAndShortTermInvestments => "cash_and_short_term_investments",
            Self::BookValuePerShare => "book_value_per_share",
            Self::Goodwill => "goodwill",
            Self::CurrentPortionOfLongTermDebtAndCapitalLeaseObligations => {
                "current_portion_of_long_term_debt_and_capital_lease_obligations"
            }
            Self::ShortTermDebt => "short_term_debt",
            Self::AccruedExpenses => "accrued_expenses",
            Self::TotalLongTermDebt => "total_long_term_debt",
        }
    }

    fn nan_policy(self) -> NanPolicy {
        match self {
            Self::Goodwill
            | Self::CurrentPortionOfLongTermDebtAndCapitalLeaseObligations
            | Self::ShortTermDebt
            | Self::AccruedExpenses
            | Self::TotalLongTermDebt => NanPolicy::Zero,
            _ => NanPolicy::Keep,
        }
    }
}

/// Balance sheet.
pub type BalanceSheet = Statement<BalanceField>;

impl Statement<BalanceField> {
    /// Total assets.
    pub fn total_assets(&self) -> &[f64] {
        self.field(BalanceField::TotalAssets)
    }

    /// Shares outstanding.
    pub fn shares_outstanding(&self) -> &[f64] {
        self.field(BalanceField::TotalOutstandingSharesCommonStock)
    }

    /// Shareholders' equity: total assets minus total liabilities.
    pub fn equity_shareholders(&self) -> Vec<f64> {
        zip_with(
            self.total_assets(),
            self.field(BalanceField::TotalLiabilities),
            |a, l| a - l,
        )
    }

    /// Alias of [`Self::equity_shareholders`].
    pub fn equity(&self) -> Vec<f64> {
        self.equity_shareholders()
    }

    /// Equity as a percentage of total assets.
    pub fn equity_ratio(&self) -> Vec<f64> {
        percent(&self.equity(), self.total_assets())
    }

    /// Goodwill as a percentage of equity.
    pub fn goodwill_ratio(&self) -> Vec<f64> {
        percent(self.field(BalanceField::Goodwill), &self.equity())
    }

    /// Short-term debt, current portion of long-term debt and accrued expenses.
    pub fn total_short_term_debt(&self) -> Vec<f64> {
        let partial = zip_with(
            self.field(BalanceField::ShortTermDebt),
            self.field(BalanceField::CurrentPortionOfLongTermDebtAndCapitalLeaseObligations),
            |a, b| a + b,
        );
        zip_with(&partial, self.field(BalanceField::AccruedExpenses), |a, b| a + b)
    }

    /// Total debt minus cash and short-term investments.
    pub fn net_debt(&self) -> Vec<f64> {
        let debt = zip_with(
            &self.total_short_term_debt(),
            self.field(BalanceField::TotalLongTermDebt),
            |a, b| a + b,
        );
        zip_with(
            &debt,
            self.field(BalanceField::CashAndShortTermInvestments),
            |d, c| d - c,
        )
    }

    /// Net debt as a percentage of equity.
    pub fn gearing(&self) -> Vec<f64> {
        percent(&self.net_debt(), &self.equity())
    }

    /// Total assets minus total current assets.
    pub fn total_non_current_assets(&self) -> Vec<f64> {
        zip_with(
            self.total_assets(),
            self.field(BalanceField::TotalCurrentAssets),
            |a, c| a - c,
        )
    }

    /// Equity plus long-term debt as a percentage of non-current assets.
    pub fn asset_coverage_ratio(&self) -> Vec<f64> {
        let covered = zip_with(
            &self.equity(),
            self.field(BalanceField::TotalLongTermDebt),
            |e, d| e + d,
        );
        percent(&covered, &self.total_non_current_assets())
    }
}
