//! Contract metrics addressable by name.
//!
//! Used by configuration-driven screeners to refer to a metric without code.

use tally_data::Contract;

/// Per-period metric series of a contract.
pub type SeriesFn = fn(&Contract) -> Vec<f64>;

/// Scalar descriptive value of a contract.
pub type ScalarFn = fn(&Contract) -> f64;

/// Text descriptive value of a contract.
pub type TextFn = fn(&Contract) -> String;

/// Named per-period metrics.
pub const SERIES: &[(&str, SeriesFn)] = &[
    ("revenue", |c: &Contract| c.revenue()),
    ("net_income", |c: &Contract| c.net_income()),
    ("ebit", |c: &Contract| c.income().ebit()),
    ("ebit_margin", |c: &Contract| c.income().ebit_margin()),
    ("netto_margin", |c: &Contract| c.income().netto_margin()),
    ("ebitda", |c: &Contract| c.ebitda()),
    ("ebitda_margin", |c: &Contract| c.ebitda_margin()),
    ("equity", |c: &Contract| c.balance().equity()),
    ("equity_ratio", |c: &Contract| c.balance().equity_ratio()),
    ("goodwill_ratio", |c: &Contract| c.balance().goodwill_ratio()),
    ("net_debt", |c: &Contract| c.balance().net_debt()),
    ("gearing", |c: &Contract| c.balance().gearing()),
    ("dynamic_gearing", |c: &Contract| c.dynamic_gearing()),
    ("asset_coverage_ratio", |c: &Contract| c.balance().asset_coverage_ratio()),
    ("free_cashflow", |c: &Contract| c.cashflow().free_cashflow()),
    ("return_on_assets", |c: &Contract| c.return_on_assets()),
    ("return_on_equity", |c: &Contract| c.return_on_equity()),
    ("earnings_per_share", |c: &Contract| c.earnings_per_share()),
    ("revenue_per_share", |c: &Contract| c.revenue_per_share()),
    ("free_cashflow_per_share", |c: &Contract| c.free_cashflow_per_share()),
    ("book_value_per_share", |c: &Contract| c.book_value_per_share()),
];

/// Named descriptive scalars.
pub const SCALARS: &[(&str, ScalarFn)] = &[
    ("price", |c: &Contract| c.info().price),
    ("trailing_pe", |c: &Contract| c.info().trailing_pe),
    ("forward_pe", |c: &Contract| c.info().forward_pe),
    ("market_cap", |c: &Contract| c.info().market_cap),
    ("dividend_yield", |c: &Contract| c.info().dividend_yield),
    ("payout_ratio", |c: &Contract| c.info().payout_ratio),
];

/// Named descriptive texts.
pub const TEXTS: &[(&str, TextFn)] = &[
    ("ticker", |c: &Contract| c.ticker().to_string()),
    ("long_name", |c: &Contract| c.long_name().to_string()),
    ("sector", |c: &Contract| c.sector().to_string()),
    ("coa_type", |c: &Contract| c.coa_type().to_string()),
];

/// Per-period metric by name.
pub fn series(name: &str) -> Option<SeriesFn> {
    SERIES.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

/// Descriptive scalar by name.
pub fn scalar(name: &str) -> Option<ScalarFn> {
    SCALARS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

/// Descriptive text by name.
pub fn text(name: &str) -> Option<TextFn> {
    TEXTS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}
