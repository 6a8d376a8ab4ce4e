//! Built-in resolution tables for SEC financial reports.

use super::ResolutionTable;

const TOT_REVS_AND_OTHER: &str = "total revenues and other";
const TOT_REVS_AND_OTHER_INC: &str = "total revenues and other income";
const TOT_REVS_AND_NON_OP_INC: &str = "total revenues and non-operating income";
const TOT_REVS: &str = "total revenues";
const TOT_REV: &str = "total revenue";
const TOT_NET_REVS: &str = "total net revenues";
const TOT_OP_REVS: &str = "total operating revenues";
const TOT_OP_REV: &str = "total operating revenue";
const TOT_PROP_REVS: &str = "total property revenues";
const TOTAL: &str = "total";
const REVS_COMMA_NET: &str = "revenues, net";
const REVS: &str = "revenues";
const REV_CUST_INCL_TAX: &str = "revenue from contract with customer, including assessed tax";
const REV_CUST_EXCL_TAX: &str = "revenue from contract with customer, excluding assessed tax";
const REV_CUST: &str = "revenue from contract with customer";
const REV: &str = "revenue";
const OP_REVS: &str = "operating revenues";
const SALES_AND_OTHER_OP_REVS: &str = "sales and other operating revenues";
const SALES_AND_SERVICE_REVS: &str = "sales and service revenues";
const SALES: &str = "sales";
const SERVICE_REVS: &str = "service revenues";
const RENTAL_INC: &str = "rental income";
const NET_REVS: &str = "net revenues";
const NET_REV: &str = "net revenue";
const NET_SALES: &str = "net sales";
const NET_OP_REVS: &str = "net operating revenues";
const GROSS_REVS: &str = "gross revenues";
const OTHER_PROP_REVS: &str = "other property revenues";

/// Revenue synonyms and combinations.
pub(super) fn revenue() -> ResolutionTable {
    let known = [
        TOT_REVS_AND_OTHER,
        TOT_REVS_AND_NON_OP_INC,
        TOT_REVS_AND_OTHER_INC,
        TOT_REVS,
        TOT_REV,
        TOT_NET_REVS,
        TOT_OP_REVS,
        TOT_OP_REV,
        TOT_PROP_REVS,
        REVS_COMMA_NET,
        REVS,
        REV,
        OP_REVS,
        SALES_AND_SERVICE_REVS,
        SALES_AND_OTHER_OP_REVS,
        SALES,
        NET_SALES,
        NET_REVS,
        NET_REV,
        NET_OP_REVS,
        SERVICE_REVS,
        RENTAL_INC,
        TOTAL,
        REV_CUST,
        REV_CUST_EXCL_TAX,
        REV_CUST_INCL_TAX,
        OTHER_PROP_REVS,
        GROSS_REVS,
        "operating revenue",
        "gross operating revenues",
        "property revenues",
        "rental and other property revenues",
        "railway operating revenues",
        "net service revenues",
        "revenue, net",
        "revenue, total",
        "revenues and other income",
        "revenue from operations",
        "net sales and revenues",
        "net sales and operating revenues",
        "sales and revenues",
        "sales to customers",
        "total sales and service revenues",
        "total revenues, net",
        "total net sales",
        "total sales",
        "total net revenue",
        "total sales and revenues",
    ];

    let combinations = vec![
        vec![TOT_REVS_AND_OTHER, TOT_REVS],
        vec![TOT_REVS_AND_NON_OP_INC, SALES_AND_OTHER_OP_REVS],
        vec![TOT_REVS_AND_NON_OP_INC, SALES],
        vec![TOT_REVS, TOT_NET_REVS],
        vec![TOT_REVS, TOT_OP_REVS],
        vec![TOT_REVS, TOT_OP_REV],
        vec![TOT_REVS, TOTAL],
        vec![TOT_REVS, REVS_COMMA_NET],
        vec![TOT_REVS, REVS],
        vec![TOT_REVS, REV],
        vec![TOT_REVS, SALES],
        vec![TOT_REVS, SALES_AND_SERVICE_REVS],
        vec![TOT_REVS, NET_SALES],
        vec![TOT_REVS, NET_REVS],
        vec![TOT_REVS, SERVICE_REVS],
        vec![TOT_REVS, RENTAL_INC],
        vec![TOT_REVS, REV_CUST_EXCL_TAX],
        vec![TOT_REVS, REV_CUST_INCL_TAX],
        vec![TOT_REV, TOTAL],
        vec![TOT_REV, SALES],
        vec![TOT_REV, NET_SALES],
        vec![TOT_REV, NET_REV],
        vec![TOT_REV, REVS],
        vec![TOT_REV, REV],
        vec![TOT_REV, RENTAL_INC],
        vec![TOT_OP_REVS, OP_REVS],
        vec![TOT_OP_REVS, SERVICE_REVS],
        vec![TOT_OP_REVS, REV_CUST_INCL_TAX],
        vec![TOT_OP_REVS, "operating revenue"],
        vec![TOT_OP_REVS, REV_CUST_EXCL_TAX],
        vec![TOT_OP_REV, TOTAL],
        vec![TOT_REVS_AND_OTHER_INC, NET_SALES],
        vec![TOT_REVS_AND_OTHER_INC, SALES_AND_OTHER_OP_REVS],
        vec![TOT_PROP_REVS, OTHER_PROP_REVS],
        vec![TOTAL, OP_REVS],
        vec![TOTAL, REV_CUST],
        vec![TOTAL, SALES],
        vec![REVS, TOTAL],
        vec![REVS, OP_REVS],
        vec![REVS, NET_REVS],
        vec![REVS, NET_SALES],
        vec![REVS, REV_CUST_EXCL_TAX],
        vec![REVS, REV_CUST_INCL_TAX],
        vec![REV, REVS],
        vec![REV, TOTAL],
        vec![REV_CUST_EXCL_TAX, TOTAL],
        vec![NET_SALES, TOTAL],
        vec![NET_REVS, NET_SALES],
        vec![NET_REVS, TOTAL],
        vec![SALES, NET_SALES],
        vec![GROSS_REVS, NET_REVS],
        vec![GROSS_REVS, NET_OP_REVS],
        vec![GROSS_REVS, TOT_NET_REVS],
        vec![SERVICE_REVS, NET_OP_REVS],
        vec!["total net revenue", REVS],
        vec!["total sales and service revenues", SERVICE_REVS],
        vec!["revenues and other income", SALES_AND_OTHER_OP_REVS],
        vec!["gross operating revenues", NET_OP_REVS],
        vec!["net sales and revenues", REVS],
        vec!["net sales and revenues", TOTAL],
        vec![TOT_REVS_AND_OTHER, TOT_REVS, REV_CUST_INCL_TAX],
        vec![TOT_REVS, NET_REVS, REV_CUST],
        vec![TOT_REVS, RENTAL_INC, REV_CUST],
        vec![TOT_REVS, OP_REVS, SALES_AND_SERVICE_REVS],
        vec![TOT_REVS, REV_CUST_INCL_TAX, TOT_NET_REVS],
        vec![TOT_REVS, TOTAL, REVS],
        vec![TOT_REV, TOTAL, SALES],
        vec![TOT_REV, TOTAL, NET_REV],
        vec![TOT_PROP_REVS, TOT_OP_REVS, OTHER_PROP_REVS],
        vec![REV_CUST_INCL_TAX, TOT_OP_REVS, REV_CUST_EXCL_TAX],
    ];

    ResolutionTable::new(known, combinations)
        .with_ticker_combinations("AME", vec![vec![NET_SALES, TOTAL]])
        .with_ticker_combinations("DTE", vec![vec![OP_REVS, TOTAL]])
        .with_ticker_combinations(
            "EXC",
            vec![vec![TOT_OP_REVS, REV_CUST_INCL_TAX, REV_CUST_EXCL_TAX]],
        )
        .with_ticker_combinations("GOOG", vec![vec![REVS, TOTAL]])
        .with_ticker_combinations("GOOGL", vec![vec![REVS, TOTAL]])
        .with_ticker_combinations("GRMN", vec![vec![NET_SALES, TOTAL]])
}

const NET_INC: &str = "net income";
const NET_INC_LOSS: &str = "net income (loss)";
const NET_EARN: &str = "net earnings";
const NET_INC_PARENT: &str = "net income attributable to parent";
const NET_INC_LOSS_PARENT: &str = "net income (loss) attributable to parent";
const NET_INC_COMMON: &str = "net income attributable to common stockholders";
const NET_INC_MINORITY: &str = "net income including noncontrolling interest";

/// Net income synonyms and combinations.
pub(super) fn net_income() -> ResolutionTable {
    let known = [
        NET_INC,
        NET_INC_LOSS,
        NET_EARN,
        NET_INC_PARENT,
        NET_INC_LOSS_PARENT,
        NET_INC_COMMON,
        NET_INC_MINORITY,
        "net earnings (loss)",
        "net loss",
        "net (loss) income",
    ];
    let combinations = vec![
        vec![NET_INC_PARENT, NET_INC],
        vec![NET_INC_PARENT, NET_INC_MINORITY],
        vec![NET_INC_LOSS_PARENT, NET_INC_LOSS],
        vec![NET_INC, NET_INC_COMMON],
        vec![NET_INC, NET_INC_MINORITY],
        vec![NET_EARN, NET_INC_COMMON],
        vec![NET_INC_PARENT, NET_INC, NET_INC_MINORITY],
    ];
    ResolutionTable::new(known, combinations)
}

const CON_STS_OPER: &str = "Consolidated Statements of Oper";
const CON_ST_OPERA: &str = "Consolidated Statement of Opera";
const CON_ST_INCOM: &str = "Consolidated Statement of Incom";
const CON_STS_INCO: &str = "Consolidated Statements of Inco";
const CON_STS_COMP: &str = "Consolidated Statements of Comp";
const CON_STS_EARN: &str = "Consolidated Statements of Earn";
const COND_CON_STATEMEN: &str = "Condensed Consolidated Statemen";
const CON_ST_EARNI: &str = "Consolidated Statement of Earni";
const U_CON_STS_COM: &str = "Consolidated_Statements_of_Com";
const U_CON_STS_OPE: &str = "Consolidated_Statements_of_Ope";
const U_CON_STS_EAR: &str = "Consolidated_Statements_of_Ear";
const U_CON_STS_INC: &str = "Consolidated_Statements_of_Inc";
const U_COND_CON_STATEME: &str = "Condensed_Consolidated_Stateme";

/// Income statement sheet names. Spreadsheet sheet names are cut at 31
/// characters, so most entries are prefixes of the full statement title.
pub(super) fn income_sheets() -> ResolutionTable {
    let known = [
        CON_ST_INCOM,
        CON_STS_INCO,
        "Consolidated_Statement_of_Inco",
        U_CON_STS_INC,
        CON_STS_OPER,
        CON_ST_OPERA,
        U_CON_STS_OPE,
        "Consolidated_Statement_of_Oper",
        "CONSOLDIATED_STATEMENTS_OF_OPE",
        CON_STS_EARN,
        CON_ST_EARNI,
        U_CON_STS_EAR,
        "Consolidated_Statement_of_Earn",
        CON_STS_COMP,
        U_CON_STS_COM,
        "CONSOLIDATED STATEMENTS OF (LOS",
        "Consolidated Statement of (Loss",
        "CONSOLIDATED INCOME STATEMENTS",
        "Consolidated Income Statement",
        "Consolidated_Income_Statements",
        "Consolidated_Income_Statement",
        "CONSOLIDATED_CONDENSED_STATEME",
        "Consolidated Condensed Statemen",
        "Consolidated_Results_of_Operat",
        "Consolidated Results of Operati",
        "Consolidated Comprehensive Stat",
        "Consolidated_Comprehensive_Sta",
        "CONSOLIDATED_AND_COMBINED_STAT",
        "CONSOLIDATED AND COMBINED STATE",
        "Consolidated_and_Combined_Inco",
        COND_CON_STATEMEN,
        U_COND_CON_STATEME,
        "Statements Of Consolidated Earn",
        "STATEMENTS OF CONSOLIDATED OPER",
        "STATEMENTS OF CONSOLIDATED INCO",
        "Statement of Earnings",
        "Statement of Income",
        "Statements Of Income",
        "Statements of Operations",
        "income statements",
        "UNAUDITED CONDENSED CONSOLIDATE",
    ];

    let combinations = vec![
        vec![COND_CON_STATEMEN, CON_STS_COMP],
        vec![CON_STS_OPER, CON_STS_COMP],
        vec![CON_STS_OPER, CON_ST_OPERA],
        vec![CON_ST_OPERA, CON_STS_COMP],
        vec![CON_STS_INCO, CON_STS_COMP],
        vec![CON_STS_INCO, COND_CON_STATEMEN],
        vec![CON_ST_INCOM, CON_STS_COMP],
        vec![CON_ST_INCOM, COND_CON_STATEMEN],
        vec![CON_STS_EARN, CON_STS_COMP],
        vec![CON_STS_EARN, COND_CON_STATEMEN],
        vec![U_CON_STS_OPE, U_CON_STS_COM],
        vec![U_CON_STS_OPE, U_COND_CON_STATEME],
        vec![U_CON_STS_EAR, U_CON_STS_COM],
        vec![U_CON_STS_EAR, U_COND_CON_STATEME],
        vec![U_CON_STS_INC, U_CON_STS_COM],
        vec![U_CON_STS_INC, U_COND_CON_STATEME],
        vec!["CONSOLIDATED_CONDENSED_STATEME", U_CON_STS_INC],
        vec!["CONSOLIDATED INCOME STATEMENTS", CON_STS_COMP],
        vec!["Consolidated_Income_Statements", U_CON_STS_COM],
        vec!["CONSOLIDATED STATEMENTS OF (LOS", CON_STS_COMP],
        vec!["Consolidated Results of Operati", CON_STS_COMP],
        vec![CON_ST_EARNI, CON_STS_COMP],
        vec!["Consolidated_Results_of_Operat", U_CON_STS_COM],
        vec!["Consolidated_and_Combined_Inco", "CONSOLIDATED_AND_COMBINED_STAT"],
        vec![CON_STS_OPER, CON_STS_COMP, COND_CON_STATEMEN],
        vec![CON_ST_INCOM, CON_STS_INCO, CON_STS_COMP],
        vec![CON_STS_INCO, CON_STS_COMP, COND_CON_STATEMEN],
        vec![CON_STS_EARN, CON_ST_EARNI, CON_STS_COMP],
        vec![U_CON_STS_OPE, U_COND_CON_STATEME, U_CON_STS_COM],
        vec![U_CON_STS_OPE, U_CON_STS_COM, "Consolidated_Statement_of_Oper"],
        vec![U_CON_STS_INC, U_CON_STS_COM, U_COND_CON_STATEME],
        vec![U_CON_STS_EAR, "Consolidated_Statement_of_Earn", U_CON_STS_COM],
    ];

    ResolutionTable::new(known, combinations)
        .with_ticker_combinations("TMUS", vec![vec![CON_STS_COMP, COND_CON_STATEMEN]])
}
