//! Entity declarations for the risk data warehouse.
//!
//! Master entities (books, counterparties, instruments) are keyed by their
//! natural key and deduplicated on `updatedAt`. Trades are deduplicated on
//! `version`; risk and the derived aggregates on `calculatedAt`.

use crate::schema::{EntitySchema, FieldDef};
use crate::types::ScalarType::{Date, Decimal, Float64, Int64, Text, Timestamp};

/// Trading book.
pub const HMS_BOOK: EntitySchema = EntitySchema {
    name: "HmsBook",
    default_table: "hmsbook_f",
    fields: &[
        FieldDef::required("name", Text),
        FieldDef::required("desk", Text),
        FieldDef::required("updatedAt", Timestamp),
    ],
    discriminant: "updatedAt",
    order_by: &["name"],
};

/// Counterparty master record.
pub const COUNTERPARTY: EntitySchema = EntitySchema {
    name: "Counterparty",
    default_table: "counterparty_f",
    fields: &[
        FieldDef::required("name", Text),
        FieldDef::optional("shortName", Text),
        FieldDef::optional("type", Text),
        FieldDef::optional("region", Text),
        FieldDef::optional("country", Text),
        FieldDef::optional("sector", Text),
        FieldDef::optional("industry", Text),
        FieldDef::optional("rating", Text),
        FieldDef::optional("ratingAgency", Text),
        FieldDef::optional("lei", Text),
        FieldDef::optional("status", Text),
        FieldDef::required("updatedAt", Timestamp),
    ],
    discriminant: "updatedAt",
    order_by: &["name"],
};

/// Collateral instrument master record.
pub const INSTRUMENT: EntitySchema = EntitySchema {
    name: "Instrument",
    default_table: "instrument_f",
    fields: &[
        FieldDef::required("id", Text),
        FieldDef::optional("type", Text),
        FieldDef::optional("name", Text),
        FieldDef::optional("description", Text),
        FieldDef::optional("status", Text),
        FieldDef::required("updatedAt", Timestamp),
    ],
    discriminant: "updatedAt",
    order_by: &["id"],
};

/// Financing trade.
pub const TRADE: EntitySchema = EntitySchema {
    name: "Trade",
    default_table: "trades_f",
    fields: &[
        FieldDef::required("asOfDate", Date),
        FieldDef::optional("jobId", Text),
        FieldDef::optional("snapId", Text),
        FieldDef::required("id", Int64),
        FieldDef::required("version", Int64),
        FieldDef::optional("tradeId", Text),
        FieldDef::optional("status", Text),
        FieldDef::optional("pts", Text),
        FieldDef::optional("hmsBook", Text),
        FieldDef::optional("portfolio", Text),
        FieldDef::optional("productType", Text),
        FieldDef::optional("productSubType", Text),
        FieldDef::optional("tradeDt", Date),
        FieldDef::optional("startDt", Date),
        FieldDef::optional("maturityDt", Date),
        FieldDef::optional("maturityIsOpen", Text),
        FieldDef::optional("executionDt", Timestamp),
        FieldDef::optional("counterParty", Text),
        FieldDef::optional("treatsCode", Text),
        FieldDef::optional("traderName", Text),
        FieldDef::optional("projectName", Text),
        FieldDef::optional("qmlError", Text),
        FieldDef::optional("model", Text),
        FieldDef::optional("side", Text),
        FieldDef::optional("haircut", Float64),
        FieldDef::optional("collatCurrency", Text),
        FieldDef::optional("settlementCurrency", Text),
        FieldDef::optional("collatId", Text),
        FieldDef::optional("collatDesc", Text),
        FieldDef::optional("collatNotional", Decimal),
        FieldDef::optional("collatType", Text),
        FieldDef::optional("fundingLegType", Text),
        FieldDef::optional("fundingLegNotional", Decimal),
        FieldDef::optional("fundingLegCurrency", Text),
        FieldDef::optional("fundingLegMargin", Decimal),
        FieldDef::optional("fundingLegFixingLabel", Text),
        FieldDef::optional("iaAmount", Decimal),
        FieldDef::optional("iaCcy", Text),
        FieldDef::optional("pxInception", Float64),
        FieldDef::optional("pxInceptionClean", Float64),
        FieldDef::optional("pxFactorInception", Float64),
        FieldDef::optional("sideFactor", Float64),
        FieldDef::optional("fxPair", Text),
        FieldDef::optional("fxPairFunding", Text),
    ],
    discriminant: "version",
    order_by: &["asOfDate", "id"],
};

/// Risk snapshot of a trade.
///
/// Cash, accrual and exposure amounts are decimals; prices and FX rates are
/// floats.
pub const RISK: EntitySchema = EntitySchema {
    name: "Risk",
    default_table: "risk_f",
    fields: &[
        FieldDef::optional("jobId", Text),
        FieldDef::required("asOfDate", Date),
        FieldDef::optional("snapId", Text),
        FieldDef::required("id", Int64),
        FieldDef::optional("tradeId", Text),
        FieldDef::optional("counterParty", Text),
        FieldDef::optional("collatId", Text),
        FieldDef::optional("collatDesc", Text),
        FieldDef::optional("collatConcentration", Float64),
        FieldDef::optional("collatName", Text),
        FieldDef::optional("collatTicker", Text),
        FieldDef::optional("collatIssuer", Text),
        FieldDef::optional("outstandingAmt", Decimal),
        FieldDef::optional("dtm", Text),
        FieldDef::optional("age", Text),
        FieldDef::optional("tenor", Text),
        FieldDef::optional("fxSpot", Float64),
        FieldDef::optional("fxSpotFunding", Float64),
        FieldDef::optional("fxSpotEOD", Float64),
        FieldDef::optional("fundingAmount", Decimal),
        FieldDef::optional("collateralAmount", Decimal),
        FieldDef::optional("cashOut", Decimal),
        FieldDef::optional("accrualDaily", Decimal),
        FieldDef::optional("accrualProjected", Decimal),
        FieldDef::optional("accrualRealised", Decimal),
        FieldDef::optional("pxEOD", Decimal),
        FieldDef::optional("pxLast", Float64),
        FieldDef::optional("realizedMarginCall", Float64),
        FieldDef::optional("expectedMarginCall", Float64),
        FieldDef::optional("financingExposure", Float64),
        FieldDef::required("calculatedAt", Timestamp),
        FieldDef::required("updatedAt", Timestamp),
    ],
    discriminant: "calculatedAt",
    order_by: &["asOfDate", "id"],
};

/// Denormalized risk record for reporting.
pub const RISK_MV: EntitySchema = EntitySchema {
    name: "RiskMV",
    default_table: "risk_mv_f",
    fields: &[
        FieldDef::required("id", Text),
        FieldDef::required("asOfDate", Timestamp),
        FieldDef::required("updatedAt", Timestamp),
        FieldDef::optional("bu", Text),
        FieldDef::optional("sbu", Text),
        FieldDef::optional("portfolio", Text),
        FieldDef::required("book", Text),
        FieldDef::optional("tradeId", Text),
        FieldDef::optional("ccy", Text),
        FieldDef::optional("tradeCcy", Text),
        FieldDef::optional("instrument", Text),
        FieldDef::optional("tradeStatus", Int64),
        FieldDef::optional("version", Float64),
        FieldDef::optional("cashOut", Float64),
        FieldDef::optional("projectedCashOut", Float64),
        FieldDef::optional("realisedCashOut", Float64),
        FieldDef::optional("notional", Float64),
        FieldDef::optional("vcProduct", Text),
        FieldDef::optional("vcProductGroup", Text),
        FieldDef::optional("counterparty", Text),
        FieldDef::optional("obligor", Text),
        FieldDef::optional("tradeDate", Date),
        FieldDef::optional("startDate", Date),
        FieldDef::optional("maturityDate", Date),
        FieldDef::optional("underlyingCcy", Float64),
        FieldDef::optional("underlyingAmount", Text),
        FieldDef::required("calculatedAt", Timestamp),
    ],
    discriminant: "calculatedAt",
    order_by: &["asOfDate", "id"],
};

/// End-of-day P&L per book.
pub const PNL_EOD: EntitySchema = EntitySchema {
    name: "PnLEod",
    default_table: "pnl_eod",
    fields: &[
        FieldDef::required("id", Text),
        FieldDef::required("asOfDate", Timestamp),
        FieldDef::required("updatedAt", Timestamp),
        FieldDef::optional("bu", Text),
        FieldDef::optional("sbu", Text),
        FieldDef::optional("portfolio", Text),
        FieldDef::required("book", Text),
        FieldDef::optional("YTD", Float64),
        FieldDef::optional("MTD", Float64),
        FieldDef::optional("DTD", Float64),
        FieldDef::optional("AOP", Float64),
        FieldDef::optional("PPNL", Float64),
        FieldDef::required("calculatedAt", Timestamp),
    ],
    discriminant: "calculatedAt",
    order_by: &["asOfDate", "id"],
};

/// Every entity in provisioning order.
pub const ALL: [&EntitySchema; 7] = [
    &HMS_BOOK,
    &COUNTERPARTY,
    &INSTRUMENT,
    &TRADE,
    &RISK,
    &RISK_MV,
    &PNL_EOD,
];

/// Look up an entity by name (case-insensitive).
pub fn by_name(name: &str) -> Option<&'static EntitySchema> {
    ALL.iter()
        .copied()
        .find(|entity| entity.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;

    #[test]
    fn test_all_entities_validate() {
        for entity in ALL {
            assert!(entity.validate().is_ok(), "{} should validate", entity.name);
        }
    }

    #[test]
    fn test_discriminants() {
        assert_eq!(TRADE.discriminant, "version");
        assert_eq!(RISK.discriminant, "calculatedAt");
        assert_eq!(RISK_MV.discriminant, "calculatedAt");
        assert_eq!(PNL_EOD.discriminant, "calculatedAt");
        assert_eq!(COUNTERPARTY.discriminant, "updatedAt");
        assert_eq!(INSTRUMENT.discriminant, "updatedAt");
        assert_eq!(HMS_BOOK.discriminant, "updatedAt");
    }

    #[test]
    fn test_table_names_are_distinct() {
        let mut tables: Vec<_> = ALL.iter().map(|e| e.default_table).collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), ALL.len());
    }

    #[test]
    fn test_trade_monetary_fields_are_decimal() {
        let registry = TypeRegistry::new();
        for name in ["collatNotional", "fundingLegNotional", "fundingLegMargin", "iaAmount"] {
            let field = TRADE.field(name).unwrap();
            assert_eq!(
                registry.store_type(field.field_type).to_string(),
                "Nullable(Decimal(38, 18))"
            );
        }
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("trade"), Some(&TRADE));
        assert_eq!(by_name("HMSBOOK"), Some(&HMS_BOOK));
        assert!(by_name("unknown").is_none());
    }
}
