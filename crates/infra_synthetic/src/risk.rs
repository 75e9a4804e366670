//! Trade-derived generators: risk snapshots, denormalized risk and P&L.
//!
//! Dependents are fanned out by cycling the whole trade batch, so with `n`
//! records per trade and `p` trades the output holds `n * p` rows and every
//! trade key appears exactly `n` times.

use crate::error::{GeneratorError, GeneratorResult};
use crate::generator::SyntheticGenerator;
use crate::pools::{
    BUSINESS_UNITS, CURRENCIES, SUB_BUSINESS_UNITS, VC_PRODUCTS, VC_PRODUCT_GROUPS,
};
use chrono::Duration;
use infra_store::batch::{Batch, Record};
use infra_store::entities::{PNL_EOD, RISK, RISK_MV, TRADE};
use infra_store::value::Value;
use rand::Rng;
use std::collections::HashSet;

/// Trade columns copied into dependents, read once per batch.
struct TradeColumns {
    len: usize,
    columns: Vec<(&'static str, Vec<Value>)>,
}

impl TradeColumns {
    fn read(trades: &Batch, fields: &[&'static str]) -> GeneratorResult<Self> {
        if trades.entity().name != TRADE.name {
            return Err(GeneratorError::WrongEntity {
                expected: TRADE.name,
                found: trades.entity().name,
            });
        }
        let columns = fields
            .iter()
            .map(|field| -> GeneratorResult<_> { Ok((*field, trades.values(field)?)) })
            .collect::<GeneratorResult<Vec<_>>>()?;
        Ok(Self {
            len: trades.num_rows(),
            columns,
        })
    }

    fn get(&self, field: &str, row: usize) -> Value {
        self.columns
            .iter()
            .find(|(name, _)| *name == field)
            .map_or(Value::Null, |(_, values)| values[row].clone())
    }
}

fn check_fan_out(per_trade: usize) -> GeneratorResult<()> {
    if per_trade == 0 {
        return Err(GeneratorError::InvalidFanOut(per_trade));
    }
    Ok(())
}

impl<R: Rng> SyntheticGenerator<'_, R> {
    /// Generate `per_trade` risk snapshots for every trade.
    ///
    /// Trade keys, counterparty and collateral columns are copied from the
    /// parent trade.
    pub fn risks(&mut self, trades: &Batch, per_trade: usize) -> GeneratorResult<Batch> {
        check_fan_out(per_trade)?;
        let parents = TradeColumns::read(
            trades,
            &[
                "id",
                "asOfDate",
                "tradeId",
                "counterParty",
                "collatId",
                "collatDesc",
            ],
        )?;
        let snap_id = format!("RISK:{}", self.clock.as_of.format("%Y%m%d"));

        let total = parents.len * per_trade;
        let mut records = Vec::with_capacity(total);
        for i in 0..total {
            let row = i % parents.len;
            let record = Record::new()
                .with("jobId", self.uuid())
                .with("asOfDate", parents.get("asOfDate", row))
                .with("snapId", snap_id.as_str())
                .with("id", parents.get("id", row))
                .with("tradeId", parents.get("tradeId", row))
                .with("counterParty", parents.get("counterParty", row))
                .with("collatId", parents.get("collatId", row))
                .with("collatDesc", parents.get("collatDesc", row))
                .with("collatConcentration", self.float(0.0, 1.0, 4))
                .with("collatName", format!("Collateral_{}", i))
                .with("collatTicker", format!("TICK_{}", self.number(4)))
                .with("collatIssuer", format!("ISSUER_{}", self.number(4)))
                .with("outstandingAmt", self.decimal(1_000_000, 50_000_000, 2))
                .with("dtm", format!("{}D", self.rng.gen_range(1..=365)))
                .with("age", format!("{}D", self.rng.gen_range(1..=100)))
                .with("tenor", format!("{}Y", self.rng.gen_range(1..=10)))
                .with("fxSpot", self.float(0.8, 1.2, 6))
                .with("fxSpotFunding", self.float(0.8, 1.2, 6))
                .with("fxSpotEOD", self.float(0.8, 1.2, 6))
                .with("fundingAmount", self.decimal(1_000_000, 50_000_000, 2))
                .with("collateralAmount", self.decimal(1_000_000, 50_000_000, 2))
                .with("cashOut", self.decimal(-1_000_000, 1_000_000, 2))
                .with("accrualDaily", self.decimal(0, 10_000, 2))
                .with("accrualProjected", self.decimal(0, 100_000, 2))
                .with("accrualRealised", self.decimal(0, 50_000, 2))
                .with("pxEOD", self.scaled(800_000, 1_200_000, 6))
                .with("pxLast", self.float(0.8, 1.2, 6))
                .with("realizedMarginCall", self.float(-100_000.0, 100_000.0, 2))
                .with("expectedMarginCall", self.float(-100_000.0, 100_000.0, 2))
                .with("financingExposure", self.float(-1_000_000.0, 1_000_000.0, 2))
                .with("calculatedAt", self.recent())
                .with("updatedAt", self.recent());
            records.push(record);
        }
        self.finish(&RISK, &records)
    }

    /// Generate `per_trade` denormalized risk rows for every trade.
    pub fn risk_mv(&mut self, trades: &Batch, per_trade: usize) -> GeneratorResult<Batch> {
        check_fan_out(per_trade)?;
        let parents = TradeColumns::read(trades, &["tradeId", "counterParty", "hmsBook"])?;
        let as_of = self.clock.as_of;
        let midnight = self.clock.as_of_midnight();

        let total = parents.len * per_trade;
        let mut records = Vec::with_capacity(total);
        for i in 0..total {
            let row = i % parents.len;
            let record = Record::new()
                .with("id", self.uuid())
                .with("asOfDate", midnight)
                .with("updatedAt", self.recent())
                .with("bu", self.pick(BUSINESS_UNITS))
                .with("sbu", self.pick(SUB_BUSINESS_UNITS))
                .with("portfolio", format!("PORT_{}", self.number(4)))
                .with("book", parents.get("hmsBook", row))
                .with("tradeId", parents.get("tradeId", row))
                .with("ccy", self.pick(CURRENCIES))
                .with("tradeCcy", self.pick(CURRENCIES))
                .with("instrument", format!("INST_{}", self.number(6)))
                .with("tradeStatus", self.rng.gen_range(0..=3_i64))
                .with("version", f64::from(self.rng.gen_range(1..=5_i32)))
                .with("cashOut", self.float(-1_000_000.0, 1_000_000.0, 2))
                .with("projectedCashOut", self.float(-1_000_000.0, 1_000_000.0, 2))
                .with("realisedCashOut", self.float(-1_000_000.0, 1_000_000.0, 2))
                .with("notional", self.float(1_000_000.0, 50_000_000.0, 2))
                .with("vcProduct", self.pick(VC_PRODUCTS))
                .with("vcProductGroup", self.pick(VC_PRODUCT_GROUPS))
                .with("counterparty", parents.get("counterParty", row))
                .with("obligor", format!("OBL_{}", self.number(4)))
                .with("tradeDate", self.days_back(0, 365))
                .with("startDate", self.days_back(0, 365))
                .with(
                    "maturityDate",
                    as_of + Duration::days(self.rng.gen_range(30..=730)),
                )
                .with("underlyingCcy", self.float(1_000_000.0, 50_000_000.0, 2))
                .with(
                    "underlyingAmount",
                    format!("{:.2}", self.float(1_000_000.0, 50_000_000.0, 2)),
                )
                .with("calculatedAt", self.recent());
            records.push(record);
        }
        self.finish(&RISK_MV, &records)
    }

    /// Generate one end-of-day P&L row per distinct trade book.
    ///
    /// Books keep the order in which they first appear in `trades`; trades
    /// without a book are skipped.
    pub fn pnl_eod(&mut self, trades: &Batch) -> GeneratorResult<Batch> {
        let parents = TradeColumns::read(trades, &["hmsBook"])?;
        let mut seen = HashSet::new();
        let books: Vec<String> = (0..parents.len)
            .filter_map(|row| match parents.get("hmsBook", row) {
                Value::Text(book) => Some(book),
                _ => None,
            })
            .filter(|book| seen.insert(book.clone()))
            .collect();

        let midnight = self.clock.as_of_midnight();
        let mut records = Vec::with_capacity(books.len());
        for book in books {
            let record = Record::new()
                .with("id", self.uuid())
                .with("asOfDate", midnight)
                .with("updatedAt", self.recent())
                .with("bu", self.pick(&BUSINESS_UNITS[..3]))
                .with("sbu", self.pick(SUB_BUSINESS_UNITS))
                .with("portfolio", format!("PORT_{}", self.number(4)))
                .with("book", book)
                .with("YTD", self.float(100_000.0, 1_000_000.0, 2))
                .with("MTD", self.float(10_000.0, 100_000.0, 2))
                .with("DTD", self.float(1_000.0, 10_000.0, 2))
                .with("AOP", self.float(800_000.0, 8_000_000.0, 2))
                .with("PPNL", self.float(1_000_000.0, 10_000_000.0, 2))
                .with("calculatedAt", self.recent());
            records.push(record);
        }
        self.finish(&PNL_EOD, &records)
    }
}
