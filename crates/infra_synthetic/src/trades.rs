//! Trade generator.

use crate::error::GeneratorResult;
use crate::generator::SyntheticGenerator;
use crate::pools::{
    COLLAT_TYPES, CURRENCIES, FUNDING_LEG_TYPES, FX_PAIRS, PORTFOLIOS, PRODUCT_SUBTYPES,
    PRODUCT_TYPES, PTS, SURNAMES, TRADE_STATUSES,
};
use crate::reference::{check_reference, required_text, ReferencePool};
use crate::unique::UniqueGuard;
use chrono::{Duration, NaiveTime};
use infra_store::batch::{Batch, Record};
use infra_store::entities::{COUNTERPARTY, HMS_BOOK, INSTRUMENT, TRADE};
use rand::Rng;

/// Counterparty used when no counterparty batch is supplied.
pub const DEFAULT_COUNTERPARTY: &str = "DEFAULT_CP";
/// Instrument `(id, name)` used when no instrument batch is supplied.
pub const DEFAULT_INSTRUMENT: (&str, &str) = ("DEFAULT_ID", "DEFAULT_NAME");
/// Book used when no book batch is supplied.
pub const DEFAULT_BOOK: &str = "DEFAULT_BOOK";

/// Reference batches trades are drawn against.
///
/// A `None` entry falls back to the matching placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeReferences<'b> {
    pub counterparties: Option<&'b Batch>,
    pub instruments: Option<&'b Batch>,
    pub books: Option<&'b Batch>,
}

impl<'b> TradeReferences<'b> {
    pub fn new(counterparties: &'b Batch, instruments: &'b Batch, books: &'b Batch) -> Self {
        Self {
            counterparties: Some(counterparties),
            instruments: Some(instruments),
            books: Some(books),
        }
    }
}

/// Sampling pools resolved from [`TradeReferences`].
struct TradePools {
    counterparties: ReferencePool<String>,
    instruments: ReferencePool<(String, Option<String>)>,
    books: ReferencePool<String>,
}

impl TradePools {
    fn resolve(refs: &TradeReferences<'_>) -> GeneratorResult<Self> {
        let counterparties = match refs.counterparties {
            Some(batch) => ReferencePool::keys(batch, &COUNTERPARTY, "name")?,
            None => {
                ReferencePool::placeholder(COUNTERPARTY.name, DEFAULT_COUNTERPARTY.to_string())
            }
        };
        let instruments = match refs.instruments {
            Some(batch) => {
                check_reference(batch, &INSTRUMENT)?;
                let pairs = required_text(batch, "id")?
                    .into_iter()
                    .zip(batch.text_values("name")?)
                    .collect();
                ReferencePool::new(INSTRUMENT.name, pairs)?
            }
            None => ReferencePool::placeholder(
                INSTRUMENT.name,
                (
                    DEFAULT_INSTRUMENT.0.to_string(),
                    Some(DEFAULT_INSTRUMENT.1.to_string()),
                ),
            ),
        };
        let books = match refs.books {
            Some(batch) => ReferencePool::keys(batch, &HMS_BOOK, "name")?,
            None => ReferencePool::placeholder(HMS_BOOK.name, DEFAULT_BOOK.to_string()),
        };
        Ok(Self {
            counterparties,
            instruments,
            books,
        })
    }
}

impl<R: Rng> SyntheticGenerator<'_, R> {
    /// Generate `count` trades referencing `refs`.
    ///
    /// Each trade copies one sampled counterparty name, instrument
    /// `(id, name)` pair and book name verbatim.
    ///
    /// # Errors
    /// Fails when a supplied reference batch is empty, holds the wrong
    /// entity or has a null key.
    pub fn trades(&mut self, count: usize, refs: TradeReferences<'_>) -> GeneratorResult<Batch> {
        let pools = TradePools::resolve(&refs)?;
        let as_of = self.clock.as_of;
        let snap_id = format!("REPO:{}", as_of.format("%Y%m%d"));

        let mut ids = UniqueGuard::new();
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let id = ids.next(|| self.number(15) as i64, |base, n| base + n as i64);
            let trade_dt = self.days_back(0, 365);
            let maturity_dt = trade_dt + Duration::days(self.rng.gen_range(30..=1825));
            let execution_dt = trade_dt.and_time(NaiveTime::MIN)
                + Duration::hours(self.rng.gen_range(8..=16))
                + Duration::minutes(self.rng.gen_range(0..=59));

            let counterparty = pools.counterparties.sample(&mut self.rng).clone();
            let (collat_id, collat_desc) = pools.instruments.sample(&mut self.rng).clone();
            let book = pools.books.sample(&mut self.rng).clone();

            let project_name = if self.chance(0.7) {
                None
            } else {
                Some(format!("PROJ_{}", self.number(4)))
            };
            let maturity_is_open = if self.chance(0.5) { "true" } else { "false" };

            let record = Record::new()
                .with("asOfDate", as_of)
                .with("jobId", self.uuid())
                .with("snapId", snap_id.as_str())
                .with("id", id)
                .with("version", 0_i64)
                .with("tradeId", self.number(8).to_string())
                .with("status", self.pick(TRADE_STATUSES))
                .with("pts", self.pick(PTS))
                .with("hmsBook", book)
                .with("portfolio", self.pick(PORTFOLIOS))
                .with("productType", self.pick(PRODUCT_TYPES))
                .with("productSubType", self.pick(PRODUCT_SUBTYPES))
                .with("tradeDt", trade_dt)
                .with("startDt", trade_dt)
                .with("maturityDt", maturity_dt)
                .with("maturityIsOpen", maturity_is_open)
                .with("executionDt", execution_dt)
                .with("counterParty", counterparty)
                .with("treatsCode", format!("TC{}", self.number(6)))
                .with("traderName", self.pick(SURNAMES).to_uppercase())
                .with("projectName", project_name)
                .with("haircut", self.float(0.0, 0.1, 4))
                .with("collatCurrency", self.pick(CURRENCIES))
                .with("settlementCurrency", self.pick(CURRENCIES))
                .with("collatId", collat_id)
                .with("collatDesc", collat_desc)
                .with("collatNotional", self.decimal(1_000_000, 50_000_000, 2))
                .with("collatType", self.pick(COLLAT_TYPES))
                .with("fundingLegType", self.pick(FUNDING_LEG_TYPES))
                .with("fundingLegNotional", self.decimal(1_000_000, 50_000_000, 2))
                .with("fundingLegCurrency", self.pick(CURRENCIES))
                .with("fundingLegMargin", self.scaled(0, 1_000, 4))
                .with("pxInception", self.float(0.8, 1.2, 6))
                .with("pxInceptionClean", self.float(0.8, 1.2, 6))
                .with("sideFactor", 1.0)
                .with("fxPair", self.pick(FX_PAIRS))
                .with("fxPairFunding", self.pick(FX_PAIRS));
            records.push(record);
        }
        self.finish(&TRADE, &records)
    }
}
