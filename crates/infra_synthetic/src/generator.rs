//! Synthetic record generator core.
//!
//! [`SyntheticGenerator`] owns the random source and the clock; the entity
//! specific generators live in [`master`](crate::master),
//! [`trades`](crate::trades) and [`risk`](crate::risk).

use crate::error::GeneratorResult;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use infra_store::batch::{Batch, Record};
use infra_store::registry::TypeRegistry;
use infra_store::schema::EntitySchema;
use rand::rngs::ThreadRng;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Builder;

/// Business date and wall-clock time used for generated timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    /// Business date (`asOfDate`)
    pub as_of: NaiveDate,
    /// Reference instant for `updatedAt` / `calculatedAt`
    pub now: NaiveDateTime,
}

impl Clock {
    /// Local date and time.
    pub fn system() -> Self {
        let now = Local::now().naive_local();
        Self {
            as_of: now.date(),
            now,
        }
    }

    pub fn fixed(as_of: NaiveDate, now: NaiveDateTime) -> Self {
        Self { as_of, now }
    }

    /// Midnight of the business date.
    pub fn as_of_midnight(&self) -> NaiveDateTime {
        self.as_of.and_time(NaiveTime::MIN)
    }
}

/// Generates batches of synthetic records.
///
/// Values are drawn from `R`; pass a seeded RNG and a fixed [`Clock`] for
/// repeatable output.
pub struct SyntheticGenerator<'a, R: Rng> {
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) rng: R,
    pub(crate) clock: Clock,
}

impl<'a> SyntheticGenerator<'a, ThreadRng> {
    /// Generator over the thread RNG and the system clock.
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self::with_rng(registry, rand::thread_rng(), Clock::system())
    }
}

impl<'a, R: Rng> SyntheticGenerator<'a, R> {
    pub fn with_rng(registry: &'a TypeRegistry, rng: R, clock: Clock) -> Self {
        Self {
            registry,
            rng,
            clock,
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Uniform pick from a non-empty constant pool.
    pub(crate) fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pool[self.rng.gen_range(0..pool.len())]
    }

    /// Uniform decimal in `[low, high]` with `dp` fractional digits.
    pub(crate) fn decimal(&mut self, low: i64, high: i64, dp: u32) -> Decimal {
        let factor = 10_i64.pow(dp);
        self.scaled(low * factor, high * factor, dp)
    }

    /// Uniform decimal of `[low, high]` units of `10^-dp`.
    pub(crate) fn scaled(&mut self, low: i64, high: i64, dp: u32) -> Decimal {
        Decimal::new(self.rng.gen_range(low..=high), dp)
    }

    /// Uniform float in `[low, high)` rounded to `dp` places.
    pub(crate) fn float(&mut self, low: f64, high: f64, dp: i32) -> f64 {
        let factor = 10_f64.powi(dp);
        (self.rng.gen_range(low..high) * factor).round() / factor
    }

    /// Random number with at most `digits` decimal digits.
    pub(crate) fn number(&mut self, digits: u32) -> u64 {
        self.rng.gen_range(0..10_u64.pow(digits))
    }

    /// Random version 4 UUID in hyphenated form.
    pub(crate) fn uuid(&mut self) -> String {
        Builder::from_random_bytes(self.rng.gen())
            .into_uuid()
            .to_string()
    }

    /// Up to an hour before the clock's `now`.
    pub(crate) fn recent(&mut self) -> NaiveDateTime {
        self.clock.now - Duration::minutes(self.rng.gen_range(0..=60))
    }

    /// Date between `min_days` and `max_days` before the business date.
    pub(crate) fn days_back(&mut self, min_days: i64, max_days: i64) -> NaiveDate {
        self.clock.as_of - Duration::days(self.rng.gen_range(min_days..=max_days))
    }

    /// `true` with probability `p`.
    pub(crate) fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    /// Assemble generated records into a batch.
    pub(crate) fn finish(
        &self,
        entity: &'static EntitySchema,
        records: &[Record],
    ) -> GeneratorResult<Batch> {
        let batch = Batch::from_records(entity, self.registry, records)?;
        debug!(entity = entity.name, rows = batch.num_rows(), "generated batch");
        Ok(batch)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn fixed_clock() -> Clock {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        Clock::fixed(as_of, as_of.and_hms_opt(18, 30, 0).unwrap())
    }

    pub(crate) fn seeded(registry: &TypeRegistry, seed: u64) -> SyntheticGenerator<'_, StdRng> {
        SyntheticGenerator::with_rng(registry, StdRng::seed_from_u64(seed), fixed_clock())
    }

    #[test]
    fn test_decimal_range_and_scale() {
        let registry = TypeRegistry::new();
        let mut generator = seeded(&registry, 1);
        for _ in 0..200 {
            let d = generator.decimal(1_000_000, 50_000_000, 2);
            assert!(d >= Decimal::new(1_000_000, 0) && d <= Decimal::new(50_000_000, 0));
            assert_eq!(d.scale(), 2);
        }
    }

    #[test]
    fn test_float_rounding() {
        let registry = TypeRegistry::new();
        let mut generator = seeded(&registry, 2);
        for _ in 0..200 {
            let x = generator.float(0.8, 1.2, 6);
            assert!((0.8..=1.2).contains(&x));
            assert!(((x * 1e6).round() - x * 1e6).abs() < 1e-6);
        }
    }

    #[test]
    fn test_uuid_is_v4() {
        let registry = TypeRegistry::new();
        let mut generator = seeded(&registry, 3);
        let id = generator.uuid();
        assert_eq!(id.len(), 36);
        assert_eq!(&id[14..15], "4");
    }

    #[test]
    fn test_recent_is_within_the_hour() {
        let registry = TypeRegistry::new();
        let mut generator = seeded(&registry, 4);
        let now = fixed_clock().now;
        for _ in 0..100 {
            let t = generator.recent();
            assert!(t <= now && t >= now - Duration::minutes(60));
        }
    }

    #[test]
    fn test_same_seed_same_values() {
        let registry = TypeRegistry::new();
        let mut a = seeded(&registry, 9);
        let mut b = seeded(&registry, 9);
        assert_eq!(a.uuid(), b.uuid());
        assert_eq!(a.number(8), b.number(8));
    }
}
