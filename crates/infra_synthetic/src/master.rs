//! Master data generators: books, counterparties and instruments.

use crate::error::GeneratorResult;
use crate::generator::SyntheticGenerator;
use crate::pools::{
    COMPANY_FORMS, COMPANY_SUFFIXES, COUNTERPARTY_STATUSES, COUNTERPARTY_TYPES, COUNTRY_CODES,
    DESCRIPTION_WORDS, DESKS, INDUSTRIES, INSTRUMENT_STATUSES, INSTRUMENT_TYPES, RATINGS,
    RATING_AGENCIES, REGIONS, SECTORS, SURNAMES,
};
use crate::unique::UniqueGuard;
use infra_store::batch::{Batch, Record};
use infra_store::entities::{COUNTERPARTY, HMS_BOOK, INSTRUMENT};
use rand::Rng;

/// Longest generated instrument description.
pub const MAX_DESCRIPTION_LEN: usize = 100;

impl<R: Rng> SyntheticGenerator<'_, R> {
    /// Generate `count` trading books with unique names.
    pub fn books(&mut self, count: usize) -> GeneratorResult<Batch> {
        let mut names = UniqueGuard::new();
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let name = names.next(
                || format!("BOOK_{:06}", self.number(6)),
                |base, n| format!("{}_{}", base, n),
            );
            let desk = self.pick(DESKS);
            let updated_at = self.recent();
            records.push(
                Record::new()
                    .with("name", name)
                    .with("desk", desk)
                    .with("updatedAt", updated_at),
            );
        }
        self.finish(&HMS_BOOK, &records)
    }

    /// Generate `count` counterparties with unique names.
    pub fn counterparties(&mut self, count: usize) -> GeneratorResult<Batch> {
        let mut names = UniqueGuard::new();
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let name = names.next(|| self.company(), |base, n| format!("{} {}", base, n));
            let lei: String = self
                .uuid()
                .replace('-', "")
                .to_uppercase()
                .chars()
                .take(20)
                .collect();
            let record = Record::new()
                .with("name", name)
                .with("shortName", format!("CP_{}", self.number(4)))
                .with("type", self.pick(COUNTERPARTY_TYPES))
                .with("region", self.pick(REGIONS))
                .with("country", self.pick(COUNTRY_CODES))
                .with("sector", self.pick(SECTORS))
                .with("industry", self.pick(INDUSTRIES))
                .with("rating", self.pick(RATINGS))
                .with("ratingAgency", self.pick(RATING_AGENCIES))
                .with("lei", lei)
                .with("status", self.pick(COUNTERPARTY_STATUSES))
                .with("updatedAt", self.recent());
            records.push(record);
        }
        self.finish(&COUNTERPARTY, &records)
    }

    /// Generate `count` collateral instruments with unique ids.
    pub fn instruments(&mut self, count: usize) -> GeneratorResult<Batch> {
        let mut ids = UniqueGuard::new();
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let id = ids.next(
                || format!("INST_{:08}", self.number(8)),
                |base, n| format!("{}_{}", base, n),
            );
            let name = format!("{} {}", self.company(), self.pick(INSTRUMENT_TYPES));
            let record = Record::new()
                .with("id", id)
                .with("type", self.pick(INSTRUMENT_TYPES))
                .with("name", name)
                .with("description", self.description())
                .with("status", self.pick(INSTRUMENT_STATUSES))
                .with("updatedAt", self.recent());
            records.push(record);
        }
        self.finish(&INSTRUMENT, &records)
    }

    fn company(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(SURNAMES),
            self.pick(COMPANY_SUFFIXES),
            self.pick(COMPANY_FORMS)
        )
    }

    /// Sentence of pool words, at most [`MAX_DESCRIPTION_LEN`] chars.
    fn description(&mut self) -> String {
        let words = self.rng.gen_range(5..=16);
        let mut text = String::with_capacity(MAX_DESCRIPTION_LEN);
        for _ in 0..words {
            let word = self.pick(DESCRIPTION_WORDS);
            // room for the separator and the final period
            if text.len() + word.len() + 2 > MAX_DESCRIPTION_LEN {
                break;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(word);
        }
        if let Some(first) = text.get(..1) {
            text.replace_range(..1, &first.to_uppercase());
        }
        text.push('.');
        text
    }
}
