//! Sampling of reference records.

use crate::error::{GeneratorError, GeneratorResult};
use infra_store::batch::Batch;
use infra_store::schema::EntitySchema;
use rand::Rng;

/// Non-empty set of reference keys to sample from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePool<T> {
    entity: &'static str,
    items: Vec<T>,
}

impl<T> ReferencePool<T> {
    /// Pool over `items`.
    ///
    /// # Errors
    /// [`GeneratorError::EmptyReference`] if `items` is empty.
    pub fn new(entity: &'static str, items: Vec<T>) -> GeneratorResult<Self> {
        if items.is_empty() {
            return Err(GeneratorError::EmptyReference { entity });
        }
        Ok(Self { entity, items })
    }

    /// Single-item pool used when no reference batch is supplied.
    pub fn placeholder(entity: &'static str, item: T) -> Self {
        Self {
            entity,
            items: vec![item],
        }
    }

    /// Uniformly sample one item.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.items[rng.gen_range(0..self.items.len())]
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Check that `batch` holds `expected` rows and is not empty.
pub fn check_reference(batch: &Batch, expected: &EntitySchema) -> GeneratorResult<()> {
    if batch.entity().name != expected.name {
        return Err(GeneratorError::WrongEntity {
            expected: expected.name,
            found: batch.entity().name,
        });
    }
    if batch.is_empty() {
        return Err(GeneratorError::EmptyReference {
            entity: expected.name,
        });
    }
    Ok(())
}

/// Text column of a reference batch with nulls rejected.
pub fn required_text(batch: &Batch, field: &'static str) -> GeneratorResult<Vec<String>> {
    let entity = batch.entity().name;
    batch
        .text_values(field)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or(GeneratorError::NullReference { entity, field, row })
        })
        .collect()
}

impl ReferencePool<String> {
    /// Pool over the non-null text keys in `field` of `batch`.
    pub fn keys(
        batch: &Batch,
        expected: &EntitySchema,
        field: &'static str,
    ) -> GeneratorResult<Self> {
        check_reference(batch, expected)?;
        Self::new(expected.name, required_text(batch, field)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra_store::batch::Record;
    use infra_store::entities::{COUNTERPARTY, HMS_BOOK};
    use infra_store::registry::TypeRegistry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn books(names: &[&'static str]) -> Batch {
        let updated = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records: Vec<Record> = names
            .iter()
            .map(|n| {
                Record::new()
                    .with("name", *n)
                    .with("desk", "FX")
                    .with("updatedAt", updated)
            })
            .collect();
        Batch::from_records(&HMS_BOOK, &TypeRegistry::new(), &records).unwrap()
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = ReferencePool::<String>::new("HmsBook", Vec::new()).unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyReference { entity: "HmsBook" }));
    }

    #[test]
    fn test_samples_come_from_pool() {
        let pool = ReferencePool::keys(&books(&["B1", "B2", "B3"]), &HMS_BOOK, "name").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(pool.items().contains(pool.sample(&mut rng)));
        }
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = ReferencePool::keys(&books(&[]), &HMS_BOOK, "name").unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyReference { .. }));
    }

    #[test]
    fn test_wrong_entity_rejected() {
        let err = ReferencePool::keys(&books(&["B1"]), &COUNTERPARTY, "name").unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::WrongEntity {
                expected: "Counterparty",
                found: "HmsBook"
            }
        ));
    }
}
