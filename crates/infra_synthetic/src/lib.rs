//! # infra_synthetic
//!
//! Synthetic reference, trade and risk data for the risk loader.
//!
//! Master entities (books, counterparties, instruments) are drawn from fixed
//! candidate pools with unique natural keys. Trades sample their references
//! from previously generated batches; risk, risk MV and P&L rows are derived
//! from a trade batch.
//!
//! ## Example
//!
//! ```
//! use infra_synthetic::prelude::*;
//! use infra_store::registry::TypeRegistry;
//!
//! let registry = TypeRegistry::new();
//! let mut generator = SyntheticGenerator::new(&registry);
//!
//! let books = generator.books(3).unwrap();
//! let counterparties = generator.counterparties(3).unwrap();
//! let instruments = generator.instruments(3).unwrap();
//! let trades = generator
//!     .trades(10, TradeReferences::new(&counterparties, &instruments, &books))
//!     .unwrap();
//! let risks = generator.risks(&trades, 2).unwrap();
//! assert_eq!(risks.num_rows(), 20);
//! ```

pub mod error;
pub mod generator;
pub mod master;
pub mod pools;
pub mod reference;
pub mod risk;
pub mod trades;
pub mod unique;

pub mod prelude {
    pub use crate::error::{GeneratorError, GeneratorResult};
    pub use crate::generator::{Clock, SyntheticGenerator};
    pub use crate::reference::ReferencePool;
    pub use crate::trades::{
        TradeReferences, DEFAULT_BOOK, DEFAULT_COUNTERPARTY, DEFAULT_INSTRUMENT,
    };
    pub use crate::unique::UniqueGuard;
}
