//! Market-data access: the source contract, concrete sources, reference cache.

pub mod csv_source;
pub mod memory;
pub mod reference;
pub mod source;

pub use csv_source::CsvSource;
pub use memory::InMemorySource;
pub use reference::ReferenceCache;
pub use source::{Adjustment, DataError, TimeSeriesSource};
