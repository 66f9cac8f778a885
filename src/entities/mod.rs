//! Entity type definitions
//!
//! - [`Part`] - Engineering part keyed by its canonical part number
//! - [`ChangeLogEntry`] - Append-only audit trail entry for a part
//! - [`Manufacturer`] - Manufacturer referenced by parts

pub mod changelog;
pub mod manufacturer;
pub mod part;

pub use changelog::{Actor, ChangeLogEntry, ChangeType};
pub use manufacturer::{Manufacturer, ManufacturerDirectory, ManufacturerError};
pub use part::{DraftError, Part, PartDraft, PartStatus};
