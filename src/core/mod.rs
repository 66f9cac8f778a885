//! Core module - part numbering, search, duplicate screening, lifecycle and storage

pub mod catalog;
pub mod config;
pub mod duplicates;
pub mod identity;
pub mod lifecycle;
pub mod project;
pub mod search;
pub mod similarity;
pub mod store;

pub use catalog::{Catalog, CatalogError, Category, FieldType, MetadataField};
pub use config::Config;
pub use duplicates::{find_potential_duplicates, find_potential_duplicates_with_threshold, DuplicateMatch};
pub use identity::{
    generate_part_number, next_revision, next_sequence, next_variance, parse_part_number,
    PartIdentifier, PartNumberError,
};
pub use lifecycle::{
    plan_new_part, plan_note, plan_revision, plan_status_change, plan_variant, ChangeSet, LifecycleError,
};
pub use project::{Project, ProjectError};
pub use store::{MemoryStore, PartStore, ProjectStore, StoreError};
