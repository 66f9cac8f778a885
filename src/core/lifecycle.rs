//! Part lifecycle planning
//!
//! Creation, revision, variant and status operations are computed here as
//! pure functions over the current part collection. Each returns a
//! [`ChangeSet`] describing what must be written; nothing is persisted until
//! a [`PartStore`](crate::core::store::PartStore) applies it.

use chrono::Utc;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use ulid::Ulid;

use crate::core::identity::{
    next_revision, next_sequence, next_variance, parse_part_number, PartIdentifier,
};
use crate::entities::changelog::{Actor, ChangeLogEntry, ChangeType};
use crate::entities::part::{DraftError, Part, PartDraft, PartStatus};

/// Writes produced by a lifecycle operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSet {
    /// Existing parts to overwrite (matched by part number)
    pub updates: Vec<Part>,

    /// New parts; their part numbers must not exist yet
    pub creates: Vec<Part>,

    /// Change log entries to append
    pub log: Vec<ChangeLogEntry>,
}

impl ChangeSet {
    /// The part this operation created, if any
    pub fn created(&self) -> Option<&Part> {
        self.creates.first()
    }

    /// The first part this operation updated, if any
    pub fn updated(&self) -> Option<&Part> {
        self.updates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty() && self.log.is_empty()
    }
}

/// Errors from lifecycle planning
#[derive(Debug, Error, Diagnostic)]
pub enum LifecycleError {
    #[error("part not found: {0}")]
    #[diagnostic(code(plm::lifecycle::not_found), help("run 'plm part list' to see known part numbers"))]
    PartNotFound(String),

    #[error("invalid part number format: {0}")]
    #[diagnostic(code(plm::lifecycle::invalid_part_number))]
    InvalidPartNumber(String),

    #[error("invalid part: {0}")]
    #[diagnostic(code(plm::lifecycle::invalid_draft))]
    Draft(#[from] DraftError),

    #[error("cannot compute the next variance after '{0}'")]
    #[diagnostic(code(plm::lifecycle::variance))]
    VarianceUnavailable(String),
}

fn find<'a>(part_number: &str, existing: &'a [Part]) -> Result<&'a Part, LifecycleError> {
    existing
        .iter()
        .find(|p| p.part_number == part_number)
        .ok_or_else(|| LifecycleError::PartNotFound(part_number.to_string()))
}

fn decode(part: &Part) -> Result<PartIdentifier, LifecycleError> {
    parse_part_number(&part.part_number)
        .ok_or_else(|| LifecycleError::InvalidPartNumber(part.part_number.clone()))
}

/// Copy of `source` under a new identifier: fresh id and timestamps, active
fn derive_part(source: &Part, identifier: &PartIdentifier) -> Part {
    let now = Utc::now();
    Part {
        id: Ulid::new(),
        part_number: identifier.to_string(),
        revision: identifier.revision.to_string(),
        status: PartStatus::Active,
        created_at: now,
        updated_at: now,
        ..source.clone()
    }
}

/// Plan a brand new base part.
///
/// The category and subcategory ids come from the first four characters of
/// the draft's category code; the sequence is one past the largest sequence
/// in use across every category.
pub fn plan_new_part(draft: &PartDraft, existing: &[Part]) -> Result<ChangeSet, LifecycleError> {
    draft.validate()?;

    let (category_id, subcategory_id) = draft.category_ids();
    let sequence = next_sequence(existing.iter().map(|p| p.part_number.as_str()));
    let identifier = PartIdentifier::new(category_id, subcategory_id, sequence);
    let part = Part::from_draft(draft, &identifier);

    tracing::debug!(part_number = %part.part_number, "planned new part");

    Ok(ChangeSet {
        creates: vec![part],
        ..Default::default()
    })
}

/// Plan the next revision of a part.
///
/// The new part keeps every field of the original except its identifier,
/// revision, status and timestamps. The original becomes obsolete.
pub fn plan_revision(part_number: &str, existing: &[Part], actor: &Actor) -> Result<ChangeSet, LifecycleError> {
    let current = find(part_number, existing)?;
    let identifier = decode(current)?;

    let revision = next_revision(identifier.revision);
    let revised = derive_part(current, &identifier.with_revision(revision));

    let mut obsolete = current.clone();
    obsolete.status = PartStatus::Obsolete;
    obsolete.updated_at = revised.created_at;

    let entry = ChangeLogEntry::new(&revised.part_number, ChangeType::Revision, "New revision created", actor)
        .with_values(current.revision.clone(), revision.to_string());

    tracing::debug!(from = %current.part_number, to = %revised.part_number, "planned revision");

    Ok(ChangeSet {
        updates: vec![obsolete],
        creates: vec![revised],
        log: vec![entry],
    })
}

/// Plan a new variant in the part's family.
///
/// The variance is one past the highest variance among all parts sharing
/// the category, subcategory and sequence, so variants created out of order
/// never collide. The original part is left untouched.
pub fn plan_variant(
    part_number: &str,
    variant_name: &str,
    existing: &[Part],
    actor: &Actor,
) -> Result<ChangeSet, LifecycleError> {
    let current = find(part_number, existing)?;
    let identifier = decode(current)?;

    let family_max = existing
        .iter()
        .filter_map(|p| parse_part_number(&p.part_number))
        .filter(|other| other.same_family(&identifier))
        .filter_map(|other| other.variance.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let current_max = format!("{:02}", family_max);
    let variance = next_variance(&current_max).ok_or(LifecycleError::VarianceUnavailable(current_max))?;

    let mut variant = derive_part(current, &identifier.with_variance(variance));
    variant.variant_name = Some(variant_name.to_string());

    let entry = ChangeLogEntry::new(
        &variant.part_number,
        ChangeType::Variant,
        format!("New variant created: {}", variant_name),
        actor,
    );

    tracing::debug!(from = %current.part_number, to = %variant.part_number, "planned variant");

    Ok(ChangeSet {
        creates: vec![variant],
        log: vec![entry],
        ..Default::default()
    })
}

/// Plan a status change, recorded in the change log with old and new values
pub fn plan_status_change(
    part_number: &str,
    status: PartStatus,
    existing: &[Part],
    actor: &Actor,
) -> Result<ChangeSet, LifecycleError> {
    let current = find(part_number, existing)?;

    let mut updated = current.clone();
    updated.status = status;
    updated.updated_at = Utc::now();

    let entry = ChangeLogEntry::new(part_number, ChangeType::Status, "Status change", actor)
        .with_values(current.status.to_string(), status.to_string());

    Ok(ChangeSet {
        updates: vec![updated],
        log: vec![entry],
        ..Default::default()
    })
}

/// Plan a free-form note against an existing part; the part itself is unchanged
pub fn plan_note(part_number: &str, existing: &[Part], actor: &Actor) -> Result<ChangeSet, LifecycleError> {
    find(part_number, existing)?;
    let entry = ChangeLogEntry::new(part_number, ChangeType::Note, "Note added", actor);
    Ok(ChangeSet {
        log: vec![entry],
        ..Default::default()
    })
}
