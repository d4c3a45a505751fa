//! Header-row reconciliation: resolving canonical fields to column positions
//! and deciding whether a sheet is worth processing at all.

use std::collections::HashMap;

use crate::fields::{ArchetypeGroup, Field};

/// Resolved column positions for one sheet's header row.
#[derive(Debug, Default)]
pub struct ColumnIndex {
    positions: HashMap<Field, usize>,
}

impl ColumnIndex {
    /// Zero-based column for `field`, or `None` when no header matched.
    pub fn get(&self, field: Field) -> Option<usize> {
        self.positions.get(&field).copied()
    }
}

/// Resolve each canonical field to its column position in `headers`.
///
/// Header cells are compared lower-cased and trimmed. For every field the
/// synonyms are tried in declaration order and the first one equal to any
/// header wins; fields with no match are simply absent from the index.
pub fn resolve_columns(headers: &[String], mapping: &[(Field, &[&str])]) -> ColumnIndex {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut positions = HashMap::new();
    for (field, synonyms) in mapping {
        for synonym in *synonyms {
            if let Some(idx) = normalized.iter().position(|h| h.as_str() == *synonym) {
                positions.insert(*field, idx);
                break;
            }
        }
    }
    ColumnIndex { positions }
}

/// Decide whether a sheet's header row carries every required column concept.
///
/// Matching is loose on purpose: a header counts as a hit when it *contains*
/// one of the group's spellings, so "Invoice Number" satisfies the "invoice"
/// group. Returns the skip reason for the first group with no hit.
pub fn check_required_columns(
    headers: &[String],
    groups: &[ArchetypeGroup],
) -> Result<(), String> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    for group in groups {
        let hit = normalized
            .iter()
            .any(|h| group.variants.iter().any(|v| h.contains(v)));
        if !hit {
            let preview: Vec<&str> = headers
                .iter()
                .map(|h| h.trim())
                .filter(|h| !h.is_empty())
                .take(5)
                .collect();
            return Err(format!(
                "no '{}' column found (headers: {})",
                group.label,
                preview.join(", ")
            ));
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
