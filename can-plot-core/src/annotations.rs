//! Annotation markers
//!
//! Annotations are stored once per container as a table of
//! `(index, position, label)` rows. Requests use the 1-based indices the
//! logger prints; index `k` is row `k - 1`.
//!
//! Unlike channel tokens, explicit indices are not skipped when they miss:
//! an index outside the table fails the whole request.

use crate::container::LogContainer;
use crate::types::{AnnotationEvent, AnnotationRow, PlotError, Result};

/// Which annotations to overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnnotationRequest {
    /// No annotations
    #[default]
    None,
    /// Every row of the table
    All,
    /// Specific 1-based indices, in this order
    Indices(Vec<usize>),
}

impl AnnotationRequest {
    /// Map a command line flag: absent, given without values, or with indices
    pub fn from_flag(indices: Option<Vec<usize>>) -> Self {
        match indices {
            None => AnnotationRequest::None,
            Some(indices) if indices.is_empty() => AnnotationRequest::All,
            Some(indices) => AnnotationRequest::Indices(indices),
        }
    }
}

/// Resolve a request against the container's annotation table
pub fn resolve_annotations<C>(
    container: &C,
    request: &AnnotationRequest,
) -> Result<Vec<AnnotationEvent>>
where
    C: LogContainer + ?Sized,
{
    let indices = match request {
        AnnotationRequest::None => return Ok(Vec::new()),
        AnnotationRequest::All => None,
        AnnotationRequest::Indices(indices) => Some(indices),
    };

    let rows = container.annotation_rows()?;
    let events = match indices {
        None => rows
            .iter()
            .map(|entry| decode_row(entry.index as usize, entry))
            .collect::<Result<Vec<_>>>()?,
        Some(indices) => indices
            .iter()
            .map(|&index| select_row(&rows, index).and_then(|entry| decode_row(index, entry)))
            .collect::<Result<Vec<_>>>()?,
    };

    log::debug!("Resolved {} annotations", events.len());
    Ok(events)
}

fn select_row(rows: &[AnnotationRow], index: usize) -> Result<&AnnotationRow> {
    index
        .checked_sub(1)
        .and_then(|row| rows.get(row))
        .ok_or(PlotError::AnnotationIndexOutOfRange {
            index,
            available: rows.len(),
        })
}

fn decode_row(index: usize, row: &AnnotationRow) -> Result<AnnotationEvent> {
    let label = String::from_utf8(row.label.clone())
        .map_err(|source| PlotError::InvalidAnnotationLabel { index, source })?;

    Ok(AnnotationEvent {
        position: row.position,
        label,
    })
}
