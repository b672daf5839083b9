//! Span-based source code editing with format preservation

use thiserror::Error;

/// Errors that can occur during edit application
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Invalid edit range {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    #[error("Overlapping edits detected at offset {0}")]
    OverlappingEdits(usize),

    #[error("Edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

/// Represents a single code edit operation
#[derive(Debug, Clone)]
pub struct Edit {
    /// Byte offset into the original text where the edit starts
    pub start: usize,
    /// Byte offset into the original text where the edit ends (exclusive)
    pub end: usize,
    /// The replacement text
    pub replacement: String,
    /// Human-readable description of the edit
    pub message: String,
}

impl Edit {
    /// Create a new edit
    pub fn new(
        start: usize,
        end: usize,
        replacement: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
            message: message.into(),
        }
    }
}

/// Apply edits to source code, preserving surrounding formatting
///
/// Edits are applied in reverse order (from end to start) so that offsets of
/// edits not yet applied remain valid against the running result.
///
/// # Arguments
/// * `source` - The original source code
/// * `edits` - Slice of edits to apply
///
/// # Returns
/// * `Ok(String)` - The modified source code
/// * `Err(EditError)` - If any edit is inverted, out of bounds, or overlaps
///   another edit
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    // Sort edits by start position (descending, ties broken by descending
    // end) for safe right-to-left replacement
    let mut sorted_edits: Vec<&Edit> = edits.iter().collect();
    sorted_edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    // Validate: ranges, bounds, and overlap against the previous edit's start
    let source_len = source.len();
    let mut prev_start: Option<usize> = None;

    for edit in &sorted_edits {
        if edit.start > edit.end {
            return Err(EditError::InvalidRange {
                start: edit.start,
                end: edit.end,
            });
        }

        if edit.end > source_len {
            return Err(EditError::SpanOutOfBounds {
                start: edit.start,
                end: edit.end,
                len: source_len,
            });
        }

        if let Some(prev) = prev_start {
            if edit.end > prev {
                return Err(EditError::OverlappingEdits(edit.start));
            }
        }

        prev_start = Some(edit.start);
    }

    // Apply edits from end to start
    let mut result = source.to_string();

    for edit in sorted_edits {
        result.replace_range(edit.start..edit.end, &edit.replacement);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_replacement() {
        let source = "source.subscribe();";
        let edit = Edit::new(0, 19, "await firstValueFrom(source);", "rewrite");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "await firstValueFrom(source);");
    }

    #[test]
    fn test_multiple_edits() {
        let source = "a.subscribe(); b.subscribe();";
        let edits = vec![
            Edit::new(0, 14, "await firstValueFrom(a);", "first"),
            Edit::new(15, 29, "await firstValueFrom(b);", "second"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "await firstValueFrom(a); await firstValueFrom(b);");
    }

    #[test]
    fn test_unsorted_input_edits() {
        let source = "one two three";
        let edits = vec![
            Edit::new(8, 13, "3", "last"),
            Edit::new(0, 3, "1", "first"),
            Edit::new(4, 7, "2", "middle"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "1 2 3");
    }

    #[test]
    fn test_empty_edits() {
        let source = "unchanged";
        let result = apply_edits(source, &[]).unwrap();
        assert_eq!(result, "unchanged");
    }

    #[test]
    fn test_zero_width_insertion() {
        let source = "ab";
        let edit = Edit::new(1, 1, "-", "insert");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "a-b");
    }

    #[test]
    fn test_invalid_range() {
        let source = "text";
        let edit = Edit::new(3, 1, "x", "inverted");

        let result = apply_edits(source, &[edit]);
        assert!(matches!(result, Err(EditError::InvalidRange { .. })));
    }

    #[test]
    fn test_out_of_bounds() {
        let source = "short";
        let edit = Edit::new(0, 100, "replacement", "oob");

        let result = apply_edits(source, &[edit]);
        assert!(matches!(result, Err(EditError::SpanOutOfBounds { .. })));
    }

    #[test]
    fn test_overlapping_edits() {
        let source = "abcdefgh";
        let edits = vec![
            Edit::new(0, 5, "x", "outer"),
            Edit::new(3, 7, "y", "inner"),
        ];

        let result = apply_edits(source, &edits);
        assert!(matches!(result, Err(EditError::OverlappingEdits(_))));
    }

    #[test]
    fn test_contained_edit_rejected() {
        let source = "abcdefgh";
        let edits = vec![
            Edit::new(0, 8, "x", "outer"),
            Edit::new(2, 4, "y", "contained"),
        ];

        let result = apply_edits(source, &edits);
        assert!(matches!(result, Err(EditError::OverlappingEdits(_))));
    }

    #[test]
    fn test_adjacent_edits_do_not_overlap() {
        let source = "abcd";
        let edits = vec![
            Edit::new(0, 2, "x", "left"),
            Edit::new(2, 4, "y", "right"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "xy");
    }
}
