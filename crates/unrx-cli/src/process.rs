//! File processing logic for unrx

use anyhow::{Context, Result};
use std::path::Path;

use unrx_transform::{rewrite, RewriteOptions, TransformError};

use crate::output::EditInfo;

/// Result of processing a single file
pub struct ProcessResult {
    /// Edits that were found/applied
    pub edits: Vec<EditInfo>,
    /// Original source code
    pub old_source: String,
    /// New source code after edits (only if edits were found)
    pub new_source: Option<String>,
}

/// Process a single source file and return the rewrites found
pub fn process_file(path: &Path, options: &RewriteOptions) -> Result<Option<ProcessResult>> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let outcome = match rewrite(&path.to_string_lossy(), &source_code, options) {
        Ok(outcome) => outcome,
        // Signal parse error by returning None
        Err(TransformError::Parse { .. }) => return Ok(None),
        Err(error) => {
            return Err(error).with_context(|| format!("Failed to transform {}", path.display()))
        }
    };

    if outcome.edits.is_empty() {
        return Ok(Some(ProcessResult {
            edits: vec![],
            old_source: source_code,
            new_source: None,
        }));
    }

    // Convert Edit to EditInfo with line/column info
    let edits: Vec<EditInfo> = outcome
        .edits
        .iter()
        .map(|edit| {
            let (line, column) = offset_to_line_column(&source_code, edit.start);
            EditInfo {
                line,
                column,
                message: edit.message.clone(),
            }
        })
        .collect();

    Ok(Some(ProcessResult {
        edits,
        old_source: source_code,
        new_source: Some(outcome.text),
    }))
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Convert byte offset to line and column numbers (1-based)
fn offset_to_line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_column() {
        let source = "line1\nline2\nline3";
        assert_eq!(offset_to_line_column(source, 0), (1, 1));
        assert_eq!(offset_to_line_column(source, 5), (1, 6)); // newline
        assert_eq!(offset_to_line_column(source, 6), (2, 1)); // start of line2
        assert_eq!(offset_to_line_column(source, 12), (3, 1)); // start of line3
    }

    #[test]
    fn test_process_file_with_rewrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("service.ts");
        std::fs::write(&path, "data().subscribe(v => { use(v); });\n").unwrap();

        let result = process_file(&path, &RewriteOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(result.edits.len(), 1);
        assert_eq!(result.edits[0].line, 1);
        assert_eq!(result.edits[0].column, 1);
        assert_eq!(
            result.new_source.as_deref(),
            Some("const v = await firstValueFrom(data());use(v);\n")
        );
    }

    #[test]
    fn test_process_file_without_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("helper.ts");
        std::fs::write(&path, "export const n = 1;\n").unwrap();

        let result = process_file(&path, &RewriteOptions::default())
            .unwrap()
            .unwrap();
        assert!(result.edits.is_empty());
        assert!(result.new_source.is_none());
    }

    #[test]
    fn test_process_file_parse_error_returns_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.ts");
        std::fs::write(&path, "const = ;\n").unwrap();

        let result = process_file(&path, &RewriteOptions::default()).unwrap();
        assert!(result.is_none());
    }
}
