//! Locates where a module's body starts once its leading imports are skipped.
//!
//! This is a line heuristic, not a parser. A line is an import when it starts
//! with the literal `import` token. An import line holding `{` without `}`
//! opens a multi-line import list that runs until the next line containing `}`.

use log::trace;

const IMPORT_TOKEN: &str = "import";

/// How the scanner treats non-import lines that appear between imports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Keep scanning to the last import in the module. Non-import lines that
    /// sit between two imports are stripped along with them. Reproduces
    /// previously generated bundles byte for byte.
    #[default]
    Compatible,
    /// Stop at the first line that is neither blank nor part of an import.
    Strict,
}

/// Result of scanning one module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportScan {
    /// Index of the first body line, `0..=lines.len()`
    pub body_start: usize,
    /// Index of a multi-line import that was never closed, if any
    pub unterminated_import: Option<usize>,
}

/// Compute the body start offset for a module's lines.
pub fn body_start_offset<S: AsRef<str>>(lines: &[S], mode: ScanMode) -> usize {
    scan_imports(lines, mode).body_start
}

/// Scan a module's lines left to right and report where its body begins.
///
/// Never fails: input without recognizable imports yields an offset of 0, and
/// an unterminated multi-line import leaves the offset where it was before
/// that import started.
pub fn scan_imports<S: AsRef<str>>(lines: &[S], mode: ScanMode) -> ImportScan {
    let mut open_import: Option<usize> = None;
    let mut body_start = 0;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();

        if open_import.is_some() && line.contains('}') {
            trace!("line {index}: closes multi-line import");
            open_import = None;
            body_start = index + 1;
        } else if line.starts_with(IMPORT_TOKEN) {
            if line.contains('{') && !line.contains('}') {
                trace!("line {index}: opens multi-line import");
                open_import.get_or_insert(index);
            } else {
                // Also applies inside a list that is still open
                trace!("line {index}: single-line import");
                body_start = index + 1;
            }
        } else if mode == ScanMode::Strict && open_import.is_none() && !line.trim().is_empty() {
            trace!("line {index}: first body line, stopping strict scan");
            break;
        }
    }

    ImportScan {
        body_start,
        unterminated_import: open_import,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(lines: &[&str]) -> usize {
        body_start_offset(lines, ScanMode::Compatible)
    }

    #[test]
    fn test_no_imports_keeps_whole_module() {
        let lines = ["export const a = 1;\n", "export const b = 2;\n"];
        assert_eq!(offset(&lines), 0);
    }

    #[test]
    fn test_empty_module() {
        let lines: [&str; 0] = [];
        assert_eq!(offset(&lines), 0);
    }

    #[test]
    fn test_only_single_line_imports_strips_everything() {
        let lines = [
            "import { a } from './a';\n",
            "import b from './b';\n",
            "import './side-effect';\n",
        ];
        assert_eq!(offset(&lines), lines.len());
    }

    #[test]
    fn test_single_line_braced_import() {
        let lines = ["import {foo}\n", "const x = 1;\n"];
        assert_eq!(offset(&lines), 1);
    }

    #[test]
    fn test_multiline_import_ends_after_closing_brace() {
        let lines = [
            "import {\n",
            "  foo,\n",
            "  bar\n",
            "} from 'm';\n",
            "const y = 2;\n",
        ];
        assert_eq!(offset(&lines), 4);
    }

    #[test]
    fn test_import_like_line_inside_open_list() {
        // `import_b,` is a brace-free import line, the `}` line then closes the list
        let lines = [
            "import { a,\n",
            "import_b,\n",
            "  c } from './x';\n",
            "let z = 0;\n",
        ];
        assert_eq!(offset(&lines), 3);
    }

    #[test]
    fn test_compatible_mode_swallows_interleaved_lines() {
        let lines = [
            "import { a } from './a';\n",
            "const between = true;\n",
            "import { b } from './b';\n",
            "export const c = a + b;\n",
        ];
        assert_eq!(offset(&lines), 3);
    }

    #[test]
    fn test_strict_mode_stops_at_first_body_line() {
        let lines = [
            "import { a } from './a';\n",
            "const between = true;\n",
            "import { b } from './b';\n",
            "export const c = a + b;\n",
        ];
        assert_eq!(body_start_offset(&lines, ScanMode::Strict), 1);
    }

    #[test]
    fn test_strict_mode_skips_blank_lines_between_imports() {
        let lines = [
            "import { a } from './a';\n",
            "\n",
            "import { b } from './b';\n",
            "\n",
            "export const c = a + b;\n",
        ];
        assert_eq!(body_start_offset(&lines, ScanMode::Strict), 3);
        assert_eq!(offset(&lines), 3);
    }

    #[test]
    fn test_unterminated_multiline_import_under_trims() {
        let lines = [
            "import { a } from './a';\n",
            "import {\n",
            "  b,\n",
            "  c\n",
        ];
        let scan = scan_imports(&lines, ScanMode::Compatible);
        assert_eq!(scan.body_start, 1);
        assert_eq!(scan.unterminated_import, Some(1));
    }

    #[test]
    fn test_import_line_inside_open_list_advances_offset() {
        let lines = ["import {\n", "import a from 'a';\n", "const x = 1;\n"];
        let scan = scan_imports(&lines, ScanMode::Compatible);
        assert_eq!(scan.body_start, 2);
        assert_eq!(scan.unterminated_import, Some(0));
    }

    #[test]
    fn test_unterminated_list_followed_by_plain_import() {
        let lines = [
            "import { a } from './a';\n",
            "import {\n",
            "import b from 'b';\n",
            "  c\n",
        ];
        let scan = scan_imports(&lines, ScanMode::Compatible);
        assert_eq!(scan.body_start, 3);
        assert_eq!(scan.unterminated_import, Some(1));
    }

    #[test]
    fn test_strict_mode_does_not_stop_inside_open_list() {
        let lines = ["import {\n", "import a from 'a';\n", "const x = 1;\n"];
        assert_eq!(body_start_offset(&lines, ScanMode::Strict), 2);

        let lines = [
            "import {\n",
            "  foo,\n",
            "} from 'm';\n",
            "const y = 2;\n",
            "import { z } from 'z';\n",
        ];
        assert_eq!(body_start_offset(&lines, ScanMode::Strict), 3);
    }

    #[test]
    fn test_indented_import_is_not_an_import() {
        let lines = ["  import { a } from './a';\n", "const x = 1;\n"];
        assert_eq!(offset(&lines), 0);
    }

    #[test]
    fn test_import_prefix_matches_literal_token_only() {
        // Mirrors a plain prefix check: `importance` counts as an import line
        let lines = ["importance = 1;\n", "const x = 1;\n"];
        assert_eq!(offset(&lines), 1);
    }

    #[test]
    fn test_export_from_is_not_stripped() {
        let lines = [
            "import { a } from './a';\n",
            "export { b } from './b';\n",
        ];
        assert_eq!(offset(&lines), 1);
    }
}
