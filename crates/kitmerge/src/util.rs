use cow_utils::CowUtils;

/// Normalize line endings to LF (\n) for cross-platform consistency
/// This ensures reproducible builds regardless of the platform where bundling occurs
pub fn normalize_line_endings(content: &str) -> String {
    // Replace Windows CRLF (\r\n) and Mac CR (\r) with Unix LF (\n)
    content
        .cow_replace("\r\n", "\n")
        .cow_replace('\r', "\n")
        .into_owned()
}

/// Split text into lines, keeping each line's `\n` terminator.
///
/// A trailing fragment without a terminator becomes the last line as-is.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_owned).collect()
}

/// Read-style line splitting: normalize line endings first, then split.
pub fn text_to_lines(content: &str) -> Vec<String> {
    split_lines(&normalize_line_endings(content))
}

/// Append a `\n` to a line that lacks one.
pub fn terminate_line(line: &str) -> String {
    if line.ends_with('\n') {
        line.to_owned()
    } else {
        format!("{line}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_line_endings("plain\n"), "plain\n");
    }

    #[test]
    fn test_split_lines_keeps_terminators() {
        assert_eq!(split_lines("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a\n", "\n", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_text_to_lines_handles_crlf() {
        assert_eq!(
            text_to_lines("import {a}\r\nconst x = 1;\r\n"),
            vec!["import {a}\n", "const x = 1;\n"]
        );
    }

    #[test]
    fn test_terminate_line() {
        assert_eq!(terminate_line("// title"), "// title\n");
        assert_eq!(terminate_line("// title\n"), "// title\n");
    }
}
