//! Splitting submitted option text into lines.

use xprofile_core::LineMode;

/// Splits `text` into option lines according to `mode`.
///
/// The whole text is trimmed first, so leading and trailing blank lines
/// never produce options and whitespace-only input yields nothing.
///
/// - [`LineMode::Trim`] trims every line and drops the ones left empty.
/// - [`LineMode::Verbatim`] keeps every line, blank ones included, and only
///   strips a trailing `\r`.
///
/// # Examples
///
/// ```
/// use xprofile_admin::lines::split_lines;
/// use xprofile_core::LineMode;
///
/// assert_eq!(split_lines(" Red \r\n\r\nBlue\n", LineMode::Trim), vec!["Red", "Blue"]);
/// assert_eq!(split_lines("Red\n\nBlue", LineMode::Verbatim), vec!["Red", "", "Blue"]);
/// assert!(split_lines("  \n\t", LineMode::Trim).is_empty());
/// ```
pub fn split_lines(text: &str, mode: LineMode) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let lines = text.split('\n');
    match mode {
        LineMode::Verbatim => lines
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect(),
        LineMode::Trim => lines
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    }
}
