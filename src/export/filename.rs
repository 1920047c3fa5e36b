use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

// Invalid characters for Windows: < > : " / \ | ? *
// Also control characters (0-31)
static INVALID_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("Failed to compile invalid chars regex")
});
static RESERVED_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(CON|PRN|AUX|NUL|COM[1-9]|LPT[1-9])$")
        .expect("Failed to compile reserved names regex")
});

const MAX_STEM_CHARS: usize = 100;

/// Which raster of a page pair a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    Left,
    Right,
    DiffMap,
}

impl PageSide {
    fn suffix(self) -> &'static str {
        match self {
            PageSide::Left => "a",
            PageSide::Right => "b",
            PageSide::DiffMap => "diff",
        }
    }
}

/// `page-001-a.png` style name; pages are numbered from 1
pub fn page_file_name(page_index: usize, side: PageSide) -> String {
    format!("page-{:03}-{}.png", page_index + 1, side.suffix())
}

/// Output directory name for comparing `a` against `b`
pub fn comparison_dir_name(a: &Path, b: &Path) -> String {
    let stem = |p: &Path| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    };
    sanitize_filename(&format!("{}_vs_{}", stem(a), stem(b)))
}

/// Sanitize a filename for cross-platform compatibility
/// Removes/replaces characters that are invalid on Windows, macOS, or Linux
pub fn sanitize_filename(name: &str) -> String {
    let sanitized = INVALID_CHARS.replace_all(name, "_");

    // Trim leading/trailing spaces and dots (problematic on Windows)
    let sanitized = sanitized.trim_matches(|c| c == ' ' || c == '.');

    if RESERVED_NAMES.is_match(sanitized) {
        return format!("_{sanitized}");
    }

    let sanitized: String = sanitized.chars().take(MAX_STEM_CHARS).collect();

    if sanitized.is_empty() {
        "untitled".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_file_names() {
        assert_eq!(page_file_name(0, PageSide::Left), "page-001-a.png");
        assert_eq!(page_file_name(9, PageSide::Right), "page-010-b.png");
        assert_eq!(page_file_name(1234, PageSide::DiffMap), "page-1235-diff.png");
    }

    #[test]
    fn test_comparison_dir_name() {
        assert_eq!(
            comparison_dir_name(Path::new("/tmp/v1.pdf"), Path::new("drafts/v2.pdf")),
            "v1_vs_v2"
        );
        assert_eq!(
            comparison_dir_name(Path::new("a:b.pdf"), Path::new("c?.pdf")),
            "a_b_vs_c_"
        );
    }

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_filename("Normal Report"), "Normal Report");
        assert_eq!(sanitize_filename("Report: Q1"), "Report_ Q1");
        assert_eq!(sanitize_filename("a/b\\c|d"), "a_b_c_d");
        assert_eq!(sanitize_filename("x\x00y"), "x_y");
    }

    #[test]
    fn test_sanitize_reserved() {
        assert_eq!(sanitize_filename("CON"), "_CON");
        assert_eq!(sanitize_filename("lpt9"), "_lpt9");
    }

    #[test]
    fn test_sanitize_empty_and_trim() {
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename(" . "), "untitled");
        assert_eq!(sanitize_filename("..name.."), "name");
    }

    #[test]
    fn test_sanitize_long_unicode_name() {
        let long_name = "日".repeat(250);
        assert_eq!(sanitize_filename(&long_name).chars().count(), MAX_STEM_CHARS);
    }
}
