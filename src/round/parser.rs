//! Sources file parser.
//!
//! A sources file lists one entry per line:
//!
//! ```text
//! # Waltz
//! https://www.youtube.com/watch?v=dQw4w9WgXcQ
//! # Tango
//! https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC
//!
//! Break: 30
//!
//! # Jive
//! https://youtu.be/dQw4w9WgXcQ
//! ```
//!
//! Each line is trimmed and then classified, first match wins:
//! 1. starts with a track reference: a song (more than one reference on the
//!    line is reported instead)
//! 2. `Break:` followed by optional whitespace and digits: an explicit break
//! 3. empty or starting with `#`: ignored
//! 4. anything else: reported as invalid
//!
//! Reported lines become [`ParseWarning`]s; parsing always continues.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::link::{find_links, match_link_at_start};
use super::sequence::RoundList;
use crate::error::{Error, Result};

const BREAK_PREFIX: &str = "Break:";

/// What a single line of a sources file means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A track reference, holding the matched link text
    Track(&'a str),
    /// An explicit break of this many seconds
    Break(u32),
    /// Blank line or comment
    Ignored,
    /// Line that produces no item and a warning
    Rejected(ParseWarningKind),
}

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarningKind {
    /// Not a link, break, comment or blank line
    InvalidLine,
    /// The line starts with a link but holds more than one
    AmbiguousLinks { count: usize },
    /// A break whose duration does not fit in 32 bits
    BreakOutOfRange,
}

/// A rejected line of a sources file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    /// 1-based line number
    pub line_number: usize,
    /// The trimmed line text
    pub line: String,
    #[serde(flatten)]
    pub kind: ParseWarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseWarningKind::InvalidLine => {
                write!(f, "line {}: invalid link: {}", self.line_number, self.line)
            }
            ParseWarningKind::AmbiguousLinks { count } => write!(
                f,
                "line {}: {} links on one line, skipped: {}",
                self.line_number, count, self.line
            ),
            ParseWarningKind::BreakOutOfRange => write!(
                f,
                "line {}: break duration out of range: {}",
                self.line_number, self.line
            ),
        }
    }
}

/// Result of parsing a sources file.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub rounds: RoundList,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedSource {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Classify one line. The line is trimmed first.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();

    if let Some(link) = match_link_at_start(line) {
        let count = find_links(line).len();
        return if count > 1 {
            LineKind::Rejected(ParseWarningKind::AmbiguousLinks { count })
        } else {
            LineKind::Track(link.text)
        };
    }

    if let Some(digits) = break_digits(line) {
        return match digits.parse::<u32>() {
            Ok(duration) => LineKind::Break(duration),
            Err(_) => LineKind::Rejected(ParseWarningKind::BreakOutOfRange),
        };
    }

    if line.is_empty() || line.starts_with('#') {
        return LineKind::Ignored;
    }

    LineKind::Rejected(ParseWarningKind::InvalidLine)
}

/// ASCII digits of a `Break:` directive. Text after the digits is ignored.
fn break_digits(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(BREAK_PREFIX)?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Parse sources text, appending items to `rounds`.
pub fn parse_source(text: &str, mut rounds: RoundList) -> ParsedSource {
    let mut warnings = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        match classify_line(raw) {
            LineKind::Track(link) => {
                rounds.append_song(link);
            }
            LineKind::Break(duration) => {
                rounds.append_break(duration);
            }
            LineKind::Ignored => {}
            LineKind::Rejected(kind) => {
                let warning = ParseWarning {
                    line_number: i + 1,
                    line: raw.trim().to_string(),
                    kind,
                };
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    tracing::info!(
        "Parsed {} items ({} songs), {} warnings",
        rounds.len(),
        rounds.items().iter().filter(|i| i.as_song().is_some()).count(),
        warnings.len()
    );

    ParsedSource { rounds, warnings }
}

/// Read and parse a sources file.
///
/// An unreadable file is fatal and yields [`Error::SourceUnreadable`].
pub fn parse_source_file(path: &Path, rounds: RoundList) -> Result<ParsedSource> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Read sources file {:?} ({} bytes)", path, text.len());
    Ok(parse_source(&text, rounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::{ArtifactDir, RoundItem};
    use crate::test_utils::{LINK_A, LINK_B, LINK_C};

    fn parse(text: &str) -> ParsedSource {
        parse_source(text, RoundList::new(ArtifactDir::default(), 10))
    }

    fn order_names(parsed: &ParsedSource) -> Vec<String> {
        parsed
            .rounds
            .rendering_order()
            .iter()
            .map(RoundItem::concat_name)
            .collect()
    }

    #[test]
    fn test_classify_track() {
        assert_eq!(classify_line(LINK_A), LineKind::Track(LINK_A));
        assert_eq!(
            classify_line(&format!("   {LINK_A}   ")),
            LineKind::Track(LINK_A)
        );
    }

    #[test]
    fn test_classify_track_keeps_matched_text_only() {
        let line = "https://open.spotify.com/track/abc123?si=xyz";
        assert_eq!(
            classify_line(line),
            LineKind::Track("https://open.spotify.com/track/abc123")
        );
    }

    #[test]
    fn test_classify_break() {
        assert_eq!(classify_line("Break: 20"), LineKind::Break(20));
        assert_eq!(classify_line("Break:20"), LineKind::Break(20));
        assert_eq!(classify_line("  Break:   45  "), LineKind::Break(45));
        assert_eq!(classify_line("Break: 0"), LineKind::Break(0));
        assert_eq!(classify_line("Break: 15 seconds"), LineKind::Break(15));
    }

    #[test]
    fn test_classify_break_requires_ascii_digits() {
        assert_eq!(
            classify_line("Break: \u{0663}0"),
            LineKind::Rejected(ParseWarningKind::InvalidLine)
        );
        assert_eq!(
            classify_line("Break: \u{FF12}\u{FF10}"),
            LineKind::Rejected(ParseWarningKind::InvalidLine)
        );
    }

    #[test]
    fn test_classify_bad_breaks() {
        assert_eq!(
            classify_line("Break: soon"),
            LineKind::Rejected(ParseWarningKind::InvalidLine)
        );
        assert_eq!(
            classify_line("break: 10"),
            LineKind::Rejected(ParseWarningKind::InvalidLine)
        );
        assert_eq!(
            classify_line("Break: 99999999999"),
            LineKind::Rejected(ParseWarningKind::BreakOutOfRange)
        );
    }

    #[test]
    fn test_classify_ignored() {
        assert_eq!(classify_line(""), LineKind::Ignored);
        assert_eq!(classify_line("   \t"), LineKind::Ignored);
        assert_eq!(classify_line("# Waltz"), LineKind::Ignored);
        assert_eq!(
            classify_line(&format!("# old: {LINK_A} {LINK_B}")),
            LineKind::Ignored
        );
    }

    #[test]
    fn test_classify_two_links_is_ambiguous() {
        assert_eq!(
            classify_line(&format!("{LINK_A} {LINK_B}")),
            LineKind::Rejected(ParseWarningKind::AmbiguousLinks { count: 2 })
        );
    }

    #[test]
    fn test_classify_invalid() {
        assert_eq!(
            classify_line("https://vimeo.com/123"),
            LineKind::Rejected(ParseWarningKind::InvalidLine)
        );
        assert_eq!(
            classify_line(&format!("Tango {LINK_A}")),
            LineKind::Rejected(ParseWarningKind::InvalidLine)
        );
    }

    #[test]
    fn test_blank_line_is_not_a_break() {
        let parsed = parse(&format!("{LINK_A}\n\n{LINK_B}"));
        assert_eq!(parsed.rounds.len(), 2);
        assert_eq!(
            order_names(&parsed),
            ["0.trimmed.mp3", "break_10.mp3", "1.trimmed.mp3"]
        );
        assert!(!parsed.has_warnings());
    }

    #[test]
    fn test_explicit_break_scenario() {
        let parsed = parse(&format!("{LINK_A}\nBreak: 20\n{LINK_B}"));
        assert_eq!(
            order_names(&parsed),
            ["0.trimmed.mp3", "break_20.mp3", "2.trimmed.mp3"]
        );
    }

    #[test]
    fn test_no_breaks_scenario() {
        let parsed = parse(&format!("{LINK_A}\n{LINK_B}\n{LINK_C}"));
        assert_eq!(
            order_names(&parsed),
            [
                "0.trimmed.mp3",
                "break_10.mp3",
                "1.trimmed.mp3",
                "break_10.mp3",
                "2.trimmed.mp3"
            ]
        );
    }

    #[test]
    fn test_two_links_on_one_line_appends_nothing() {
        let parsed = parse(&format!("{LINK_A} {LINK_B}"));
        assert!(parsed.rounds.is_empty());
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(
            parsed.warnings[0].kind,
            ParseWarningKind::AmbiguousLinks { count: 2 }
        );
        assert_eq!(parsed.warnings[0].line_number, 1);
    }

    #[test]
    fn test_invalid_lines_reported_and_skipped() {
        let parsed = parse(&format!("{LINK_A}\nnot a link\n{LINK_B}"));
        assert_eq!(parsed.rounds.len(), 2);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line_number, 2);
        assert_eq!(parsed.warnings[0].line, "not a link");
        assert!(parsed.warnings[0].to_string().contains("line 2"));
    }

    #[test]
    fn test_comments_do_not_change_sequence() {
        let bare = parse(&format!("{LINK_A}\nBreak: 5\n{LINK_B}"));
        let commented = parse(&format!(
            "# Waltz\n{LINK_A}\n\n# pause\nBreak: 5\n\n# Tango\n{LINK_B}\n"
        ));
        assert_eq!(bare.rounds.items(), commented.rounds.items());
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = parse(&format!("{LINK_A}\r\nBreak: 5\r\n{LINK_B}\r\n"));
        assert_eq!(parsed.rounds.len(), 3);
        assert!(!parsed.has_warnings());
    }

    #[test]
    fn test_parse_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.txt");
        std::fs::write(&path, format!("{LINK_A}\n{LINK_B}\n")).unwrap();

        let parsed = parse_source_file(&path, RoundList::default()).unwrap();
        assert_eq!(parsed.rounds.songs().len(), 2);
    }

    #[test]
    fn test_parse_missing_file_is_fatal() {
        let result = parse_source_file(Path::new("/nonexistent/sources.txt"), RoundList::default());
        assert!(matches!(result, Err(Error::SourceUnreadable { .. })));
    }

    #[test]
    fn test_warning_serializes_flat() {
        let warning = ParseWarning {
            line_number: 3,
            line: "a b".to_string(),
            kind: ParseWarningKind::AmbiguousLinks { count: 2 },
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains(r#""kind":"ambiguous_links""#));
        assert!(json.contains(r#""count":2"#));
    }
}
