// Line-level matching and annotation of Markdown image embeds.
// A line qualifies only when its whole trimmed content is `![alt](url)`.

use std::borrow::Cow;

use regex_automata::meta::Regex;
use tracing::debug;

use crate::error::Result;

/// Attribute suffix marking an image for deferred loading
pub const LAZY_MARKER: &str = r#"{:loading="lazy"}"#;

/// Whole-line image embed: `!`, bracketed alt text, parenthesized target.
/// Applied to whitespace-trimmed content, so the anchors span the full line.
/// Segments exclude `\r` so a lone carriage return still ends a line.
const IMAGE_EMBED_PATTERN: &str = r"^!\[[^\r\n]*\]\([^\r\n]*\)$";

/// Matcher and rewriter for standalone image-embed lines
#[derive(Debug, Clone)]
pub struct LineAnnotator {
    regex: Regex,
}

/// Result of annotating an in-memory document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedText {
    pub text: String,
    pub lines: u64,
    pub lines_annotated: u64,
}

impl LineAnnotator {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(IMAGE_EMBED_PATTERN)?;
        debug!("Compiled image-embed matcher with pattern: {}", IMAGE_EMBED_PATTERN);
        Ok(Self { regex })
    }

    /// True when the trimmed line is exactly one image embed
    pub fn is_image_embed(&self, line: &str) -> bool {
        self.regex.is_match(line.trim())
    }

    /// True when the line already ends with the lazy marker, ignoring trailing whitespace
    pub fn has_lazy_marker(line: &str) -> bool {
        line.trim_end().ends_with(LAZY_MARKER)
    }

    /// Append the lazy marker to a bare image-embed line.
    ///
    /// A rewritten line is the trimmed content, the marker, then a single `\n`.
    /// Every other line comes back borrowed and byte-identical, line ending included.
    pub fn annotate_line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.is_image_embed(line) && !Self::has_lazy_marker(line) {
            let mut annotated = String::with_capacity(line.len() + LAZY_MARKER.len() + 1);
            annotated.push_str(line.trim());
            annotated.push_str(LAZY_MARKER);
            annotated.push('\n');
            Cow::Owned(annotated)
        } else {
            Cow::Borrowed(line)
        }
    }

    /// Annotate every newline-inclusive line of `text`
    pub fn annotate_text(&self, text: &str) -> AnnotatedText {
        self.annotate_lines(text.split_inclusive('\n'))
    }

    /// Annotate a sequence of newline-inclusive lines, concatenated in order
    pub fn annotate_lines<'a, I>(&self, lines: I) -> AnnotatedText
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = String::new();
        let mut count = 0u64;
        let mut lines_annotated = 0u64;

        for line in lines {
            count += 1;
            let annotated = self.annotate_line(line);
            if let Cow::Owned(_) = annotated {
                lines_annotated += 1;
            }
            out.push_str(&annotated);
        }

        AnnotatedText {
            text: out,
            lines: count,
            lines_annotated,
        }
    }
}
