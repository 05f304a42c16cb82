//! Inline content: formatted text runs and links
//!
//! A text run is a span of text with a consistent set of formats applied.
//! It is the leaf unit of every paragraph, heading, quote and list item.

/// Set of formats applied to a text run
///
/// Formats are a set, not a stack: the order in which they were switched on
/// has no influence on how the run is written back out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextFormat {
    /// Bold formatting
    pub bold: bool,

    /// Italic formatting
    pub italic: bool,

    /// Inline code formatting
    pub code: bool,

    /// Strikethrough formatting
    pub strikethrough: bool,
}

impl TextFormat {
    /// The empty format set
    pub const PLAIN: TextFormat = TextFormat {
        bold: false,
        italic: false,
        code: false,
        strikethrough: false,
    };

    /// Create a new empty format set
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this set with bold added
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Return this set with italic added
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Return this set with inline code added
    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    /// Return this set with strikethrough added
    pub fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    /// Check if any format is set
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.code || self.strikethrough
    }
}

/// A span of text with consistent formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Formats applied to the whole run
    pub format: TextFormat,
}

impl TextRun {
    /// Create a new plain text run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::PLAIN,
        }
    }

    /// Create a new text run with the specified formatting
    pub fn with_format(text: impl Into<String>, format: TextFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}

/// A hyperlink wrapping other inline content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link target
    pub url: String,

    /// Link text, usually a single styled run
    pub children: Vec<Inline>,
}

impl Link {
    pub fn new(url: impl Into<String>, children: Vec<Inline>) -> Self {
        Self {
            url: url.into(),
            children,
        }
    }
}

/// Inline node inside a paragraph, heading, quote or list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Formatted text
    Text(TextRun),

    /// Hyperlink
    Link(Link),

    /// Opaque content inserted by the editing surface (tabs, line breaks,
    /// mentions). Written out as-is; the parser never produces it.
    Raw(String),
}

impl Inline {
    /// Shorthand for a plain text node
    pub fn plain(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::new(text))
    }

    /// Shorthand for a formatted text node
    pub fn styled(text: impl Into<String>, format: TextFormat) -> Self {
        Inline::Text(TextRun::with_format(text, format))
    }

    /// Unformatted text content of this node
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(run) => run.text.clone(),
            Inline::Link(link) => inline_plain_text(&link.children),
            Inline::Raw(text) => text.clone(),
        }
    }
}

/// Concatenate the unformatted text of a sequence of inline nodes
pub fn inline_plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_builder_is_order_independent() {
        let a = TextFormat::new().bold().strikethrough();
        let b = TextFormat::new().strikethrough().bold();
        assert_eq!(a, b);
        assert!(a.has_formatting());
        assert!(!TextFormat::PLAIN.has_formatting());
    }

    #[test]
    fn test_link_plain_text() {
        let link = Inline::Link(Link::new(
            "https://example.com",
            vec![
                Inline::plain("see "),
                Inline::styled("docs", TextFormat::new().bold()),
            ],
        ));
        assert_eq!(link.plain_text(), "see docs");
    }
}
