//! Markdown to HTML conversion.

use pulldown_cmark::{Options, Parser, html};

/// Converts markdown text to HTML.
pub trait MarkdownParser: Send + Sync {
    /// Render `markdown` as an HTML fragment.
    fn parse(&self, markdown: &str) -> String;
}

/// CommonMark renderer backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy)]
pub struct CommonMarkParser {
    gfm: bool,
}

impl Default for CommonMarkParser {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl CommonMarkParser {
    /// Create a parser with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl MarkdownParser for CommonMarkParser {
    fn parse(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
