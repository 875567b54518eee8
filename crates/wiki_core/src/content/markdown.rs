//! Markdown to HTML rendering for page content.
//!
//! Output is not sanitized; callers that display untrusted content must
//! clean it themselves.

use pulldown_cmark::{html, Options, Parser};

/// Extensions enabled on top of CommonMark.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders markdown `source` to HTML.
///
/// Never fails: text without markdown constructs becomes one paragraph.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, markdown_options());
    let mut html_output = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut html_output, parser);
    html_output
}
