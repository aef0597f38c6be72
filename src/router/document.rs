use regex::Regex;

use super::rewrite_internal_links;

/// Id of the element whose children the router swaps.
pub const CONTENT_REGION_ID: &str = "content";

/// A dashboard document split around its content region.
///
/// Internal links are rewritten across the whole document before the split,
/// so navigation outside the content region routes through the hash too.
/// Markup without an `id="content"` element is the content region itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardDocument {
    before: String,
    content: String,
    after: String,
}

impl DashboardDocument {
    pub fn parse(markup: &str) -> Self {
        let markup = rewrite_internal_links(markup);
        match content_region(&markup) {
            Some((start, end)) => Self {
                before: markup[..start].to_string(),
                content: markup[start..end].to_string(),
                after: markup[end..].to_string(),
            },
            None => Self {
                before: String::new(),
                content: markup,
                after: String::new(),
            },
        }
    }

    /// Content region markup as shipped, links already rewritten.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True when the markup had surrounding document around the region.
    pub fn has_region(&self) -> bool {
        !self.before.is_empty() || !self.after.is_empty()
    }

    /// The whole document with `content` in place of the region.
    pub fn render(&self, content: &str) -> String {
        let mut out = String::with_capacity(self.before.len() + content.len() + self.after.len());
        out.push_str(&self.before);
        out.push_str(content);
        out.push_str(&self.after);
        out
    }
}

/// Byte range of the children of the `id="content"` element.
fn content_region(markup: &str) -> Option<(usize, usize)> {
    let opening = Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9-]*)\b[^>]*\bid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(CONTENT_REGION_ID)
    ))
    .ok()?;
    let caps = opening.captures(markup)?;
    let whole = caps.get(0)?;
    if whole.as_str().ends_with("/>") {
        return None;
    }
    let tag = caps.get(1)?.as_str();
    let start = whole.end();

    // Same-name tags nest; the region ends at the close tag that balances the opening one.
    let tags = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag))).ok()?;
    let mut depth = 1usize;
    for m in tags.captures_iter(&markup[start..]) {
        let found = m.get(0)?;
        if m.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            depth -= 1;
            if depth == 0 {
                return Some((start, start + found.start()));
            }
        } else if !found.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}
