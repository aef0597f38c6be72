use std::sync::OnceLock;

use regex::{Captures, Regex};

fn root_relative_href() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Quote styles are separate alternatives; the regex crate has no backreferences.
        Regex::new(r#"(?i)(<a\b[^>]*?\bhref\s*=\s*)(?:"/([^"]*)"|'/([^']*)')"#)
            .expect("static href pattern compiles")
    })
}

/// Turns root-relative anchor targets (`href="/NHL/team/TOR"`) into hash
/// fragments (`href="#/NHL/team/TOR"`) so in-app navigation stays on the
/// page. Protocol-relative (`//host/...`), absolute and fragment links are
/// left alone; applying it twice changes nothing.
pub fn rewrite_internal_links(html: &str) -> String {
    root_relative_href()
        .replace_all(html, |caps: &Captures| {
            let prefix = &caps[1];
            let (quote, rest) = match (caps.get(2), caps.get(3)) {
                (Some(rest), _) => ('"', rest.as_str()),
                (None, Some(rest)) => ('\'', rest.as_str()),
                (None, None) => return caps[0].to_string(),
            };
            if rest.starts_with('/') {
                return caps[0].to_string();
            }
            format!("{prefix}{quote}#/{rest}{quote}")
        })
        .into_owned()
}
