use super::{HomeSnapshot, TeamStatus, ViewState};
use crate::pages::DEFAULT_MOUNT_ID;
use crate::utils::escape_html;

fn mount_point() -> String {
    format!(r#"<div id="{DEFAULT_MOUNT_ID}" class="ag-theme-balham" style="height: 600px; width: 100%;"></div>"#)
}

/// Markup for the content region in `state`. The home view is the captured
/// snapshot, byte for byte.
pub fn render_view(state: &ViewState, home: &HomeSnapshot) -> String {
    match state {
        ViewState::Home => home.as_str().to_string(),
        ViewState::TeamDetail { code, status } => {
            let code = escape_html(&code.to_ascii_uppercase());
            let heading = format!("<h2>{code} Team Details</h2>");
            match status {
                TeamStatus::NotImplemented => format!(
                    "{heading}\n<p class=\"placeholder\">The {code} team page is not implemented yet.</p>"
                ),
                TeamStatus::AwaitingLibrary | TeamStatus::Loading => format!(
                    "{heading}\n<p class=\"status\">Loading…</p>\n{}",
                    mount_point()
                ),
                TeamStatus::Loaded => format!("{heading}\n{}", mount_point()),
                TeamStatus::LoadFailed => format!(
                    "{heading}\n<p class=\"status error\">The grid could not be loaded.</p>\n{}",
                    mount_point()
                ),
            }
        }
        ViewState::Reports => {
            "<h2>Reports</h2>\n<p class=\"placeholder\">Reports are coming soon.</p>".to_string()
        }
        ViewState::Finders => {
            "<h2>Finders</h2>\n<p class=\"placeholder\">Finders are coming soon.</p>".to_string()
        }
        ViewState::NotFound { path } => format!(
            "<h2>Page not found</h2>\n<p class=\"placeholder\">Nothing lives at {}.</p>\n<p><a href=\"#/\">Back to the dashboard</a></p>",
            escape_html(path)
        ),
    }
}
