pub mod report;

use serde::Serialize;

use crate::grid::GridConfig;
use crate::mount::StaticDocument;
use crate::pages::PageSpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

/// A mount element and the grid currently rendered into it, if any.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountRecord<'a> {
    pub mount_id: &'a str,
    pub config: Option<&'a GridConfig>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PageRecord<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub grids: Vec<MountRecord<'a>>,
}

/// Mount records in page order. Mounts the page declares but the document
/// lacks are skipped.
pub fn build_page_record<'a>(page: &'a PageSpec, document: &'a StaticDocument) -> PageRecord<'a> {
    let present = document.mount_ids().collect::<Vec<_>>();
    let grids = page
        .mount_ids()
        .filter(|id| present.contains(id))
        .map(|mount_id| MountRecord {
            mount_id,
            config: document.grids(mount_id).last().map(|g| &g.config),
        })
        .collect();
    PageRecord {
        id: &page.id,
        title: &page.title,
        grids,
    }
}

pub fn render_json(page: &PageSpec, document: &StaticDocument) -> Vec<u8> {
    let record = build_page_record(page, document);
    serde_json::to_vec_pretty(&record).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(page: &PageSpec, document: &StaticDocument) -> Vec<u8> {
    report::render_page_html(page, document)
}

pub fn render(format: OutputFormat, page: &PageSpec, document: &StaticDocument) -> Vec<u8> {
    match format {
        OutputFormat::Json => render_json(page, document),
        OutputFormat::Html => render_html(page, document),
    }
}

/// Output file name for `page` in `format`.
pub fn page_file_name(page: &PageSpec, format: OutputFormat) -> String {
    format!(
        "{}.{}",
        crate::utils::page_file_stem(&page.id),
        format.extension()
    )
}
