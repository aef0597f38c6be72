use super::build_page_record;
use crate::grid::{format_cell, DomLayout, GridConfig};
use crate::mount::StaticDocument;
use crate::pages::PageSpec;
use crate::utils::escape_html;

pub const AG_GRID_SCRIPT: &str =
    "https://cdn.jsdelivr.net/npm/ag-grid-enterprise@32.3.3/dist/ag-grid-enterprise.min.js";

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn mount_style(page: &PageSpec, mount_id: &str) -> &'static str {
    let auto_height = page
        .grids
        .iter()
        .find(|g| g.mount_id == mount_id)
        .map(|g| g.options.dom_layout == Some(DomLayout::AutoHeight))
        .unwrap_or(false);
    if auto_height {
        "width: 100%;"
    } else {
        "height: 600px; width: 100%;"
    }
}

/// Plain table of the grid's rows for readers without scripts. Cells are
/// blanked and highlighted the same way the grid shows them.
fn fallback_table(config: &GridConfig) -> String {
    let columns = config.leaf_columns().collect::<Vec<_>>();
    let null_sentinel = config.options.default_col_def.null_sentinel.as_deref();

    let mut out = String::from("<noscript><table class=\"statgrid-fallback\">\n<thead><tr>");
    for col in &columns {
        out.push_str(&format!("<th>{}</th>", escape_html(col.display_name())));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &config.row_data {
        out.push_str("<tr>");
        for col in &columns {
            let value = row.get(&col.field).unwrap_or(&serde_json::Value::Null);
            let text = escape_html(&format_cell(value, null_sentinel));
            match col.style_for(value) {
                Some(style) => out.push_str(&format!(
                    "<td style=\"background-color: {}\">{text}</td>",
                    escape_html(&style.background_color)
                )),
                None => out.push_str(&format!("<td>{text}</td>")),
            }
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table></noscript>");
    out
}

/// Standalone page: one mount element per grid, the grid configs embedded
/// as JSON, and the script that hands them to the grid library.
pub fn render_page_html(page: &PageSpec, document: &StaticDocument) -> Vec<u8> {
    let record = build_page_record(page, document);
    let title = escape_html(&page.title);

    let mut mounts = String::new();
    let mut configs = String::new();
    for grid in record.grids.iter() {
        let id = escape_html(grid.mount_id);
        let style = mount_style(page, grid.mount_id);
        let Some(config) = grid.config else {
            mounts.push_str(&format!(
                "    <div id=\"{id}\" class=\"ag-theme-balham\" style=\"{style}\"></div>\n"
            ));
            continue;
        };
        // The grid script empties the mount before creating the grid.
        mounts.push_str(&format!(
            "    <div id=\"{id}\" class=\"ag-theme-balham\" style=\"{style}\">{}</div>\n",
            fallback_table(config)
        ));
        let json = config.to_json().unwrap_or_else(|_| "null".to_string());
        configs.push_str(&format!(
            "  <script type=\"application/json\" data-mount=\"{id}\">{}</script>\n",
            json_for_script_tag(&json)
        ));
    }

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <script src="{AG_GRID_SCRIPT}"></script>
  <style>
    body {{
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
      margin: 0;
      padding: 16px;
    }}
    h1 {{
      font-size: 20px;
      margin: 0 0 12px 0;
    }}
    .ag-theme-balham {{
      margin-bottom: 24px;
    }}
    a.statgrid-link {{
      color: #1a1a1a;
      text-decoration: none;
    }}
    a.statgrid-link:hover {{
      text-decoration: underline;
    }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <main>
{mounts}  </main>
{configs}  <script>
    (function() {{
      function linkRenderer(params) {{
        if (params.value === null || params.value === undefined || params.value === '') {{
          return '';
        }}
        const a = document.createElement('a');
        a.className = 'statgrid-link';
        a.href = '#';
        a.textContent = String(params.value);
        return a;
      }}

      function applyStyleRules(col) {{
        if (Array.isArray(col.children)) {{
          col.children.forEach(applyStyleRules);
          return;
        }}
        if (!Array.isArray(col.cellStyleRules)) {{
          return;
        }}
        const rules = col.cellStyleRules;
        delete col.cellStyleRules;
        col.cellStyle = function(params) {{
          const rule = rules.find(function(r) {{
            if (r.match === 'contains') {{
              return typeof params.value === 'string' && params.value.includes(r.value);
            }}
            return r.value === params.value;
          }});
          return rule ? rule.style : null;
        }};
      }}

      function toGridOptions(config) {{
        const defaults = config.defaultColDef || {{}};
        if (defaults.nullSentinel !== undefined) {{
          const sentinel = defaults.nullSentinel;
          delete defaults.nullSentinel;
          defaults.valueFormatter = function(params) {{
            return params.value === sentinel ? '' : params.value;
          }};
        }}
        config.defaultColDef = defaults;
        (config.columnDefs || []).forEach(applyStyleRules);
        config.components = {{ statgridLink: linkRenderer }};
        config.onGridReady = function(params) {{
          params.api.sizeColumnsToFit();
          params.api.redrawRows();
        }};
        return config;
      }}

      document.addEventListener('DOMContentLoaded', function() {{
        if (typeof agGrid === 'undefined') {{
          console.error('grid library failed to load');
          return;
        }}
        document.querySelectorAll('script[data-mount]').forEach(function(el) {{
          const mount = document.getElementById(el.getAttribute('data-mount'));
          if (!mount) {{
            console.error('grid container not found: ' + el.getAttribute('data-mount'));
            return;
          }}
          const config = JSON.parse(el.textContent || 'null');
          if (!config) {{
            return;
          }}
          mount.innerHTML = '';
          agGrid.createGrid(mount, toGridOptions(config));
        }});
      }});
    }})();
  </script>
</body>
</html>
"####,
    );

    html.into_bytes()
}
