use super::{ListView, RowView, TableView};
use crate::utils::escape_html;

fn render_row_html(row: &RowView) -> String {
    let id = escape_html(row.id.as_str());
    format!(
        r#"<tr>
  <td>{id}</td>
  <td>
    <div class="name">{name}</div>
    <div class="category">{category}</div>
  </td>
  <td>{description}</td>
  <td class="right">{price}</td>
  <td class="right">{stock}</td>
  <td class="center actions">
    <button class="btn small" data-edit="{id}">Edit</button>
    <button class="btn danger small" data-del="{id}">Delete</button>
  </td>
</tr>
"#,
        id = id,
        name = escape_html(&row.name),
        category = escape_html(&row.category),
        description = escape_html(&row.description),
        price = escape_html(&row.price),
        stock = row.stock_quantity,
    )
}

/// Markup for the table body; replaces whatever was rendered before.
pub fn render_rows_html(table: &TableView) -> String {
    table.rows.iter().map(render_row_html).collect()
}

/// A standalone HTML document of the list, used by `export`.
pub fn render_page(list: &ListView) -> Vec<u8> {
    let rows = render_rows_html(&list.table);
    let empty_display = if list.table.empty_state_visible {
        "block"
    } else {
        "none"
    };
    let summary = escape_html(&list.summary());

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Product Catalog</title>
  <style>
    body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #0f172a; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border-bottom: 1px solid #e2e8f0; padding: .5rem; text-align: left; vertical-align: top; }}
    .right {{ text-align: right; }}
    .center {{ text-align: center; }}
    .category {{ color: #64748b; font-size: .85em; }}
    .summary {{ color: #475569; }}
    #emptyState {{ color: #64748b; padding: 1rem 0; }}
  </style>
</head>
<body>
  <h1>Product Catalog</h1>
  <p class="summary">{summary}</p>
  <table>
    <thead>
      <tr><th>ID</th><th>Product</th><th>Description</th><th class="right">Price</th><th class="right">Stock</th><th class="center">Actions</th></tr>
    </thead>
    <tbody id="tbody">
{rows}    </tbody>
  </table>
  <div id="emptyState" style="display: {empty_display}">No products found.</div>
</body>
</html>
"####
    );
    html.into_bytes()
}
