pub mod report;

use serde::Serialize;

use crate::model::{Product, ProductId};
use crate::query::ListQuery;
use crate::utils;

pub const CATEGORY_PLACEHOLDER: &str = "—";

/// One displayed product row. Text is display-ready but not escaped; the
/// markup renderer escapes it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowView {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub stock_quantity: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableView {
    pub empty_state_visible: bool,
    pub rows: Vec<RowView>,
}

/// Everything needed to draw the product list for one query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListView {
    pub query: ListQuery,
    pub table: TableView,
}

impl ListView {
    pub fn summary(&self) -> String {
        let mut parts = vec![match self.table.rows.len() {
            1 => "1 product".to_string(),
            n => format!("{n} products"),
        }];
        if !self.query.search.is_empty() {
            parts.push(format!("search \"{}\"", self.query.search));
        }
        if !self.query.category.is_empty() {
            parts.push(format!("category \"{}\"", self.query.category));
        }
        parts.push(format!("sorted by {}", self.query.sort.label()));
        parts.join(" · ")
    }
}

pub fn render_row(product: &Product) -> RowView {
    RowView {
        id: product.id.clone(),
        name: product.name.clone(),
        category: product
            .category()
            .unwrap_or(CATEGORY_PLACEHOLDER)
            .to_string(),
        description: product.description().unwrap_or_default().to_string(),
        price: utils::format_price(product.price),
        stock_quantity: product.stock_quantity,
    }
}

/// Rows keep the server's order.
pub fn render_table(products: &[Product]) -> TableView {
    TableView {
        empty_state_visible: products.is_empty(),
        rows: products.iter().map(render_row).collect(),
    }
}

pub fn render_list(query: &ListQuery, products: &[Product]) -> ListView {
    ListView {
        query: query.clone(),
        table: render_table(products),
    }
}
