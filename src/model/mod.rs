use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Backend-assigned product identifier. The API sends numbers, but the
/// client only ever echoes it back in URLs, so it is kept as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("product id is empty".to_string());
        }
        if trimmed.contains(['/', '?', '#']) || trimmed.contains(char::is_whitespace) {
            return Err(format!("invalid product id '{trimmed}'"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Uint(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Self(v.to_string()),
            Raw::Uint(v) => Self(v.to_string()),
            Raw::Text(v) => Self(v),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Product {
    /// The category, treating an empty string the same as a missing one.
    pub fn category(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(self.description.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Body of `POST /api/products` and `PUT /api/products/<id>`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Price must be > 0")]
    PriceNotPositive,

    #[error("Stock must be ≥ 0")]
    NegativeStock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Category,
    Price,
    Stock,
    Description,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "category" | "cat" => Ok(Self::Category),
            "price" => Ok(Self::Price),
            "stock" | "stock_quantity" | "qty" => Ok(Self::Stock),
            "description" | "desc" => Ok(Self::Description),
            other => Err(format!("unknown field '{other}'")),
        }
    }
}

/// Raw values of an add or edit form, as typed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: String,
    pub description: String,
}

impl ProductForm {
    /// Populates a form from a fetched record; absent optionals become empty.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone().unwrap_or_default(),
            price: product.price.to_string(),
            stock: product.stock_quantity.to_string(),
            description: product.description.clone().unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Category => self.category = value,
            FormField::Price => self.price = value,
            FormField::Stock => self.stock = value,
            FormField::Description => self.description = value,
        }
    }

    /// Checks name, price and stock in that order and stops at the first
    /// failing rule.
    pub fn validate(&self) -> Result<ProductPayload, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }

        let price = match parse_number(&self.price) {
            Some(p) if p > 0.0 => p,
            _ => return Err(ValidationError::PriceNotPositive),
        };

        let stock_raw = self.stock.trim();
        let stock_quantity = if stock_raw.is_empty() {
            0
        } else {
            match stock_raw.parse::<i64>() {
                Ok(s) if s >= 0 => s,
                _ => return Err(ValidationError::NegativeStock),
            }
        };

        Ok(ProductPayload {
            name: name.to_string(),
            category: self.category.trim().to_string(),
            price,
            stock_quantity,
            description: self.description.trim().to_string(),
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
