use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 库存条目实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub price: f64,
}

/// Validated partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the category.
    pub category: Option<Option<String>>,
    pub quantity: Option<i32>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Sku,
    Name,
    Category,
    Quantity,
    Price,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Sku => "sku",
            SortField::Name => "name",
            SortField::Category => "category",
            SortField::Quantity => "quantity",
            SortField::Price => "price",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Ascending comparison of two items on this field.
    pub fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            SortField::Sku => a.sku.cmp(&b.sku),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Category => a.category.cmp(&b.category),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sku" => Ok(SortField::Sku),
            "name" => Ok(SortField::Name),
            "category" => Ok(SortField::Category),
            "quantity" => Ok(SortField::Quantity),
            "price" => Ok(SortField::Price),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            _ => Err(()),
        }
    }
}

/// `price` sorts ascending, `-price` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl FromStr for SortSpec {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        Ok(SortSpec {
            field: name.parse()?,
            descending,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ItemListQuery {
    pub skip: i64,
    pub limit: i64,
    pub category: Option<String>,
    pub sort: Option<SortSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_spec_parses_direction() {
        assert_eq!(
            "-price".parse::<SortSpec>(),
            Ok(SortSpec { field: SortField::Price, descending: true })
        );
        assert_eq!(
            "created_at".parse::<SortSpec>(),
            Ok(SortSpec { field: SortField::CreatedAt, descending: false })
        );
        assert!("-hashed_password".parse::<SortSpec>().is_err());
        assert!("".parse::<SortSpec>().is_err());
    }
}
