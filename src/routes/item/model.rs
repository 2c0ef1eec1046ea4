use serde::{Deserialize, Deserializer, Serialize};

use crate::database::models::{Item, ItemChanges, ItemListQuery, NewItem, SortSpec};
use crate::error::AppError;
use crate::infrastructure::Quote;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;
const SKU_MIN_CHARS: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct ListItemsParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ListItemsParams {
    pub fn into_query(self) -> Result<ItemListQuery, AppError> {
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(AppError::Validation("skip must be >= 0".into()));
        }

        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<SortSpec>()
                    .map_err(|_| AppError::BadRequest(format!("Cannot sort by {:?}", raw)))?,
            ),
            None => None,
        };

        Ok(ItemListQuery {
            skip,
            limit,
            category: self.category.filter(|c| !c.is_empty()),
            sort,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub quantity: i32,
    pub price: f64,
}

/// Keeps an explicit `null` apart from an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    pub quantity: Option<i32>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EnrichedItem {
    pub item: Item,
    pub external: Quote,
}

fn check_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 0 {
        return Err(AppError::Validation("quantity must be >= 0".into()));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::Validation("price must be > 0".into()));
    }
    Ok(())
}

impl CreateItemRequest {
    pub fn validate(self) -> Result<NewItem, AppError> {
        let sku = self.sku.trim().to_string();
        if sku.chars().count() < SKU_MIN_CHARS {
            return Err(AppError::Validation(format!(
                "sku must be at least {} characters",
                SKU_MIN_CHARS
            )));
        }
        check_name(&self.name)?;
        check_quantity(self.quantity)?;
        check_price(self.price)?;

        Ok(NewItem {
            sku,
            name: self.name,
            category: self.category.filter(|c| !c.is_empty()),
            quantity: self.quantity,
            price: self.price,
        })
    }
}

impl UpdateItemRequest {
    pub fn validate(self) -> Result<ItemChanges, AppError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }

        Ok(ItemChanges {
            name: self.name,
            // "" clears like null
            category: self.category.map(|c| c.filter(|c| !c.is_empty())),
            quantity: self.quantity,
            price: self.price,
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::SortField;

    #[test]
    fn list_defaults() {
        let query = ListItemsParams::default().into_query().unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 10);
        assert!(query.category.is_none());
        assert!(query.sort.is_none());
    }

    #[test]
    fn list_rejects_bad_paging_and_sort() {
        let bad_limit = ListItemsParams { limit: Some(0), ..Default::default() };
        assert!(matches!(bad_limit.into_query(), Err(AppError::Validation(_))));

        let bad_skip = ListItemsParams { skip: Some(-1), ..Default::default() };
        assert!(matches!(bad_skip.into_query(), Err(AppError::Validation(_))));

        let bad_sort = ListItemsParams { sort: Some("-password".into()), ..Default::default() };
        assert!(matches!(bad_sort.into_query(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn list_parses_descending_sort() {
        let query = ListItemsParams {
            category: Some("electronics".into()),
            sort: Some("-price".into()),
            ..Default::default()
        }
        .into_query()
        .unwrap();
        assert_eq!(query.category.as_deref(), Some("electronics"));
        assert_eq!(query.sort, Some(SortSpec { field: SortField::Price, descending: true }));
    }

    fn create(sku: &str, quantity: i32, price: f64) -> CreateItemRequest {
        CreateItemRequest {
            sku: sku.into(),
            name: "Widget".into(),
            category: None,
            quantity,
            price,
        }
    }

    #[test]
    fn create_validation() {
        assert!(create("SKU-1", 0, 1.5).validate().is_ok());
        assert!(create("AB", 1, 1.0).validate().is_err());
        assert!(create("SKU-1", -1, 1.0).validate().is_err());
        assert!(create("SKU-1", 1, 0.0).validate().is_err());
        assert!(create("SKU-1", 1, f64::NAN).validate().is_err());
    }

    #[test]
    fn update_tells_null_category_from_absent() {
        let absent: UpdateItemRequest = serde_json::from_str(r#"{"quantity": 1}"#).unwrap();
        assert_eq!(absent.validate().unwrap().category, None);

        let cleared: UpdateItemRequest = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(cleared.validate().unwrap().category, Some(None));

        let set: UpdateItemRequest = serde_json::from_str(r#"{"category": "tools"}"#).unwrap();
        assert_eq!(set.validate().unwrap().category, Some(Some("tools".to_string())));
    }

    #[test]
    fn update_validation_only_checks_present_fields() {
        assert!(UpdateItemRequest::default().validate().is_ok());
        let bad = UpdateItemRequest { price: Some(-3.0), ..Default::default() };
        assert!(bad.validate().is_err());
    }
}
