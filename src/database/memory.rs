//! In-memory repositories used by the handler tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::models::{Item, ItemChanges, ItemListQuery, NewItem, UserEntity};
use super::repositories::{ItemRepository, RepositoryError, UserRepository};

#[derive(Default)]
pub struct MemoryItemRepository {
    items: Mutex<Vec<Item>>,
    list_calls: AtomicUsize,
}

impl MemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `list` reached the repository.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn list(&self, query: &ItemListQuery) -> Result<Vec<Item>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut items: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| match &query.category {
                Some(category) => item.category.as_deref() == Some(category.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        match query.sort {
            Some(sort) => items.sort_by(|a, b| {
                let ord = sort.field.compare(a, b);
                let ord = if sort.descending { ord.reverse() } else { ord };
                ord.then_with(|| a.id.cmp(&b.id))
            }),
            None => items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))),
        }

        Ok(items
            .into_iter()
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, RepositoryError> {
        Ok(self.items.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn create(&self, item: NewItem) -> Result<Item, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|i| i.sku == item.sku) {
            return Err(RepositoryError::Conflict("Item with this SKU"));
        }
        let now = Utc::now();
        let created = Item {
            id: Uuid::new_v4().to_string(),
            sku: item.sku,
            name: item.name,
            category: item.category,
            quantity: item.quantity,
            price: item.price,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        items.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, changes: ItemChanges) -> Result<Option<Item>, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(category) = changes.category {
            item.category = category;
        }
        if let Some(quantity) = changes.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = changes.price {
            item.price = price;
        }
        if let Some(is_active) = changes.is_active {
            item.is_active = is_active;
        }
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<UserEntity>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_role(&self, email: &str, role: &str) {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.email == email) {
            user.role = role.to_string();
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, RepositoryError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn create(
        &self,
        email: &str,
        hashed_password: &str,
        role: &str,
    ) -> Result<UserEntity, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(RepositoryError::Conflict("User"));
        }
        let user = UserEntity {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            role: role.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }
}
