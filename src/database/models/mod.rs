// 数据库实体定义
pub mod item;
pub mod user;

pub use item::{Item, ItemChanges, ItemListQuery, NewItem, SortField, SortSpec};
pub use user::{ADMIN_ROLE, DEFAULT_ROLE, UserEntity};
