// 数据库模块
// 包含数据库实体定义和存储库操作

pub mod models; // 数据库实体定义
pub mod repositories; // 存储库实现

#[cfg(test)]
pub mod memory;

pub use repositories::{
    ItemRepository, PgItemRepository, PgUserRepository, RepositoryError, UserRepository,
};
