use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户数据库实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// user | admin
    pub role: String,
}

pub const DEFAULT_ROLE: &str = "user";
pub const ADMIN_ROLE: &str = "admin";
