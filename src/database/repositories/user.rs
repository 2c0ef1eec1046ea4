use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, UserRepository, is_unique_violation};
use crate::database::models::UserEntity;

/// 用户存储库实现
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, RepositoryError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, hashed_password, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(
        &self,
        email: &str,
        hashed_password: &str,
        role: &str,
    ) -> Result<UserEntity, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (id, email, hashed_password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, hashed_password, role
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(hashed_password)
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                tracing::info!("Created user: {}", user.id);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict("User")),
            Err(e) => {
                tracing::error!("Failed to create user: {:?}", e);
                Err(e.into())
            }
        }
    }
}
