//! Principal storage
//!
//! 用户、角色、权限三张表及其多对多关联。读取用户时总是把角色和
//! 角色下的权限一并加载，保持存储顺序。

pub mod models;
pub mod seed;
pub mod sqlite;

pub use models::{NewUser, Permission, Role, User, UserId};
pub use sqlite::SqliteUserStore;

use async_trait::async_trait;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// 用户存储
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 按用户名查找，只匹配 `is_admin` 相同的用户
    async fn find_by_username(&self, username: &str, is_admin: bool) -> RepoResult<Option<User>>;

    /// 按 ID 查找，只匹配 `is_admin` 相同的用户
    async fn find_by_id(&self, id: UserId, is_admin: bool) -> RepoResult<Option<User>>;

    /// 按 ID 查找，不区分管理员
    async fn find_detail_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// 用户名是否已被占用 (不区分管理员)
    async fn username_taken(&self, username: &str) -> RepoResult<bool>;

    /// 创建用户并挂上 `role_ids`；用户名已存在时返回 [`RepoError::Duplicate`]
    async fn create(&self, data: NewUser) -> RepoResult<User>;

    /// 冻结用户
    async fn freeze(&self, id: UserId) -> RepoResult<()>;

    async fn find_permission_by_code(&self, code: &str) -> RepoResult<Option<Permission>>;

    async fn create_permission(&self, code: &str, description: &str) -> RepoResult<Permission>;

    /// 按名称查找角色 (带权限)
    async fn find_role_by_name(&self, name: &str) -> RepoResult<Option<Role>>;

    async fn create_role(&self, name: &str, permission_ids: &[i64]) -> RepoResult<Role>;

    /// 替换用户的全部角色，顺序即存储顺序
    async fn set_user_roles(&self, user_id: UserId, role_ids: &[i64]) -> RepoResult<()>;
}
