//! SQLite [`UserStore`]

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::{NewUser, Permission, RepoError, RepoResult, Role, User, UserId, UserStore};

const USER_COLUMNS: &str = "id, username, hash_pass, nick_name, email, head_pic, phone_number, \
                            is_frozen, is_admin, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    hash_pass: String,
    nick_name: String,
    email: String,
    head_pic: Option<String>,
    phone_number: Option<String>,
    is_frozen: bool,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, roles: Vec<Role>) -> User {
        User {
            id: self.id,
            username: self.username,
            hash_pass: self.hash_pass,
            nick_name: self.nick_name,
            email: self.email,
            head_pic: self.head_pic,
            phone_number: self.phone_number,
            is_frozen: self.is_frozen,
            is_admin: self.is_admin,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// role ⟕ role_permissions ⟕ permissions 的一行；没有权限的角色只有角色列
#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    role_id: i64,
    role_name: String,
    permission_id: Option<i64>,
    code: Option<String>,
    description: Option<String>,
}

/// 把按 (角色链接, 权限链接) 排好序的行折叠成角色列表
fn fold_roles(rows: Vec<GrantRow>) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();
    for row in rows {
        if roles.last().is_none_or(|role| role.id != row.role_id) {
            roles.push(Role {
                id: row.role_id,
                name: row.role_name,
                permissions: Vec::new(),
            });
        }

        if let (Some(id), Some(code), Some(description)) =
            (row.permission_id, row.code, row.description)
            && let Some(role) = roles.last_mut()
        {
            role.permissions.push(Permission {
                id,
                code,
                description,
            });
        }
    }
    roles
}

/// 保序去重
fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

/// SQLite 用户存储
///
/// 读取用户时一条联表查询带出角色和权限，按关联表插入顺序排列。
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// 打开数据库并执行迁移
    ///
    /// `sqlite::memory:` 只保留一个永不回收的连接，连接关闭时内存库随之消失。
    pub async fn connect(database_url: &str) -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepoError::Database(format!("Invalid database url: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            let options = options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        tracing::info!(database_url, "Database connection established");
        Self::from_pool(pool).await
    }

    /// 内存数据库 (测试用)
    pub async fn in_memory() -> RepoResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub async fn from_pool(pool: SqlitePool) -> RepoResult<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RepoError::Database(format!("Failed to apply migrations: {e}")))?;
        tracing::debug!("Database migrations applied");

        Ok(Self { pool })
    }

    async fn load(&self, row: UserRow) -> RepoResult<User> {
        let grants = sqlx::query_as::<_, GrantRow>(
            "SELECT r.id AS role_id, r.name AS role_name, \
                    p.id AS permission_id, p.code AS code, p.description AS description \
             FROM user_roles ur \
             JOIN roles r ON r.id = ur.role_id \
             LEFT JOIN role_permissions rp ON rp.role_id = r.id \
             LEFT JOIN permissions p ON p.id = rp.permission_id \
             WHERE ur.user_id = ? \
             ORDER BY ur.id, rp.id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(row.into_user(fold_roles(grants)))
    }

    async fn load_optional(&self, row: Option<UserRow>) -> RepoResult<Option<User>> {
        match row {
            Some(row) => self.load(row).await.map(Some),
            None => Ok(None),
        }
    }
}

async fn require_user(conn: &mut SqliteConnection, id: UserId) -> RepoResult<()> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| RepoError::NotFound(format!("User {id}")))
}

async fn require_role(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| RepoError::NotFound(format!("Role {id}")))
}

/// 替换用户的角色链接，调用方负责事务
async fn replace_user_roles(
    conn: &mut SqliteConnection,
    user_id: UserId,
    role_ids: &[i64],
) -> RepoResult<()> {
    for role_id in role_ids {
        require_role(&mut *conn, *role_id).await?;
    }

    sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for role_id in dedup_ids(role_ids) {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_username(&self, username: &str, is_admin: bool) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? AND is_admin = ?"
        ))
        .bind(username)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await?;
        self.load_optional(row).await
    }

    async fn find_by_id(&self, id: UserId, is_admin: bool) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND is_admin = ?"
        ))
        .bind(id)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await?;
        self.load_optional(row).await
    }

    async fn find_detail_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.load_optional(row).await
    }

    async fn username_taken(&self, username: &str) -> RepoResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn create(&self, data: NewUser) -> RepoResult<User> {
        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users \
             (username, hash_pass, nick_name, email, phone_number, is_admin, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&data.username)
        .bind(&hash_pass)
        .bind(&data.nick_name)
        .bind(&data.email)
        .bind(&data.phone_number)
        .bind(data.is_admin)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Username '{}' already exists", data.username))
            }
            other => other,
        })?;

        if !data.role_ids.is_empty() {
            replace_user_roles(&mut tx, row.id, &data.role_ids).await?;
        }
        tx.commit().await?;

        self.load(row).await
    }

    async fn freeze(&self, id: UserId) -> RepoResult<()> {
        let result = sqlx::query("UPDATE users SET is_frozen = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("User {id}")));
        }
        Ok(())
    }

    async fn find_permission_by_code(&self, code: &str) -> RepoResult<Option<Permission>> {
        let permission = sqlx::query_as::<_, Permission>(
            "SELECT id, code, description FROM permissions WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(permission)
    }

    async fn create_permission(&self, code: &str, description: &str) -> RepoResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (code, description) VALUES (?, ?) \
             RETURNING id, code, description",
        )
        .bind(code)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Permission '{code}' already exists"))
            }
            other => other,
        })
    }

    async fn find_role_by_name(&self, name: &str) -> RepoResult<Option<Role>> {
        let grants = sqlx::query_as::<_, GrantRow>(
            "SELECT r.id AS role_id, r.name AS role_name, \
                    p.id AS permission_id, p.code AS code, p.description AS description \
             FROM roles r \
             LEFT JOIN role_permissions rp ON rp.role_id = r.id \
             LEFT JOIN permissions p ON p.id = rp.permission_id \
             WHERE r.name = ? \
             ORDER BY rp.id",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(fold_roles(grants).into_iter().next())
    }

    async fn create_role(&self, name: &str, permission_ids: &[i64]) -> RepoResult<Role> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>("INSERT INTO roles (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match RepoError::from(e) {
                RepoError::Duplicate(_) => {
                    RepoError::Duplicate(format!("Role '{name}' already exists"))
                }
                other => other,
            })?;

        let mut permissions = Vec::new();
        for permission_id in dedup_ids(permission_ids) {
            let permission = sqlx::query_as::<_, Permission>(
                "SELECT id, code, description FROM permissions WHERE id = ?",
            )
            .bind(permission_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Permission {permission_id}")))?;

            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
                .bind(id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
            permissions.push(permission);
        }
        tx.commit().await?;

        Ok(Role {
            id,
            name: name.to_string(),
            permissions,
        })
    }

    async fn set_user_roles(&self, user_id: UserId, role_ids: &[i64]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;
        require_user(&mut tx, user_id).await?;
        replace_user_roles(&mut tx, user_id, role_ids).await?;

        sqlx::query("UPDATE users SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
