//! User / Role / Permission models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::client::{PermissionInfo, UserDetailVo};

/// 用户 ID
pub type UserId = i64;

/// 权限
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    pub id: i64,
    /// 短代码，例如 `ccc`
    pub code: String,
    pub description: String,
}

impl From<&Permission> for PermissionInfo {
    fn from(p: &Permission) -> Self {
        Self {
            id: p.id,
            code: p.code.clone(),
            description: p.description.clone(),
        }
    }
}

/// 角色 (带权限，按存储顺序)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<Permission>,
}

/// 用户 (角色与权限已联表加载)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    pub nick_name: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub is_admin: bool,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create user payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub nick_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub is_admin: bool,
    /// 初始角色，与用户在同一事务中写入
    pub role_ids: Vec<i64>,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// 个人资料视图 (不含角色、权限与密码)
    pub fn detail(&self) -> UserDetailVo {
        UserDetailVo {
            id: self.id,
            username: self.username.clone(),
            nick_name: self.nick_name.clone(),
            email: self.email.clone(),
            head_pic: self.head_pic.clone(),
            phone_number: self.phone_number.clone(),
            is_frozen: self.is_frozen,
            create_time: self.created_at,
            update_time: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_password(password: &str) -> User {
        let now = Utc::now();
        User {
            id: 1,
            username: "zhangsan".to_string(),
            hash_pass: User::hash_password(password).unwrap(),
            nick_name: "张三".to_string(),
            email: "xxx@xx.com".to_string(),
            head_pic: None,
            phone_number: None,
            is_frozen: false,
            is_admin: true,
            roles: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let user = user_with_password("111111");
        assert!(user.hash_pass.starts_with("$argon2"));
        assert!(user.verify_password("111111").unwrap());
        assert!(!user.verify_password("222222").unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let a = User::hash_password("111111").unwrap();
        let b = User::hash_password("111111").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = user_with_password("111111");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash_pass"));
        assert!(!json.contains("$argon2"));
    }

    #[test]
    fn test_detail_view() {
        let user = user_with_password("111111");
        let detail = user.detail();
        assert_eq!(detail.id, 1);
        assert_eq!(detail.nick_name, "张三");
        assert!(!detail.is_frozen);
    }
}
