//! 授权快照
//!
//! 登录和刷新时从存储重新计算用户的角色名和有效权限，
//! 结果只写进访问令牌，不另外缓存。

use std::collections::HashSet;

use shared::client::{PermissionInfo, UserInfo};

use crate::auth::{AccessClaims, AuthError};
use crate::db::{Permission, User, UserId, UserStore};

/// 用户授权快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub id: UserId,
    pub username: String,
    /// 角色名，按存储顺序
    pub roles: Vec<String>,
    /// 所有角色权限的并集，按代码去重，先出现者保留
    pub permissions: Vec<Permission>,
}

impl UserSnapshot {
    /// 权限代码列表
    pub fn permission_codes(&self) -> Vec<String> {
        self.permissions.iter().map(|p| p.code.clone()).collect()
    }

    /// 访问令牌载荷
    pub fn access_claims(&self) -> AccessClaims {
        AccessClaims {
            user_id: self.id,
            username: self.username.clone(),
            roles: self.roles.clone(),
            permissions: self.permission_codes(),
        }
    }

    /// 登录响应中的 `userInfo`
    pub fn user_info(&self, user: &User) -> UserInfo {
        UserInfo {
            id: user.id,
            username: user.username.clone(),
            nick_name: user.nick_name.clone(),
            email: user.email.clone(),
            head_pic: user.head_pic.clone(),
            phone_number: user.phone_number.clone(),
            is_frozen: user.is_frozen,
            is_admin: user.is_admin,
            create_time: user.created_at,
            update_time: user.updated_at,
            roles: self.roles.clone(),
            permissions: self.permissions.iter().map(PermissionInfo::from).collect(),
        }
    }
}

/// 从已加载角色的用户计算快照
pub fn build_snapshot(user: &User) -> UserSnapshot {
    let roles = user.roles.iter().map(|r| r.name.clone()).collect();

    let mut seen = HashSet::new();
    let permissions = user
        .roles
        .iter()
        .flat_map(|r| r.permissions.iter())
        .filter(|p| seen.insert(p.code.clone()))
        .cloned()
        .collect();

    UserSnapshot {
        id: user.id,
        username: user.username.clone(),
        roles,
        permissions,
    }
}

/// 从存储加载用户并计算快照
pub async fn load_snapshot(
    store: &dyn UserStore,
    user_id: UserId,
    is_admin: bool,
) -> Result<(User, UserSnapshot), AuthError> {
    let user = store
        .find_by_id(user_id, is_admin)
        .await?
        .ok_or(AuthError::NotFound)?;
    let snapshot = build_snapshot(&user);
    Ok((user, snapshot))
}
