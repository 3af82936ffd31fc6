//! 演示数据
//!
//! | 用户 | 密码 | 管理员 | 角色 | 权限 |
//! |------|------|--------|------|------|
//! | zhangsan | 111111 | 是 | 管理员 | ccc, ddd |
//! | lisi | 222222 | 否 | 普通用户 | ccc |

use super::{NewUser, Permission, RepoResult, Role, UserStore};

/// 写入演示用户、角色和权限
///
/// 每一项都是"有则跳过，无则创建"，重复调用或中途失败后重跑都会收敛到同一状态。
/// 用户名已被占用时不创建该用户，也不改动占用者的角色。
/// 本次调用新建了任何数据时返回 `true`。
pub async fn seed_demo_data(store: &dyn UserStore) -> RepoResult<bool> {
    let (ccc, new_ccc) = ensure_permission(store, "ccc", "访问 ccc 接口").await?;
    let (ddd, new_ddd) = ensure_permission(store, "ddd", "访问 ddd 接口").await?;

    let (admin, new_admin) = ensure_role(store, "管理员", &[ccc.id, ddd.id]).await?;
    let (normal, new_normal) = ensure_role(store, "普通用户", &[ccc.id]).await?;

    let new_zhangsan = ensure_user(
        store,
        NewUser {
            username: "zhangsan".to_string(),
            password: "111111".to_string(),
            nick_name: "张三".to_string(),
            email: "xxx@xx.com".to_string(),
            phone_number: Some("13233323333".to_string()),
            is_admin: true,
            role_ids: vec![admin.id],
        },
    )
    .await?;
    let new_lisi = ensure_user(
        store,
        NewUser {
            username: "lisi".to_string(),
            password: "222222".to_string(),
            nick_name: "李四".to_string(),
            email: "yy@yy.com".to_string(),
            phone_number: None,
            is_admin: false,
            role_ids: vec![normal.id],
        },
    )
    .await?;

    let changed = new_ccc || new_ddd || new_admin || new_normal || new_zhangsan || new_lisi;
    if changed {
        tracing::info!(
            zhangsan = new_zhangsan,
            lisi = new_lisi,
            "Demo data seeded"
        );
    }
    Ok(changed)
}

async fn ensure_permission(
    store: &dyn UserStore,
    code: &str,
    description: &str,
) -> RepoResult<(Permission, bool)> {
    if let Some(existing) = store.find_permission_by_code(code).await? {
        return Ok((existing, false));
    }
    Ok((store.create_permission(code, description).await?, true))
}

async fn ensure_role(
    store: &dyn UserStore,
    name: &str,
    permission_ids: &[i64],
) -> RepoResult<(Role, bool)> {
    if let Some(existing) = store.find_role_by_name(name).await? {
        return Ok((existing, false));
    }
    Ok((store.create_role(name, permission_ids).await?, true))
}

async fn ensure_user(store: &dyn UserStore, user: NewUser) -> RepoResult<bool> {
    if store.username_taken(&user.username).await? {
        tracing::debug!(username = %user.username, "Demo user skipped, username taken");
        return Ok(false);
    }
    store.create(user).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteUserStore;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        assert!(seed_demo_data(&store).await.unwrap());
        assert!(!seed_demo_data(&store).await.unwrap());

        let zhangsan = store.find_by_username("zhangsan", true).await.unwrap().unwrap();
        assert_eq!(zhangsan.roles.len(), 1);
        assert_eq!(zhangsan.roles[0].name, "管理员");
        assert!(zhangsan.verify_password("111111").unwrap());

        let lisi = store.find_by_username("lisi", false).await.unwrap().unwrap();
        assert_eq!(lisi.roles[0].name, "普通用户");
        assert_eq!(lisi.roles[0].permissions.len(), 1);
        assert_eq!(lisi.roles[0].permissions[0].code, "ccc");
    }

    #[tokio::test]
    async fn test_seed_leaves_taken_username_alone() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        let squatter = store
            .create(NewUser {
                username: "zhangsan".to_string(),
                password: "333333".to_string(),
                nick_name: "zs".to_string(),
                email: "zs@xx.com".to_string(),
                phone_number: None,
                is_admin: false,
                role_ids: vec![],
            })
            .await
            .unwrap();

        assert!(seed_demo_data(&store).await.unwrap());
        assert!(!seed_demo_data(&store).await.unwrap());

        // the existing account keeps its flags and gets no demo roles
        let zhangsan = store.find_detail_by_id(squatter.id).await.unwrap().unwrap();
        assert!(!zhangsan.is_admin);
        assert!(zhangsan.roles.is_empty());
        assert!(store.find_by_username("zhangsan", true).await.unwrap().is_none());

        let lisi = store.find_by_username("lisi", false).await.unwrap().unwrap();
        assert_eq!(lisi.roles[0].name, "普通用户");
    }

    #[tokio::test]
    async fn test_seed_completes_partial_state() {
        let store = SqliteUserStore::in_memory().await.unwrap();
        let ccc = store.create_permission("ccc", "访问 ccc 接口").await.unwrap();
        store.create_role("普通用户", &[ccc.id]).await.unwrap();

        assert!(seed_demo_data(&store).await.unwrap());

        let zhangsan = store.find_by_username("zhangsan", true).await.unwrap().unwrap();
        let codes: Vec<_> = zhangsan.roles[0]
            .permissions
            .iter()
            .map(|p| p.code.as_str())
            .collect();
        assert_eq!(codes, vec!["ccc", "ddd"]);
        assert!(store.find_by_username("lisi", false).await.unwrap().is_some());
    }
}
