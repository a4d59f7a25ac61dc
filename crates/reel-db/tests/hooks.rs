//! Integration tests for hook storage.

use reel_db::repositories::{HookRepo, UserRepo};
use sqlx::PgPool;
use uuid::Uuid;

fn texts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("hook number {i}")).collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_create_batch_preserves_order(pool: PgPool) {
    let user = UserRepo::ensure_exists(&pool, Uuid::new_v4()).await.unwrap().id;
    let generation = Uuid::new_v4();

    let hooks = HookRepo::create_batch(&pool, user, generation, "plants", &texts(3), 10)
        .await
        .unwrap();
    assert_eq!(hooks.len(), 3);

    let stored = HookRepo::list_by_generation(&pool, generation).await.unwrap();
    let indexes: Vec<i32> = stored.iter().map(|h| h.hook_index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    assert_eq!(stored[2].hook_text, "hook number 2");
    assert!(stored.iter().all(|h| h.credits_used == 10 && h.prompt == "plants"));

    assert_eq!(HookRepo::count_by_user(&pool, user).await.unwrap(), 3);
    let page = HookRepo::list_by_user(&pool, user, 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    let rest = HookRepo::list_by_user(&pool, user, 2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_only_touches_own_hooks(pool: PgPool) {
    let owner = UserRepo::ensure_exists(&pool, Uuid::new_v4()).await.unwrap().id;
    let stranger = UserRepo::ensure_exists(&pool, Uuid::new_v4()).await.unwrap().id;

    let hooks = HookRepo::create_batch(&pool, owner, Uuid::new_v4(), "p", &texts(4), 10)
        .await
        .unwrap();

    assert!(!HookRepo::delete(&pool, hooks[0].id, stranger).await.unwrap());
    assert!(HookRepo::delete(&pool, hooks[0].id, owner).await.unwrap());
    assert!(HookRepo::find_by_id(&pool, hooks[0].id).await.unwrap().is_none());

    let ids = vec![hooks[1].id, hooks[2].id, Uuid::new_v4()];
    let none = HookRepo::delete_many(&pool, &ids, stranger).await.unwrap();
    assert!(none.is_empty());

    let removed = HookRepo::delete_many(&pool, &ids, owner).await.unwrap();
    let mut removed_ids: Vec<Uuid> = removed.iter().map(|h| h.id).collect();
    removed_ids.sort();
    let mut expected = vec![hooks[1].id, hooks[2].id];
    expected.sort();
    assert_eq!(removed_ids, expected);

    assert_eq!(HookRepo::count_by_user(&pool, owner).await.unwrap(), 1);
}
