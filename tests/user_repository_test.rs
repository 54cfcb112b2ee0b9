//! User repository integration tests
//!
//! Runs against an in-memory SQLite database with the real migrations.

use sqlx::sqlite::SqlitePoolOptions;

use shopcast::database::{UserRepository, MIGRATOR};
use shopcast::models::HANDLE_PLACEHOLDER;

async fn repository() -> UserRepository {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    UserRepository::new(pool)
}

#[tokio::test]
async fn upsert_overwrites_instead_of_duplicating() {
    let repo = repository().await;

    repo.upsert(1, Some("ann"), "Ann Smith", "Riga", "Main st. 1")
        .await
        .unwrap();
    repo.upsert(1, Some("ann"), "Ann Smith", "Tallinn", "Harbor rd. 2")
        .await
        .unwrap();

    let user = repo.find_by_telegram_id(1).await.unwrap().unwrap();
    assert_eq!(user.city, "Tallinn");
    assert_eq!(user.shop_address, "Harbor rd. 2");
    assert_eq!(repo.count_active().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_username_is_stored_as_placeholder() {
    let repo = repository().await;

    repo.upsert(1, None, "Ann Smith", "Riga", "Main st. 1")
        .await
        .unwrap();

    let user = repo.find_by_telegram_id(1).await.unwrap().unwrap();
    assert_eq!(user.handle(), HANDLE_PLACEHOLDER);
}

#[tokio::test]
async fn banned_users_are_excluded_from_the_active_list() {
    let repo = repository().await;

    repo.upsert(1, Some("ann"), "Ann Smith", "Riga", "Main st. 1")
        .await
        .unwrap();
    repo.upsert(2, Some("bob"), "Bob Stone", "Riga", "Main st. 2")
        .await
        .unwrap();

    assert!(repo.ban_by_username("bob").await.unwrap());

    assert!(repo.is_banned(2).await.unwrap());
    assert!(!repo.is_banned(1).await.unwrap());

    let active = repo.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].user_id, 1);
    assert_eq!(repo.count_active().await.unwrap(), 1);
}

#[tokio::test]
async fn ban_is_idempotent_safe() {
    let repo = repository().await;

    repo.upsert(1, Some("ann"), "Ann Smith", "Riga", "Main st. 1")
        .await
        .unwrap();

    assert!(repo.ban_by_username("ann").await.unwrap());
    // Already banned: no write, reported as not-changed
    assert!(!repo.ban_by_username("ann").await.unwrap());
    // Unknown handle: no write either
    assert!(!repo.ban_by_username("ghost").await.unwrap());
}

#[tokio::test]
async fn ban_accepts_a_leading_at_sign() {
    let repo = repository().await;

    repo.upsert(1, Some("ann"), "Ann Smith", "Riga", "Main st. 1")
        .await
        .unwrap();

    assert!(repo.ban_by_username("@ann").await.unwrap());
    assert!(repo.is_banned(1).await.unwrap());
}

#[tokio::test]
async fn placeholder_handle_is_never_bannable() {
    let repo = repository().await;

    // Two users without a username both carry the placeholder handle;
    // banning it would hit them all.
    repo.upsert(1, None, "Ann Smith", "Riga", "Main st. 1")
        .await
        .unwrap();
    repo.upsert(2, None, "Bob Stone", "Riga", "Main st. 2")
        .await
        .unwrap();

    assert!(!repo.ban_by_username(HANDLE_PLACEHOLDER).await.unwrap());
    assert_eq!(repo.count_active().await.unwrap(), 2);
}

#[tokio::test]
async fn re_registration_does_not_lift_a_ban() {
    let repo = repository().await;

    repo.upsert(1, Some("ann"), "Ann Smith", "Riga", "Main st. 1")
        .await
        .unwrap();
    assert!(repo.ban_by_username("ann").await.unwrap());

    repo.upsert(1, Some("ann"), "Ann Smith", "Tallinn", "Harbor rd. 2")
        .await
        .unwrap();

    assert!(repo.is_banned(1).await.unwrap());
}

#[tokio::test]
async fn unknown_users_are_not_banned() {
    let repo = repository().await;
    assert!(!repo.is_banned(404).await.unwrap());
}
