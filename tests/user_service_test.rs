//! User service integration tests against an in-memory store.

mod common;

use std::sync::atomic::Ordering;

use chrono::NaiveDate;
use common::{harness, new_user, InMemoryUserCache};
use user_scaffold::domain::{NewUser, UserChanges, UserListFilter};
use user_scaffold::errors::ErrorKind;
use user_scaffold::services::UserService;

async fn row_count(db: &sea_orm::DatabaseConnection) -> u64 {
    use sea_orm::{ConnectionTrait, Statement};

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT COUNT(*) AS n FROM users".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap() as u64
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_non_positive_ids_are_rejected_before_any_io() {
    let h = harness().await;

    for id in [0, -7] {
        let err = h.service.get_user(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = h
            .service
            .update_user(id, UserChanges::new("Name"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = h.service.delete_user(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    assert_eq!(h.repo.calls(), 0);
    assert_eq!(InMemoryUserCache::count(&h.cache.gets), 0);
    assert_eq!(InMemoryUserCache::count(&h.cache.sets), 0);
    assert_eq!(InMemoryUserCache::count(&h.cache.deletes), 0);
}

#[tokio::test]
async fn test_create_requires_email_and_name() {
    let h = harness().await;

    let err = h.service.create_user(NewUser::new("", "Name")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.user_message(), "email and name are required");

    let err = h
        .service
        .create_user(NewUser::new("a@example.com", "   "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(h.repo.calls(), 0);
    assert_eq!(row_count(&h.db).await, 0);
}

// =============================================================================
// Create / Get
// =============================================================================

#[tokio::test]
async fn test_create_assigns_identity_and_timestamps() {
    let h = harness().await;

    let input = NewUser {
        used_name: Some("JD".to_string()),
        company: Some("Acme".to_string()),
        birth: NaiveDate::from_ymd_opt(1990, 5, 17),
        ..new_user("jd@example.com")
    };
    let user = h.service.create_user(input).await.unwrap();

    assert!(user.id > 0);
    assert!(user.external_id.is_some());
    assert_eq!(user.email, "jd@example.com");
    assert_eq!(user.used_name.as_deref(), Some("JD"));
    assert_eq!(user.company.as_deref(), Some("Acme"));
    assert_eq!(user.birth, NaiveDate::from_ymd_opt(1990, 5, 17));
    assert_eq!(user.created_at, user.updated_at);
    assert_eq!(row_count(&h.db).await, 1);
}

#[tokio::test]
async fn test_get_after_create_is_served_from_cache() {
    let h = harness().await;

    let created = h.service.create_user(new_user("cached@example.com")).await.unwrap();
    assert!(h.cache.contains(created.id));
    let store_calls = h.repo.calls();

    let fetched = h.service.get_user(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(h.repo.calls(), store_calls);
    assert_eq!(InMemoryUserCache::count(&h.cache.hits), 1);
}

#[tokio::test]
async fn test_get_miss_reads_store_and_populates_cache() {
    let h = harness().await;

    // Created while the cache is down, so nothing is cached yet.
    h.cache.fail(true);
    let created = h.service.create_user(new_user("miss@example.com")).await.unwrap();
    h.cache.fail(false);
    assert!(!h.cache.contains(created.id));

    let store_calls = h.repo.calls();
    let fetched = h.service.get_user(created.id).await.unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.email, "miss@example.com");
    assert_eq!(h.repo.calls(), store_calls + 1);
    assert!(h.cache.contains(created.id));
}

#[tokio::test]
async fn test_cache_outage_does_not_fail_requests() {
    let h = harness().await;
    h.cache.fail(true);

    let created = h.service.create_user(new_user("outage@example.com")).await.unwrap();
    let fetched = h.service.get_user(created.id).await.unwrap();
    assert_eq!(fetched.email, created.email);

    let updated = h
        .service
        .update_user(created.id, UserChanges::new("Renamed"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");

    h.service.delete_user(created.id).await.unwrap();
    assert_eq!(row_count(&h.db).await, 0);
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() {
    let h = harness().await;

    let err = h.service.get_user(12345).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.user_message(), "user not found");
    assert!(!h.cache.contains(12345));
}

#[tokio::test]
async fn test_lookup_by_email_and_external_id() {
    let h = harness().await;
    let created = h.service.create_user(new_user("lookup@example.com")).await.unwrap();

    let by_email = h.service.get_user_by_email("lookup@example.com").await.unwrap();
    assert_eq!(by_email.id, created.id);

    let external_id = created.external_id.unwrap();
    let by_external = h.service.get_user_by_external_id(external_id).await.unwrap();
    assert_eq!(by_external.id, created.id);

    let err = h.service.get_user_by_email("nobody@example.com").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = h.service.get_user_by_email("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// =============================================================================
// Conflicts
// =============================================================================

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let h = harness().await;

    h.service.create_user(new_user("dup@example.com")).await.unwrap();
    let err = h.service.create_user(new_user("dup@example.com")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.user_message(), "email already exists");
    assert_eq!(row_count(&h.db).await, 1);
}

/// The harness pool holds one connection, so the second transaction queues
/// behind the first and its insert meets the unique index after the commit.
#[tokio::test]
async fn test_queued_same_email_creates_yield_one_conflict() {
    let h = harness().await;

    let (a, b) = tokio::join!(
        h.service.create_user(new_user("race@example.com")),
        h.service.create_user(new_user("race@example.com")),
    );

    let results = [a, b];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::Conflict))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(row_count(&h.db).await, 1);
}

#[tokio::test]
async fn test_update_to_taken_email_is_conflict() {
    let h = harness().await;

    h.service.create_user(new_user("first@example.com")).await.unwrap();
    let second = h.service.create_user(new_user("second@example.com")).await.unwrap();

    let changes = UserChanges {
        email: Some("first@example.com".to_string()),
        ..UserChanges::new("Second")
    };
    let err = h.service.update_user(second.id, changes).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // The failed update rolled back and left the cached copy alone.
    let fetched = h.service.get_user(second.id).await.unwrap();
    assert_eq!(fetched.email, "second@example.com");
}

// =============================================================================
// Update / Delete
// =============================================================================

#[tokio::test]
async fn test_update_replaces_attributes_and_refreshes_cache() {
    let h = harness().await;

    let input = NewUser {
        company: Some("Acme".to_string()),
        ..new_user("upd@example.com")
    };
    let created = h.service.create_user(input).await.unwrap();

    let changes = UserChanges {
        used_name: Some("Upd".to_string()),
        ..UserChanges::new("Updated Name")
    };
    let updated = h.service.update_user(created.id, changes).await.unwrap();

    assert_eq!(updated.name, "Updated Name");
    assert_eq!(updated.email, "upd@example.com");
    assert_eq!(updated.used_name.as_deref(), Some("Upd"));
    assert_eq!(updated.company, None);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let store_calls = h.repo.calls();
    let fetched = h.service.get_user(created.id).await.unwrap();
    assert_eq!(fetched, updated);
    assert_eq!(h.repo.calls(), store_calls);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found_and_creates_nothing() {
    let h = harness().await;

    let err = h
        .service
        .update_user(999, UserChanges::new("Ghost"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(row_count(&h.db).await, 0);
    assert_eq!(InMemoryUserCache::count(&h.cache.sets), 0);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let h = harness().await;

    let created = h.service.create_user(new_user("gone@example.com")).await.unwrap();
    h.service.delete_user(created.id).await.unwrap();

    assert!(!h.cache.contains(created.id));
    let err = h.service.get_user(created.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = h.service.delete_user(created.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// List
// =============================================================================

async fn seed(h: &common::Harness, count: usize) {
    for i in 0..count {
        let input = NewUser::new(format!("user{:02}@example.com", i), format!("User {:02}", i));
        h.service.create_user(input).await.unwrap();
    }
}

#[tokio::test]
async fn test_list_page_math() {
    let h = harness().await;
    seed(&h, 41).await;

    let page = h
        .service
        .list_users(UserListFilter {
            page: 3,
            page_size: 20,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 41);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page, 3);
}

#[tokio::test]
async fn test_list_normalises_paging() {
    let h = harness().await;
    seed(&h, 25).await;

    let zero = h
        .service
        .list_users(UserListFilter {
            page: 0,
            page_size: 0,
            ..Default::default()
        })
        .await
        .unwrap();
    let first = h
        .service
        .list_users(UserListFilter {
            page: 1,
            page_size: 20,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(zero, first);
    assert_eq!(zero.page_size, 20);
    assert_eq!(zero.items.len(), 20);

    let huge = h
        .service
        .list_users(UserListFilter {
            page: 1,
            page_size: 500,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(huge.page_size, 200);
    assert_eq!(huge.items.len(), 25);
}

#[tokio::test]
async fn test_list_far_past_last_page_is_empty() {
    let h = harness().await;
    seed(&h, 3).await;

    for page in [i64::MAX, i64::MAX / 10] {
        let result = h
            .service
            .list_users(UserListFilter {
                page,
                page_size: 20,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.total, 3);
        assert_eq!(result.total_pages, 1);
    }
}

#[tokio::test]
async fn test_list_filters_and_orders_by_id() {
    let h = harness().await;
    seed(&h, 12).await;

    let by_name = h
        .service
        .list_users(UserListFilter {
            name_like: Some("User 1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.total, 2);
    assert!(by_name.items.windows(2).all(|w| w[0].id < w[1].id));

    let by_email = h
        .service
        .list_users(UserListFilter {
            email: Some("user03@example.com".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_email.total, 1);
    assert_eq!(by_email.items[0].name, "User 03");
}

#[tokio::test]
async fn test_list_is_not_cached() {
    let h = harness().await;
    seed(&h, 3).await;
    let sets_before = h.cache.sets.load(Ordering::SeqCst);

    h.service.list_users(UserListFilter::default()).await.unwrap();

    assert_eq!(h.cache.sets.load(Ordering::SeqCst), sets_before);
    assert_eq!(InMemoryUserCache::count(&h.cache.gets), 0);
}
