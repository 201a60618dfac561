use super::*;
#[cfg(feature = "live-db-tests")]
use crate::services::test_support::{integration_pool, seed_user};

#[test]
fn lookup_is_found_only_for_found() {
    let found = AdminLookup::Found(AdminRecord { user_id: Uuid::nil(), is_super_admin: false });
    assert!(found.is_found());
    assert!(!AdminLookup::NotFound.is_found());
}

#[test]
fn admin_record_serializes_fields() {
    let record = AdminRecord { user_id: Uuid::nil(), is_super_admin: true };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["user_id"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(json["is_super_admin"], true);
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn count_and_lookup_track_admin_rows() {
    let pool = integration_pool().await;
    let directory = PgAdminDirectory::new(pool.clone());
    assert_eq!(directory.count().await.unwrap(), 0);

    let admin = seed_user(&pool, "u1@site.test", "correctpass").await;
    let other = seed_user(&pool, "u2@site.test", "correctpass").await;
    sqlx::query("INSERT INTO admins (user_id, is_super_admin) VALUES ($1, true)")
        .bind(admin)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(directory.count().await.unwrap(), 1);
    assert_eq!(
        directory.find_by_user_id(admin).await.unwrap(),
        AdminLookup::Found(AdminRecord { user_id: admin, is_super_admin: true })
    );
    assert_eq!(directory.find_by_user_id(other).await.unwrap(), AdminLookup::NotFound);
}
