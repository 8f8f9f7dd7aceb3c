use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use user_registry_api::db::Database;
use user_registry_api::db_storage::{PgUserStore, UserStore};
use user_registry_api::models::NewUser;

/// Integration smoke test for the Postgres user store.
/// Marked ignored to avoid touching a real database by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn pg_store_round_trip_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    let store = PgUserStore::new(db.pool.clone());

    // Use a unique CPF to avoid conflicts on repeated runs.
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let cpf = format!("999{:08}", nanos % 100_000_000);

    let saved = store
        .save(NewUser {
            name: "Test User".to_string(),
            email: "test.user@example.com".to_string(),
            cpf: cpf.clone(),
        })
        .await?;
    assert!(saved.id > 0);

    let found = store
        .find_by_cpf(&cpf)
        .await?
        .ok_or_else(|| anyhow::anyhow!("saved user not found by cpf"))?;
    assert_eq!(found, saved);

    let all = store.find_all().await?;
    assert!(all.iter().any(|u| u.id == saved.id));
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));

    Ok(())
}
