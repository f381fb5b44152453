#![allow(dead_code)]

use std::{
    env,
    sync::{Mutex, MutexGuard, OnceLock},
    time::Duration,
};

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use tiffin_backend::{config::AppState, db};

/// Testes que escrevem no banco rodam um de cada vez.
static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestContext {
    pub state: AppState,
    pub vendor_id: Uuid,
    _guard: MutexGuard<'static, ()>,
}

/// Conecta em `DATABASE_URL`, roda as migrações e cria um fornecedor novo.
/// Devolve `None` (teste ignorado) quando não há banco disponível.
pub async fn setup() -> Option<TestContext> {
    let guard = TEST_DB_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("Skipping test; DATABASE_URL not set");
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping test; cannot connect to Postgres: {err:?}");
            return None;
        }
    };

    if let Err(err) = db::run_migrations(&pool).await {
        eprintln!("Skipping test; migrations failed: {err:?}");
        return None;
    }

    let vendor_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO vendors (name) VALUES ('Marmitaria de Teste') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("failed to create test vendor");

    Some(TestContext {
        state: AppState::from_pool(pool, "segredo-de-teste".to_string()),
        vendor_id,
        _guard: guard,
    })
}

/// Apaga o fornecedor; tudo o que é dele cai em cascata.
pub async fn teardown(ctx: TestContext) {
    let _ = sqlx::query("DELETE FROM vendors WHERE id = $1")
        .bind(ctx.vendor_id)
        .execute(&ctx.state.db_pool)
        .await;
}
