/// Database test utilities
///
/// Provides a singleton pool against TEST_DATABASE_URL with embedded
/// migrations applied once, plus a global lock so database tests run
/// serially.
use std::sync::{Arc, Mutex, OnceLock};

use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, Pool};

use yomu::shared::infrastructure::database::Database;

type PgPool = Pool<ConnectionManager<PgConnection>>;

static DB_POOL: OnceLock<Arc<PgPool>> = OnceLock::new();

/// Get or create the singleton database pool for tests
pub fn get_test_db_pool() -> Arc<PgPool> {
    DB_POOL
        .get_or_init(|| {
            dotenvy::dotenv().ok();
            let test_db_url = std::env::var("TEST_DATABASE_URL")
                .expect("TEST_DATABASE_URL must be set in .env for database tests");

            let manager = ConnectionManager::<PgConnection>::new(test_db_url);
            let pool = r2d2::Pool::builder()
                .max_size(10)
                .build(manager)
                .expect("Failed to create test database pool");

            Database::from_pool(pool.clone())
                .run_migrations()
                .expect("Failed to run migrations on the test database");

            Arc::new(pool)
        })
        .clone()
}

/// Clean the jobs table - use at the start of each test
pub fn clean_test_db() {
    let pool = get_test_db_pool();
    let mut conn = pool.get().expect("Failed to get DB connection");

    diesel::sql_query("TRUNCATE TABLE library_jobs")
        .execute(&mut conn)
        .expect("Failed to clean library_jobs");
}

/// Global test mutex for serialization
static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Acquire test lock to ensure database tests run serially
pub fn acquire_test_lock() -> std::sync::MutexGuard<'static, ()> {
    match TEST_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
