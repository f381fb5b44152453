pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod billing_repo;
pub use billing_repo::BillingRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod staff_repo;
pub use staff_repo::StaffRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;

use sqlx::PgPool;

/// Roda as migrações embutidas em `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
