// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AttendanceRepository, BillingRepository, CustomerRepository, DashboardRepository,
        StaffRepository,
    },
    services::{
        attendance_service::AttendanceService, auth::AuthService, billing_service::BillingService,
        customer_service::CustomerService, dashboard_service::DashboardService,
        staff_service::StaffService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Configuração lida do ambiente (e do .env, se existir)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", raw))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_connections,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub attendance_service: AttendanceService,
    pub billing_service: BillingService,
    pub customer_service: CustomerService,
    pub staff_service: StaffService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config.jwt_secret.clone()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let billing_repo = BillingRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let staff_repo = StaffRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        Self {
            auth_service: AuthService::new(jwt_secret),
            attendance_service: AttendanceService::new(
                attendance_repo.clone(),
                customer_repo.clone(),
                staff_repo.clone(),
                db_pool.clone(),
            ),
            billing_service: BillingService::new(
                billing_repo,
                customer_repo.clone(),
                attendance_repo,
                db_pool.clone(),
            ),
            customer_service: CustomerService::new(customer_repo, db_pool.clone()),
            staff_service: StaffService::new(staff_repo),
            dashboard_service: DashboardService::new(dashboard_repo),
            db_pool,
        }
    }
}
