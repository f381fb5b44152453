// src/services/dashboard_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{calendar::MonthYear, error::AppError},
    db::DashboardRepository,
    models::dashboard::DashboardSummary,
    services::staff_service::month_bounds,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    /// Números do mês corrente (UTC).
    pub async fn get_summary(&self, vendor_id: Uuid) -> Result<DashboardSummary, AppError> {
        let (month_start, month_end) = month_bounds(MonthYear::of(Utc::now().date_naive()));
        self.repo.get_summary(vendor_id, month_start, month_end).await
    }
}
