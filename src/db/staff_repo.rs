// src/db/staff_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::staff::{Expense, Staff},
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FUNCIONÁRIOS
    // =========================================================================

    pub async fn create_staff(
        &self,
        vendor_id: Uuid,
        name: &str,
        phone: Option<&str>,
        role: Option<&str>,
        monthly_salary: Decimal,
    ) -> Result<Staff, AppError> {
        let staff = sqlx::query_as::<_, Staff>(
            r#"
            INSERT INTO staff (vendor_id, name, phone, role, monthly_salary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(name)
        .bind(phone)
        .bind(role)
        .bind(monthly_salary)
        .fetch_one(&self.pool)
        .await?;

        Ok(staff)
    }

    pub async fn list_staff(&self, vendor_id: Uuid) -> Result<Vec<Staff>, AppError> {
        let staff = sqlx::query_as::<_, Staff>(
            "SELECT * FROM staff WHERE vendor_id = $1 ORDER BY name ASC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }

    pub async fn find_staff(&self, vendor_id: Uuid, staff_id: Uuid) -> Result<Option<Staff>, AppError> {
        let staff = sqlx::query_as::<_, Staff>(
            "SELECT * FROM staff WHERE vendor_id = $1 AND id = $2",
        )
        .bind(vendor_id)
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub async fn create_expense(
        &self,
        vendor_id: Uuid,
        staff_id: Option<Uuid>,
        category: &str,
        detail: Option<&str>,
        amount: Decimal,
        expense_date: NaiveDate,
    ) -> Result<Expense, AppError> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (vendor_id, staff_id, category, detail, amount, expense_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(staff_id)
        .bind(category)
        .bind(detail)
        .bind(amount)
        .bind(expense_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Despesas no intervalo fechado `[from, to]`.
    pub async fn list_expenses(
        &self,
        vendor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>, AppError> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE vendor_id = $1 AND expense_date BETWEEN $2 AND $3
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .bind(vendor_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }
}
