// src/db/customer_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{Customer, CustomerStatus, Plan, PlanType},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PLANOS
    // =========================================================================

    pub async fn create_plan(
        &self,
        vendor_id: Uuid,
        name: &str,
        meals: (bool, bool, bool),
        total_tiffins: i32,
        price_per_tiffin: Decimal,
    ) -> Result<Plan, AppError> {
        let (breakfast, lunch, dinner) = meals;
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            INSERT INTO plans (vendor_id, name, breakfast, lunch, dinner, total_tiffins, price_per_tiffin)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(name)
        .bind(breakfast)
        .bind(lunch)
        .bind(dinner)
        .bind(total_tiffins)
        .bind(price_per_tiffin)
        .fetch_one(&self.pool)
        .await?;

        Ok(plan)
    }

    pub async fn list_plans(&self, vendor_id: Uuid) -> Result<Vec<Plan>, AppError> {
        let plans = sqlx::query_as::<_, Plan>(
            "SELECT * FROM plans WHERE vendor_id = $1 ORDER BY name ASC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    pub async fn find_plan<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Option<Plan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, Plan>(
            "SELECT * FROM plans WHERE vendor_id = $1 AND id = $2",
        )
        .bind(vendor_id)
        .bind(plan_id)
        .fetch_optional(executor)
        .await?;

        Ok(plan)
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_customer(
        &self,
        vendor_id: Uuid,
        name: &str,
        phone: Option<&str>,
        address: Option<&str>,
        plan_id: Option<Uuid>,
        plan_type: PlanType,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (vendor_id, name, phone, address, plan_id, plan_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(name)
        .bind(phone)
        .bind(address)
        .bind(plan_id)
        .bind(plan_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list_customers(
        &self,
        vendor_id: Uuid,
        status: Option<CustomerStatus>,
    ) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE vendor_id = $1 AND ($2::customer_status IS NULL OR status = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(vendor_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn find_customer<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE vendor_id = $1 AND id = $2",
        )
        .bind(vendor_id)
        .bind(customer_id)
        .fetch_optional(executor)
        .await?;

        Ok(customer)
    }

    pub async fn update_status(
        &self,
        vendor_id: Uuid,
        customer_id: Uuid,
        status: CustomerStatus,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET status = $3, updated_at = NOW()
            WHERE vendor_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(customer_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn set_last_bill_date<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
        last_bill_date: Option<NaiveDate>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE customers SET last_bill_date = $3, updated_at = NOW()
            WHERE vendor_id = $1 AND id = $2
            "#,
        )
        .bind(vendor_id)
        .bind(customer_id)
        .bind(last_bill_date)
        .execute(executor)
        .await?;

        Ok(())
    }
}
