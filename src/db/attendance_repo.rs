// src/db/attendance_repo.rs

use sqlx::{postgres::PgRow, types::Json, Executor, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        calendar::{DayIndex, MonthYear},
        error::AppError,
    },
    models::attendance::{Addon, DayCode, Delivery, MealCode, ShiftCode, StaffAttendance},
};

/// Tabelas mensais com colunas `day1`..`day31`.
/// Os nomes são constantes e os dias já chegam validados em `DayIndex`,
/// então montar o SQL com `format!` não abre espaço para injeção.
struct SheetTable {
    table: &'static str,
    owner_column: &'static str,
    owner_table: &'static str,
    owner_active: &'static str,
}

const DELIVERIES: SheetTable = SheetTable {
    table: "deliveries",
    owner_column: "customer_id",
    owner_table: "customers",
    owner_active: "o.status = 'active'",
};

const STAFF_ATTENDANCE: SheetTable = SheetTable {
    table: "staff_attendance",
    owner_column: "staff_id",
    owner_table: "staff",
    owner_active: "o.is_active",
};

/// Linha do dia para a tela de marcação diária: dono + código cru (se houver linha no mês).
#[derive(Debug, Clone, FromRow)]
pub struct DayEntry {
    pub owner_id: Uuid,
    pub owner_name: String,
    pub code: Option<String>,
}

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ENTREGAS (clientes)
    // =========================================================================

    /// Busca a linha do mês, criando-a vazia se ainda não existir.
    pub async fn ensure_delivery<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
    ) -> Result<Option<Delivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        ensure_sheet(executor, &DELIVERIES, vendor_id, customer_id, month).await
    }

    pub async fn upsert_delivery_day<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
        day: DayIndex,
        code: MealCode,
    ) -> Result<Option<Delivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        upsert_days(executor, &DELIVERIES, vendor_id, customer_id, month, &[(day, code)]).await
    }

    pub async fn upsert_delivery_days<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
        days: &[(DayIndex, MealCode)],
    ) -> Result<Option<Delivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        upsert_days(executor, &DELIVERIES, vendor_id, customer_id, month, days).await
    }

    /// Todas as linhas do cliente nos meses informados.
    pub async fn deliveries_for_months<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
        months: &[MonthYear],
    ) -> Result<Vec<Delivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let labels: Vec<String> = months.iter().map(MonthYear::to_string).collect();
        let rows = sqlx::query_as::<_, Delivery>(
            r#"
            SELECT * FROM deliveries
            WHERE vendor_id = $1 AND customer_id = $2 AND month_year = ANY($3)
            ORDER BY month_year ASC
            "#,
        )
        .bind(vendor_id)
        .bind(customer_id)
        .bind(labels)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn delivery_day_entries(
        &self,
        vendor_id: Uuid,
        month: MonthYear,
        day: DayIndex,
    ) -> Result<Vec<DayEntry>, AppError> {
        day_entries(&self.pool, &DELIVERIES, vendor_id, month, day).await
    }

    /// Acrescenta um addon ao array JSONB do mês (cria a linha se preciso).
    pub async fn append_addon<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        customer_id: Uuid,
        month: MonthYear,
        addon: &Addon,
    ) -> Result<Option<Delivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let delivery = sqlx::query_as::<_, Delivery>(
            r#"
            INSERT INTO deliveries (vendor_id, customer_id, month_year, addons)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (customer_id, month_year) DO UPDATE
            SET addons = deliveries.addons || EXCLUDED.addons, updated_at = NOW()
            WHERE deliveries.vendor_id = EXCLUDED.vendor_id
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(customer_id)
        .bind(month.to_string())
        .bind(Json(vec![addon]))
        .fetch_optional(executor)
        .await?;

        Ok(delivery)
    }

    // =========================================================================
    //  PRESENÇA (funcionários)
    // =========================================================================

    pub async fn ensure_staff_sheet<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        staff_id: Uuid,
        month: MonthYear,
    ) -> Result<Option<StaffAttendance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        ensure_sheet(executor, &STAFF_ATTENDANCE, vendor_id, staff_id, month).await
    }

    pub async fn upsert_staff_day<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        staff_id: Uuid,
        month: MonthYear,
        day: DayIndex,
        code: ShiftCode,
    ) -> Result<Option<StaffAttendance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        upsert_days(executor, &STAFF_ATTENDANCE, vendor_id, staff_id, month, &[(day, code)]).await
    }

    pub async fn upsert_staff_days<'e, E>(
        &self,
        executor: E,
        vendor_id: Uuid,
        staff_id: Uuid,
        month: MonthYear,
        days: &[(DayIndex, ShiftCode)],
    ) -> Result<Option<StaffAttendance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        upsert_days(executor, &STAFF_ATTENDANCE, vendor_id, staff_id, month, days).await
    }

    pub async fn staff_day_entries(
        &self,
        vendor_id: Uuid,
        month: MonthYear,
        day: DayIndex,
    ) -> Result<Vec<DayEntry>, AppError> {
        day_entries(&self.pool, &STAFF_ATTENDANCE, vendor_id, month, day).await
    }
}

// ---
// Helpers genéricos sobre a largura do código (3 = refeições, 2 = turnos)
// ---

async fn ensure_sheet<'e, E, T>(
    executor: E,
    sheet: &SheetTable,
    vendor_id: Uuid,
    owner_id: Uuid,
    month: MonthYear,
) -> Result<Option<T>, AppError>
where
    E: Executor<'e, Database = Postgres>,
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    // O DO UPDATE "vazio" existe só para o RETURNING devolver a linha já existente.
    let sql = format!(
        "INSERT INTO {table} (vendor_id, {owner}, month_year) VALUES ($1, $2, $3) \
         ON CONFLICT ({owner}, month_year) DO UPDATE SET month_year = EXCLUDED.month_year \
         WHERE {table}.vendor_id = EXCLUDED.vendor_id \
         RETURNING *",
        table = sheet.table,
        owner = sheet.owner_column,
    );

    let row = sqlx::query_as::<_, T>(&sql)
        .bind(vendor_id)
        .bind(owner_id)
        .bind(month.to_string())
        .fetch_optional(executor)
        .await?;

    Ok(row)
}

async fn upsert_days<'e, E, T, const N: usize>(
    executor: E,
    sheet: &SheetTable,
    vendor_id: Uuid,
    owner_id: Uuid,
    month: MonthYear,
    days: &[(DayIndex, DayCode<N>)],
) -> Result<Option<T>, AppError>
where
    E: Executor<'e, Database = Postgres>,
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    if days.is_empty() {
        return ensure_sheet(executor, sheet, vendor_id, owner_id, month).await;
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} (vendor_id, {}, month_year",
        sheet.table, sheet.owner_column
    ));
    for (day, _) in days {
        builder.push(", ").push(day.column());
    }
    builder.push(") VALUES (");
    {
        let mut values = builder.separated(", ");
        values.push_bind(vendor_id);
        values.push_bind(owner_id);
        values.push_bind(month.to_string());
        for (_, code) in days {
            values.push_bind(code.encode());
        }
    }
    builder.push(format!(
        ") ON CONFLICT ({}, month_year) DO UPDATE SET updated_at = NOW()",
        sheet.owner_column
    ));
    for (day, _) in days {
        let column = day.column();
        builder.push(format!(", {column} = EXCLUDED.{column}"));
    }
    builder.push(format!(
        " WHERE {table}.vendor_id = EXCLUDED.vendor_id RETURNING *",
        table = sheet.table
    ));

    let row = builder.build_query_as::<T>().fetch_optional(executor).await?;
    Ok(row)
}

async fn day_entries(
    pool: &PgPool,
    sheet: &SheetTable,
    vendor_id: Uuid,
    month: MonthYear,
    day: DayIndex,
) -> Result<Vec<DayEntry>, AppError> {
    let sql = format!(
        "SELECT o.id AS owner_id, o.name AS owner_name, s.{column} AS code \
         FROM {owners} o \
         LEFT JOIN {table} s ON s.{owner} = o.id AND s.month_year = $2 \
         WHERE o.vendor_id = $1 AND {active} \
         ORDER BY o.name ASC",
        column = day.column(),
        owners = sheet.owner_table,
        table = sheet.table,
        owner = sheet.owner_column,
        active = sheet.owner_active,
    );

    let rows = sqlx::query_as::<_, DayEntry>(&sql)
        .bind(vendor_id)
        .bind(month.to_string())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
