// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Billing ---
        handlers::billing::estimate_bill,
        handlers::billing::create_bill,
        handlers::billing::list_bills,
        handlers::billing::get_bill,
        handlers::billing::update_bill,
        handlers::billing::refresh_bill,
        handlers::billing::delete_bill,
        handlers::billing::list_payments,

        // --- Deliveries ---
        handlers::attendance::get_daily_deliveries,
        handlers::attendance::update_daily_deliveries,
        handlers::attendance::get_month_deliveries,
        handlers::attendance::update_month_deliveries,
        handlers::attendance::add_delivery_addon,

        // --- Staff ---
        handlers::staff::create_staff,
        handlers::staff::list_staff,
        handlers::attendance::get_daily_attendance,
        handlers::attendance::update_daily_attendance,
        handlers::attendance::get_month_attendance,
        handlers::attendance::update_month_attendance,

        // --- Expenses ---
        handlers::staff::create_expense,
        handlers::staff::list_expenses,

        // --- Customers ---
        handlers::customers::create_plan,
        handlers::customers::list_plans,
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer_status,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Billing ---
            models::billing::BillType,
            models::billing::PaymentStatus,
            models::billing::PaymentMode,
            models::billing::MealCounts,
            models::billing::RegularBillDetail,
            models::billing::BillItem,
            models::billing::ItemizedBillDetail,
            models::billing::BillDetail,
            models::billing::Bill,
            models::billing::Payment,
            models::billing::BillEstimate,
            models::billing::CreateBillPayload,
            models::billing::UpdateBillPayload,

            // --- Attendance ---
            models::attendance::SlotStatus,
            models::attendance::Addon,
            models::attendance::MealDayView,
            models::attendance::ShiftDayView,
            models::attendance::MonthSheet,
            models::attendance::SheetDay,
            models::attendance::BatchFailure,
            handlers::attendance::DailyDeliveryRecord,
            handlers::attendance::UpdateDailyDeliveriesPayload,
            handlers::attendance::UpdateMonthDeliveriesPayload,
            handlers::attendance::AddAddonPayload,
            handlers::attendance::DailyAttendanceRecord,
            handlers::attendance::UpdateDailyAttendancePayload,
            handlers::attendance::UpdateMonthAttendancePayload,

            // --- Customers ---
            models::customer::PlanType,
            models::customer::CustomerStatus,
            models::customer::Plan,
            models::customer::Customer,
            handlers::customers::CreatePlanPayload,
            handlers::customers::CreateCustomerPayload,
            handlers::customers::UpdateCustomerStatusPayload,

            // --- Staff ---
            models::staff::Staff,
            models::staff::Expense,
            handlers::staff::CreateStaffPayload,
            handlers::staff::CreateExpensePayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Billing", description = "Faturas, pagamentos e reconciliação"),
        (name = "Deliveries", description = "Marcação diária e mensal de entregas"),
        (name = "Customers", description = "Planos e clientes"),
        (name = "Staff", description = "Funcionários e presença"),
        (name = "Expenses", description = "Despesas do fornecedor"),
        (name = "Dashboard", description = "Indicadores do mês")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
