use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use tiffin_backend::{
    common::{calendar::DayIndex, error::AppError},
    models::{
        attendance::{MealCode, ShiftCode, SlotStatus},
        customer::{CustomerStatus, PlanType},
    },
};

#[path = "common/mod.rs"]
mod common;

#[tokio::test]
async fn daily_batch_reports_partial_failures() {
    let Some(ctx) = common::setup().await else { return };
    let state = ctx.state.clone();
    let vendor = ctx.vendor_id;

    let ana = state
        .customer_service
        .create_customer(vendor, "Ana", None, None, None, PlanType::Random)
        .await
        .unwrap();
    let bruno = state
        .customer_service
        .create_customer(vendor, "Bruno", None, None, None, PlanType::Random)
        .await
        .unwrap();
    let stranger = Uuid::new_v4();

    let month = "2024-05".parse().unwrap();
    let day = DayIndex::new(12).unwrap();
    let lunch_only = MealCode::new([SlotStatus::Absent, SlotStatus::Present, SlotStatus::Absent]);

    let outcome = state
        .attendance_service
        .update_daily_deliveries(vendor, month, day, &[(ana.id, lunch_only), (stranger, lunch_only)])
        .await
        .unwrap();
    assert_eq!(outcome.succeeded.len(), 1);
    assert_eq!(outcome.succeeded[0].customer_id, ana.id);
    assert_eq!(outcome.succeeded[0].lunch, SlotStatus::Present);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, stranger);

    // Bruno não tem linha no mês: aparece como tudo ausente
    let views = state
        .attendance_service
        .get_daily_deliveries(vendor, month, day)
        .await
        .unwrap();
    assert_eq!(views.len(), 2);
    let ana_view = views.iter().find(|v| v.customer_id == ana.id).unwrap();
    assert_eq!(ana_view.lunch, SlotStatus::Present);
    assert_eq!(ana_view.dinner, SlotStatus::Absent);
    let bruno_view = views.iter().find(|v| v.customer_id == bruno.id).unwrap();
    assert_eq!(
        (bruno_view.breakfast, bruno_view.lunch, bruno_view.dinner),
        (SlotStatus::Absent, SlotStatus::Absent, SlotStatus::Absent)
    );

    // Cliente inativo some da tela diária
    state
        .customer_service
        .update_customer_status(vendor, bruno.id, CustomerStatus::Inactive)
        .await
        .unwrap();
    let views = state
        .attendance_service
        .get_daily_deliveries(vendor, month, day)
        .await
        .unwrap();
    assert_eq!(views.len(), 1);

    common::teardown(ctx).await;
}

#[tokio::test]
async fn month_sheet_only_exposes_real_days() {
    let Some(ctx) = common::setup().await else { return };
    let state = ctx.state.clone();
    let vendor = ctx.vendor_id;

    let customer = state
        .customer_service
        .create_customer(vendor, "Carla", None, None, None, PlanType::Random)
        .await
        .unwrap();

    // Primeira leitura cria a linha vazia
    let february = state
        .attendance_service
        .get_month_deliveries(vendor, customer.id, "2024-02".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(february.days.len(), 29);
    assert!(february.days.iter().all(|d| d.code == "AAA"));
    assert_eq!(february.days[28].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

    // Dia 31 de abril é gravável, mas não aparece na leitura
    let records: HashMap<String, String> = [("day30", "PPP"), ("day31", "PPP")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let april = state
        .attendance_service
        .update_month_deliveries(vendor, customer.id, "2024-04".parse().unwrap(), &records)
        .await
        .unwrap();
    assert_eq!(april.days.len(), 30);
    assert_eq!(april.days[29].code, "PPP");

    // Código inválido não grava nada
    let bad: HashMap<String, String> = [("day1", "PPP"), ("day2", "PX")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let result = state
        .attendance_service
        .update_month_deliveries(vendor, customer.id, "2024-04".parse().unwrap(), &bad)
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    let april = state
        .attendance_service
        .get_month_deliveries(vendor, customer.id, "2024-04".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(april.days[0].code, "AAA");

    common::teardown(ctx).await;
}

#[tokio::test]
async fn staff_attendance_and_expenses() {
    let Some(ctx) = common::setup().await else { return };
    let state = ctx.state.clone();
    let vendor = ctx.vendor_id;

    let staff = state
        .staff_service
        .create_staff(vendor, "Carlos", None, Some("Entregador"), dec!(12000))
        .await
        .unwrap();
    assert_eq!(staff.monthly_salary.to_string(), "12000.00");

    let month = "2024-05".parse().unwrap();
    let day = DayIndex::new(3).unwrap();
    let outcome = state
        .attendance_service
        .update_daily_attendance(
            vendor,
            month,
            day,
            &[(staff.id, ShiftCode::new([SlotStatus::Present, SlotStatus::Leave]))],
        )
        .await
        .unwrap();
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.succeeded[0].evening, SlotStatus::Leave);

    let sheet = state
        .attendance_service
        .get_month_attendance(vendor, staff.id, month)
        .await
        .unwrap();
    assert_eq!(sheet.days.len(), 31);
    assert_eq!(sheet.days[2].code, "PL");
    assert!(sheet.addons.is_empty());

    // Folha mensal: só os dias enviados mudam
    let records: HashMap<String, String> = [("day1", "PP"), ("day2", "HA")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let sheet = state
        .attendance_service
        .update_month_attendance(vendor, staff.id, month, &records)
        .await
        .unwrap();
    assert_eq!(sheet.days[0].code, "PP");
    assert_eq!(sheet.days[1].code, "HA");
    assert_eq!(sheet.days[2].code, "PL");

    // Código de refeição (3 letras) não serve para turno; nada é gravado
    let bad: HashMap<String, String> = [("day4", "PP"), ("day5", "PPP")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let result = state
        .attendance_service
        .update_month_attendance(vendor, staff.id, month, &bad)
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    let sheet = state
        .attendance_service
        .get_month_attendance(vendor, staff.id, month)
        .await
        .unwrap();
    assert_eq!(sheet.days[3].code, "AA");
    assert_eq!(sheet.days[4].code, "AA");
    assert_eq!(sheet.days[0].code, "PP");

    let may_10 = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    state
        .staff_service
        .create_expense(vendor, Some(staff.id), "Salário", None, dec!(12000), may_10)
        .await
        .unwrap();
    state
        .staff_service
        .create_expense(vendor, None, "Mercado", Some("Arroz"), dec!(750.50), may_10)
        .await
        .unwrap();

    let result = state
        .staff_service
        .create_expense(vendor, Some(Uuid::new_v4()), "Salário", None, dec!(1), may_10)
        .await;
    assert!(matches!(result, Err(AppError::ResourceNotFound(_))));

    let expenses = state.staff_service.list_expenses(vendor, month).await.unwrap();
    assert_eq!(expenses.len(), 2);
    let june = state
        .staff_service
        .list_expenses(vendor, "2024-06".parse().unwrap())
        .await
        .unwrap();
    assert!(june.is_empty());

    common::teardown(ctx).await;
}
