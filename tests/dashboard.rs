use chrono::Utc;
use rust_decimal_macros::dec;

use tiffin_backend::models::{
    billing::{BillItem, BillType, CreateBillPayload, PaymentMode},
    customer::PlanType,
};

#[path = "common/mod.rs"]
mod common;

#[tokio::test]
async fn summary_reflects_open_bills_and_current_month() {
    let Some(ctx) = common::setup().await else { return };
    let state = ctx.state.clone();
    let vendor = ctx.vendor_id;
    let today = Utc::now().date_naive();

    let customer = state
        .customer_service
        .create_customer(vendor, "Diego", None, None, None, PlanType::Random)
        .await
        .unwrap();

    state
        .billing_service
        .create_bill(
            vendor,
            &CreateBillPayload {
                customer_id: customer.id,
                bill_type: BillType::Random,
                bill_date: today,
                due_date: today,
                payment_mode: PaymentMode::Cash,
                discount: None,
                amount_paid: Some(dec!(30.00)),
                payment_date: None,
                note: None,
                start_date: None,
                end_date: None,
                items: Some(vec![BillItem { name: "Marmita".into(), quantity: 2, price: dec!(50.00) }]),
            },
        )
        .await
        .unwrap();

    state
        .staff_service
        .create_expense(vendor, None, "Gás", None, dec!(120.00), today)
        .await
        .unwrap();

    let summary = state.dashboard_service.get_summary(vendor).await.unwrap();
    assert_eq!(summary.active_customers, 1);
    assert_eq!(summary.open_bills, 1);
    assert_eq!(summary.outstanding_amount, dec!(70.00));
    assert_eq!(summary.collected_this_month, dec!(30.00));
    assert_eq!(summary.expenses_this_month, dec!(120.00));

    common::teardown(ctx).await;
}
