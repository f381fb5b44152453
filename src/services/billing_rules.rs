// src/services/billing_rules.rs
//
// Regras de cálculo das faturas, sem acesso ao banco.
// O BillingService busca as linhas, chama estas funções e grava o resultado.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::{
        calendar::DayIndex,
        error::AppError,
        money::{checked_money, money, within_money_limit},
    },
    models::{
        attendance::Delivery,
        billing::{
            BillEstimate, BillItem, BillType, ItemizedBillDetail, MealCounts, PaymentStatus,
            RegularBillDetail,
        },
        customer::{Customer, Plan, PlanType},
    },
};

pub const REGULAR_DUE_DAYS: i64 = 5;
pub const RANDOM_DUE_DAYS: i64 = 7;

// =============================================================================
//  ESTIMATIVA
// =============================================================================

/// Prévia da fatura. Clientes avulsos (ou pedidos de fatura avulsa) recebem
/// só o "esqueleto"; os itens são digitados à mão no formulário.
pub fn estimate(
    customer: &Customer,
    plan: Option<&Plan>,
    bill_type: BillType,
    today: NaiveDate,
) -> Result<BillEstimate, AppError> {
    if customer.plan_type == PlanType::Random || bill_type == BillType::Random {
        return Ok(BillEstimate {
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            bill_date: today,
            due_date: today + Duration::days(RANDOM_DUE_DAYS),
            counts: None,
            start_date: None,
            end_date: None,
            total_tiffins: None,
            price_per_tiffin: None,
            addon_amount: None,
            total_amount: None,
        });
    }

    let plan = plan.ok_or_else(|| {
        AppError::business(format!("Cliente '{}' não possui plano vinculado", customer.name))
    })?;
    let per_meal = tiffins_per_meal(plan)?;

    Ok(BillEstimate {
        customer_id: customer.id,
        customer_name: customer.name.clone(),
        bill_date: today,
        due_date: today + Duration::days(REGULAR_DUE_DAYS),
        counts: Some(MealCounts {
            breakfast: if plan.breakfast { per_meal } else { 0 },
            lunch: if plan.lunch { per_meal } else { 0 },
            dinner: if plan.dinner { per_meal } else { 0 },
        }),
        start_date: Some(today),
        end_date: Some(today + Duration::days(per_meal as i64)),
        total_tiffins: Some(plan.total_tiffins),
        price_per_tiffin: Some(money(plan.price_per_tiffin)),
        addon_amount: Some(money(Decimal::ZERO)),
        total_amount: Some(plan_total(plan)?),
    })
}

/// `floor(total / frequência)`: nunca prometemos mais entregas do que o plano cobre.
fn tiffins_per_meal(plan: &Plan) -> Result<i32, AppError> {
    let frequency = plan.frequency();
    if frequency == 0 {
        return Err(AppError::business(format!(
            "O plano '{}' não inclui nenhuma refeição",
            plan.name
        )));
    }
    Ok(plan.total_tiffins / frequency)
}

pub fn plan_total(plan: &Plan) -> Result<Decimal, AppError> {
    checked_money(plan.price_per_tiffin.checked_mul(Decimal::from(plan.total_tiffins)))
}

// =============================================================================
//  GERAÇÃO
// =============================================================================

/// Detalhe inicial de uma fatura de assinatura. As contagens nascem zeradas;
/// quem as preenche é a reconciliação.
pub fn regular_detail(
    plan: &Plan,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(RegularBillDetail, Decimal), AppError> {
    if end_date < start_date {
        return Err(AppError::business("A data final não pode ser anterior à data inicial"));
    }
    tiffins_per_meal(plan)?;

    let detail = RegularBillDetail {
        start_date,
        end_date,
        counts: MealCounts::default(),
        total_tiffins: plan.total_tiffins,
        price_per_tiffin: money(plan.price_per_tiffin),
        addon_amount: money(Decimal::ZERO),
        previous_addon_amount: money(Decimal::ZERO),
        addon_count: 0,
    };
    Ok((detail, plan_total(plan)?))
}

pub fn itemized_detail(items: &[BillItem]) -> Result<(ItemizedBillDetail, Decimal), AppError> {
    if items.is_empty() {
        return Err(AppError::bad_request("Fatura avulsa precisa de ao menos um item"));
    }

    let mut total = Decimal::ZERO;
    for item in items {
        if item.quantity <= 0 {
            return Err(AppError::bad_request(format!(
                "Quantidade do item '{}' deve ser maior que zero",
                item.name
            )));
        }
        if item.price.is_sign_negative() {
            return Err(AppError::bad_request(format!(
                "Preço do item '{}' não pode ser negativo",
                item.name
            )));
        }
        if !within_money_limit(item.price) {
            return Err(AppError::bad_request(format!(
                "Preço do item '{}' fora do limite permitido",
                item.name
            )));
        }
        let line = Decimal::from(item.quantity).checked_mul(item.price);
        total = checked_money(line.and_then(|line| total.checked_add(line)))?;
    }

    let detail = ItemizedBillDetail {
        items: items
            .iter()
            .map(|item| BillItem {
                name: item.name.clone(),
                quantity: item.quantity,
                price: money(item.price),
            })
            .collect(),
    };
    Ok((detail, total))
}

/// Regra de três faixas usada na criação e em cada pagamento.
pub fn payment_status(total_amount: Decimal, remaining_amount: Decimal) -> PaymentStatus {
    if remaining_amount <= Decimal::ZERO {
        PaymentStatus::Paid
    } else if remaining_amount < total_amount {
        PaymentStatus::PartialPaid
    } else {
        PaymentStatus::Unpaid
    }
}

/// Saldo inicial de uma fatura nova.
pub fn opening_balance(
    total_amount: Decimal,
    amount_paid: Decimal,
    discount: Decimal,
) -> Result<Decimal, AppError> {
    if amount_paid.is_sign_negative() || discount.is_sign_negative() {
        return Err(AppError::bad_request("Valores pagos e descontos não podem ser negativos"));
    }
    if !within_money_limit(amount_paid) || !within_money_limit(discount) {
        return Err(AppError::bad_request("Valores pagos e descontos fora do limite permitido"));
    }
    if amount_paid > total_amount {
        return Err(AppError::business(format!(
            "Valor pago ({}) excede o total da fatura ({})",
            money(amount_paid),
            total_amount
        )));
    }
    checked_money(
        total_amount
            .checked_sub(amount_paid)
            .and_then(|rest| rest.checked_sub(discount)),
    )
}

// =============================================================================
//  PAGAMENTO
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub remaining_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub is_closed: bool,
}

pub fn apply_payment(
    bill_type: BillType,
    total_amount: Decimal,
    remaining_amount: Decimal,
    is_closed: bool,
    amount_paid: Decimal,
) -> Result<PaymentOutcome, AppError> {
    if amount_paid.is_sign_negative() {
        return Err(AppError::bad_request("O valor pago não pode ser negativo"));
    }
    if amount_paid > total_amount {
        return Err(AppError::business(format!(
            "Valor pago ({}) excede o total da fatura ({})",
            money(amount_paid),
            total_amount
        )));
    }

    let remaining = checked_money(remaining_amount.checked_sub(amount_paid))?;

    // Assinatura só fecha pela reconciliação (depende do consumo, não do dinheiro)
    let closes = bill_type == BillType::Random && remaining <= Decimal::ZERO;

    Ok(PaymentOutcome {
        remaining_amount: remaining,
        payment_status: payment_status(total_amount, remaining),
        is_closed: is_closed || closes,
    })
}

// =============================================================================
//  RECONCILIAÇÃO
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub detail: RegularBillDetail,
    pub total_amount: Decimal,
    pub remaining_amount: Decimal,
    pub is_closed: bool,
}

/// Recalcula contagens e addons de uma fatura de assinatura a partir das
/// linhas de entrega de todos os meses do período `[start_date, end_date]`.
/// Só a diferença de addons desde a última rodada entra no total e no saldo.
pub fn reconcile(
    detail: &RegularBillDetail,
    total_amount: Decimal,
    remaining_amount: Decimal,
    deliveries: &[Delivery],
) -> Result<Reconciliation, AppError> {
    let in_range = |date: NaiveDate| date >= detail.start_date && date <= detail.end_date;

    let mut counts = MealCounts::default();
    let mut addon_total = Decimal::ZERO;
    let mut addon_count = 0;

    for delivery in deliveries {
        let month = delivery.month()?;

        for day in DayIndex::all() {
            // dia 31 em mês de 30 dias etc.
            let Some(date) = month.date(day) else { continue };
            if !in_range(date) {
                continue;
            }
            let code = delivery.day(day);
            if code.breakfast().is_present() {
                counts.breakfast += 1;
            }
            if code.lunch().is_present() {
                counts.lunch += 1;
            }
            if code.dinner().is_present() {
                counts.dinner += 1;
            }
        }

        for addon in &delivery.addons {
            let Ok(day) = DayIndex::new(addon.day as i64) else { continue };
            let Some(date) = month.date(day) else { continue };
            if !in_range(date) {
                continue;
            }
            addon_total = addon_total
                .checked_add(addon.amount)
                .ok_or_else(|| AppError::bad_request("Soma dos addons fora do limite permitido"))?;
            if addon.amount > Decimal::ZERO {
                addon_count += 1;
            }
        }
    }

    let addon_total = checked_money(Some(addon_total))?;
    let addon_diff = addon_total - detail.previous_addon_amount;
    let new_total = checked_money(total_amount.checked_add(addon_diff))?;
    let new_remaining = checked_money(remaining_amount.checked_add(addon_diff))?;

    let is_closed = detail.total_tiffins == counts.total() && new_total == total_amount;

    Ok(Reconciliation {
        detail: RegularBillDetail {
            counts,
            addon_amount: addon_total,
            previous_addon_amount: addon_total,
            addon_count,
            ..detail.clone()
        },
        total_amount: new_total,
        remaining_amount: new_remaining,
        is_closed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::calendar::DAYS_PER_SHEET,
        models::{
            attendance::{Addon, MealCode},
            customer::CustomerStatus,
        },
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(meals: (bool, bool, bool), total_tiffins: i32, price: Decimal) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            vendor_id: Uuid::nil(),
            name: "Plano".into(),
            breakfast: meals.0,
            lunch: meals.1,
            dinner: meals.2,
            total_tiffins,
            price_per_tiffin: price,
            created_at: Utc::now(),
        }
    }

    fn customer(plan_type: PlanType) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            vendor_id: Uuid::nil(),
            plan_id: None,
            name: "Ana".into(),
            phone: None,
            address: None,
            plan_type,
            status: CustomerStatus::Active,
            last_bill_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn delivery(month_year: &str, codes: &[(u8, &str)], addons: Vec<Addon>) -> Delivery {
        let mut days = [MealCode::default(); DAYS_PER_SHEET];
        for (day, code) in codes {
            days[*day as usize - 1] = MealCode::parse(code).unwrap();
        }
        Delivery {
            id: Uuid::new_v4(),
            vendor_id: Uuid::nil(),
            customer_id: Uuid::nil(),
            month_year: month_year.into(),
            days,
            addons,
            updated_at: Utc::now(),
        }
    }

    fn addon(day: u8, amount: Decimal) -> Addon {
        Addon { day, amount, detail: None }
    }

    fn detail(start: NaiveDate, end: NaiveDate, total_tiffins: i32) -> RegularBillDetail {
        RegularBillDetail {
            start_date: start,
            end_date: end,
            counts: MealCounts::default(),
            total_tiffins,
            price_per_tiffin: dec!(50.00),
            addon_amount: dec!(0.00),
            previous_addon_amount: dec!(0.00),
            addon_count: 0,
        }
    }

    // --- estimativa ---

    #[test]
    fn regular_estimate_floors_counts_and_formats_total() {
        let today = date(2024, 5, 1);
        let plan = plan((true, true, true), 62, dec!(45.5));
        let estimate = estimate(&customer(PlanType::Regular), Some(&plan), BillType::Regular, today).unwrap();

        let counts = estimate.counts.unwrap();
        assert_eq!(counts, MealCounts { breakfast: 20, lunch: 20, dinner: 20 });
        assert!(counts.total() <= 62);
        assert_eq!(estimate.total_amount.unwrap().to_string(), "2821.00");
        assert_eq!(estimate.start_date, Some(today));
        assert_eq!(estimate.end_date, Some(date(2024, 5, 21)));
        assert_eq!(estimate.due_date, date(2024, 5, 6));
    }

    #[test]
    fn regular_estimate_zeroes_meals_outside_plan() {
        let plan = plan((false, true, false), 30, dec!(80));
        let estimate =
            estimate(&customer(PlanType::Regular), Some(&plan), BillType::Regular, date(2024, 1, 1)).unwrap();
        assert_eq!(estimate.counts.unwrap(), MealCounts { breakfast: 0, lunch: 30, dinner: 0 });
        assert_eq!(estimate.total_amount.unwrap().to_string(), "2400.00");
    }

    #[test]
    fn random_customer_gets_shell_estimate() {
        let today = date(2024, 5, 1);
        let estimate = estimate(&customer(PlanType::Random), None, BillType::Regular, today).unwrap();
        assert_eq!(estimate.due_date, date(2024, 5, 8));
        assert!(estimate.counts.is_none());
        assert!(estimate.total_amount.is_none());
    }

    #[test]
    fn regular_estimate_without_plan_is_rejected() {
        let result = estimate(&customer(PlanType::Regular), None, BillType::Regular, date(2024, 5, 1));
        assert!(matches!(result, Err(AppError::BusinessRule(_))));

        let empty = plan((false, false, false), 30, dec!(10));
        let result = estimate(&customer(PlanType::Regular), Some(&empty), BillType::Regular, date(2024, 5, 1));
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    // --- geração ---

    #[test]
    fn itemized_total_sums_quantity_times_price() {
        let items = vec![
            BillItem { name: "Marmita".into(), quantity: 2, price: dec!(50.00) },
            BillItem { name: "Suco".into(), quantity: 1, price: dec!(30.00) },
        ];
        let (detail, total) = itemized_detail(&items).unwrap();
        assert_eq!(total.to_string(), "130.00");
        assert_eq!(detail.items.len(), 2);
    }

    #[test]
    fn itemized_bill_requires_items() {
        assert!(itemized_detail(&[]).is_err());
        let bad = vec![BillItem { name: "x".into(), quantity: 0, price: dec!(1) }];
        assert!(itemized_detail(&bad).is_err());
    }

    #[test]
    fn itemized_overflow_is_a_bad_request() {
        let huge: Decimal = "79228162514264337593543950335".parse().unwrap();
        let items = vec![BillItem { name: "Marmita".into(), quantity: 10, price: huge }];
        assert!(matches!(itemized_detail(&items), Err(AppError::BadRequest(_))));

        // cabe no Decimal, mas não em NUMERIC(12, 2)
        let items = vec![BillItem { name: "Marmita".into(), quantity: 10, price: dec!(1000000000) }];
        assert!(matches!(itemized_detail(&items), Err(AppError::BadRequest(_))));

        let items = vec![BillItem { name: "Marmita".into(), quantity: 1, price: dec!(100000000000) }];
        assert!(matches!(itemized_detail(&items), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn plan_total_beyond_column_range_is_rejected() {
        let plan = plan((true, true, true), 60, dec!(9000000000));
        assert!(matches!(regular_detail(&plan, date(2024, 5, 1), date(2024, 5, 20)), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn regular_detail_starts_with_zero_counts() {
        let plan = plan((true, false, true), 40, dec!(60));
        let (detail, total) = regular_detail(&plan, date(2024, 5, 1), date(2024, 5, 20)).unwrap();
        assert_eq!(detail.counts.total(), 0);
        assert_eq!(detail.previous_addon_amount, Decimal::ZERO);
        assert_eq!(total.to_string(), "2400.00");
        assert!(regular_detail(&plan, date(2024, 5, 20), date(2024, 5, 1)).is_err());
    }

    #[test]
    fn opening_balance_rules() {
        assert_eq!(opening_balance(dec!(130), dec!(30), dec!(10)).unwrap(), dec!(90.00));
        assert!(matches!(opening_balance(dec!(130), dec!(131), dec!(0)), Err(AppError::BusinessRule(_))));
        assert!(matches!(opening_balance(dec!(130), dec!(-1), dec!(0)), Err(AppError::BadRequest(_))));
        assert!(matches!(
            opening_balance(dec!(130), dec!(0), dec!(10000000000)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(opening_balance(dec!(130), dec!(0), Decimal::MAX), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn three_tier_payment_status() {
        assert_eq!(payment_status(dec!(100), dec!(0)), PaymentStatus::Paid);
        assert_eq!(payment_status(dec!(100), dec!(-5)), PaymentStatus::Paid);
        assert_eq!(payment_status(dec!(100), dec!(40)), PaymentStatus::PartialPaid);
        assert_eq!(payment_status(dec!(100), dec!(100)), PaymentStatus::Unpaid);
    }

    // --- pagamento ---

    #[test]
    fn paying_full_total_closes_itemized_bill() {
        let outcome = apply_payment(BillType::Random, dec!(130.00), dec!(130.00), false, dec!(130.00)).unwrap();
        assert_eq!(outcome.payment_status, PaymentStatus::Paid);
        assert!(outcome.is_closed);
        assert_eq!(outcome.remaining_amount.to_string(), "0.00");
    }

    #[test]
    fn paying_full_total_does_not_close_regular_bill() {
        let outcome = apply_payment(BillType::Regular, dec!(3000.00), dec!(3000.00), false, dec!(3000.00)).unwrap();
        assert_eq!(outcome.payment_status, PaymentStatus::Paid);
        assert!(!outcome.is_closed);
    }

    #[test]
    fn payment_validation() {
        assert!(matches!(
            apply_payment(BillType::Random, dec!(100), dec!(100), false, dec!(-1)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            apply_payment(BillType::Random, dec!(100), dec!(100), false, dec!(100.01)),
            Err(AppError::BusinessRule(_))
        ));
        let partial = apply_payment(BillType::Random, dec!(100), dec!(100), false, dec!(25)).unwrap();
        assert_eq!(partial.payment_status, PaymentStatus::PartialPaid);
        assert!(!partial.is_closed);
    }

    // --- reconciliação ---

    #[test]
    fn counts_only_days_inside_bill_range() {
        let detail = detail(date(2024, 5, 10), date(2024, 5, 12), 9);
        let rows = vec![delivery(
            "2024-05",
            &[(9, "PPP"), (10, "PAP"), (11, "PPA"), (12, "HPP"), (13, "PPP")],
            vec![],
        )];
        let result = reconcile(&detail, dec!(450.00), dec!(450.00), &rows).unwrap();
        assert_eq!(result.detail.counts, MealCounts { breakfast: 2, lunch: 2, dinner: 2 });
        assert_eq!(result.total_amount, dec!(450.00));
        assert!(!result.is_closed);
    }

    #[test]
    fn spans_every_month_of_the_bill() {
        let detail = detail(date(2024, 4, 29), date(2024, 5, 2), 4);
        let rows = vec![
            // 31/04 não existe e deve ser ignorado
            delivery("2024-04", &[(29, "APA"), (30, "APA"), (31, "PPP")], vec![]),
            delivery("2024-05", &[(1, "APA"), (2, "APA")], vec![]),
        ];
        let result = reconcile(&detail, dec!(200.00), dec!(0.00), &rows).unwrap();
        assert_eq!(result.detail.counts.lunch, 4);
        assert_eq!(result.detail.counts.total(), 4);
        assert!(result.is_closed);
    }

    #[test]
    fn new_addon_flows_into_total_and_remaining() {
        let detail = detail(date(2024, 5, 1), date(2024, 5, 31), 60);
        let rows = vec![delivery("2024-05", &[], vec![addon(15, dec!(100.00))])];

        let result = reconcile(&detail, dec!(3000.00), dec!(1000.00), &rows).unwrap();
        assert_eq!(result.total_amount, dec!(3100.00));
        assert_eq!(result.remaining_amount, dec!(1100.00));
        assert_eq!(result.detail.previous_addon_amount.to_string(), "100.00");
        assert_eq!(result.detail.addon_amount.to_string(), "100.00");
        assert_eq!(result.detail.addon_count, 1);
        assert!(!result.is_closed);
    }

    #[test]
    fn addon_sum_overflow_is_a_bad_request() {
        let detail = detail(date(2024, 5, 1), date(2024, 5, 31), 60);
        let rows = vec![delivery(
            "2024-05",
            &[],
            vec![addon(1, Decimal::MAX), addon(2, Decimal::MAX)],
        )];
        assert!(matches!(
            reconcile(&detail, dec!(3000.00), dec!(3000.00), &rows),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn reconciling_twice_is_idempotent() {
        let detail = detail(date(2024, 5, 1), date(2024, 5, 31), 60);
        let rows = vec![delivery(
            "2024-05",
            &[(1, "PPP"), (2, "PPA")],
            vec![addon(2, dec!(40.00)), addon(40, dec!(999))],
        )];

        let first = reconcile(&detail, dec!(3000.00), dec!(3000.00), &rows).unwrap();
        let second = reconcile(&first.detail, first.total_amount, first.remaining_amount, &rows).unwrap();

        assert_eq!(second.total_amount, first.total_amount);
        assert_eq!(second.remaining_amount, first.remaining_amount);
        assert_eq!(second.detail.counts, first.detail.counts);
        assert_eq!(second.detail.previous_addon_amount, first.detail.previous_addon_amount);
    }

    #[test]
    fn closes_when_all_tiffins_delivered_without_pending_addons() {
        let detail = detail(date(2024, 5, 1), date(2024, 5, 2), 6);
        let rows = vec![delivery("2024-05", &[(1, "PPP"), (2, "PPP")], vec![])];
        let result = reconcile(&detail, dec!(300.00), dec!(0.00), &rows).unwrap();
        assert!(result.is_closed);

        // mesmo consumo, mas com addon novo: fica aberta até a próxima rodada
        let rows = vec![delivery("2024-05", &[(1, "PPP"), (2, "PPP")], vec![addon(1, dec!(20))])];
        let result = reconcile(&detail, dec!(300.00), dec!(0.00), &rows).unwrap();
        assert!(!result.is_closed);
        let again = reconcile(&result.detail, result.total_amount, result.remaining_amount, &rows).unwrap();
        assert!(again.is_closed);
    }
}
