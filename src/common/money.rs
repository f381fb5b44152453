// src/common/money.rs

use rust_decimal::Decimal;

use crate::common::error::AppError;

/// Colunas NUMERIC(12, 2) guardam no máximo 10 dígitos inteiros.
pub fn money_limit() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

pub fn within_money_limit(value: Decimal) -> bool {
    value.abs() < money_limit()
}

/// Normaliza um valor monetário para exatamente duas casas decimais.
/// Serializado, sempre sai como "130.00" e nunca "130" ou "130.0".
pub fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

/// Resultado de `checked_add`/`checked_mul`/`checked_sub` já normalizado.
/// Estouro do Decimal ou do limite da coluna vira 400, nunca pânico ou erro do banco.
pub fn checked_money(value: Option<Decimal>) -> Result<Decimal, AppError> {
    match value {
        Some(value) if within_money_limit(value) => Ok(money(value)),
        _ => Err(AppError::bad_request(format!(
            "Valor monetário fora do limite permitido (máximo {})",
            money(money_limit())
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn always_two_fraction_digits() {
        assert_eq!(money(dec!(130)).to_string(), "130.00");
        assert_eq!(money(dec!(12.5)).to_string(), "12.50");
        assert_eq!(money(dec!(0.005)).to_string(), "0.00");
        assert_eq!(money(dec!(-3.456)).to_string(), "-3.46");
    }

    #[test]
    fn checked_money_rejects_overflow_and_column_range() {
        assert_eq!(checked_money(dec!(50).checked_mul(dec!(2))).unwrap().to_string(), "100.00");
        assert_eq!(checked_money(Some(dec!(9999999999.99))).unwrap(), dec!(9999999999.99));

        assert!(matches!(
            checked_money(Decimal::MAX.checked_mul(dec!(10))),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(checked_money(Some(dec!(10000000000))), Err(AppError::BadRequest(_))));
        assert!(matches!(checked_money(Some(dec!(-10000000000))), Err(AppError::BadRequest(_))));
    }
}
