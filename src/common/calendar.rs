// src/common/calendar.rs

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};

use crate::common::error::AppError;

/// Quantidade fixa de colunas de dia (`day1`..`day31`) em cada linha mensal.
pub const DAYS_PER_SHEET: usize = 31;

/// Mês de referência no formato `YYYY-MM`, chave das linhas de entrega/presença.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::bad_request(format!("Mês inválido: {}", month)));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year/month já foram validados na construção
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        match first.checked_add_months(Months::new(1)) {
            Some(next) => (next - first).num_days() as u32,
            None => 31,
        }
    }

    /// Data civil do dia `day` neste mês; `None` quando o dia não existe (ex: 31/04).
    pub fn date(&self, day: DayIndex) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day.get() as u32)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Todos os meses tocados pelo intervalo fechado `[start, end]`.
    pub fn span(start: NaiveDate, end: NaiveDate) -> Vec<MonthYear> {
        let last = MonthYear::of(end);
        let mut current = MonthYear::of(start);
        let mut months = Vec::new();
        while current <= last {
            months.push(current);
            current = current.next();
        }
        months
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthYear {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::bad_request(format!("monthYear inválido '{}', use YYYY-MM", s));

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthYear::new(year, month).map_err(|_| invalid())
    }
}

/// Índice de dia do mês, sempre em `[1, 31]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayIndex(u8);

impl DayIndex {
    pub fn new(day: i64) -> Result<Self, AppError> {
        if (1..=DAYS_PER_SHEET as i64).contains(&day) {
            Ok(Self(day as u8))
        } else {
            Err(AppError::bad_request(format!(
                "Dia {} fora do intervalo permitido (1-31)",
                day
            )))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Posição no array do mês (0-based).
    pub fn slot(&self) -> usize {
        self.0 as usize - 1
    }

    /// Nome da coluna no banco (`day1`..`day31`).
    pub fn column(&self) -> String {
        format!("day{}", self.0)
    }

    /// Aceita tanto o nome da coluna (`day12`) quanto o número puro (`12`).
    pub fn parse_field(field: &str) -> Result<Self, AppError> {
        let digits = field.strip_prefix("day").unwrap_or(field);
        let day: i64 = digits
            .parse()
            .map_err(|_| AppError::bad_request(format!("Campo de dia inválido: '{}'", field)))?;
        DayIndex::new(day)
    }

    pub fn all() -> impl Iterator<Item = DayIndex> {
        (1..=DAYS_PER_SHEET as u8).map(DayIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_and_formats_month_year() {
        let month: MonthYear = "2024-02".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 2);
        assert_eq!(month.to_string(), "2024-02");
        assert_eq!(month.days_in_month(), 29);
    }

    #[test]
    fn rejects_malformed_month_year() {
        for raw in ["2024-13", "2024-2", "24-02", "2024/02", "abcd-ef", ""] {
            assert!(raw.parse::<MonthYear>().is_err(), "{raw} deveria falhar");
        }
    }

    #[test]
    fn day_index_bounds() {
        assert!(DayIndex::new(0).is_err());
        assert!(DayIndex::new(32).is_err());
        assert_eq!(DayIndex::new(31).unwrap().column(), "day31");
        assert_eq!(DayIndex::parse_field("day7").unwrap().get(), 7);
        assert_eq!(DayIndex::parse_field("15").unwrap().get(), 15);
        assert!(DayIndex::parse_field("dayX").is_err());
    }

    #[test]
    fn invalid_calendar_day_has_no_date() {
        let april: MonthYear = "2024-04".parse().unwrap();
        assert_eq!(april.date(DayIndex::new(31).unwrap()), None);
        assert_eq!(april.date(DayIndex::new(30).unwrap()), Some(date(2024, 4, 30)));
    }

    #[test]
    fn span_crosses_year_boundary() {
        let months = MonthYear::span(date(2024, 11, 20), date(2025, 1, 5));
        let labels: Vec<String> = months.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["2024-11", "2024-12", "2025-01"]);
    }
}
