//! Расчёт цены брони. Чистые функции, без ошибок: диапазон количества билетов
//! проверяет вызывающий код.

use crate::models::Concert;

/// Итог по цене для N билетов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub unit_price: i64,
    pub discount_percent: u32,
    pub discount_amount: i64,
    pub final_unit_price: i64,
    pub ticket_count: u32,
    pub total_price: i64,
}

impl Quote {
    pub fn has_discount(&self) -> bool {
        self.discount_percent > 0
    }

    /// Строка скидки для показа; без скидки строки нет.
    pub fn discount_line(&self) -> Option<String> {
        self.has_discount().then(|| {
            format!(
                "Discount ({}%): -{}",
                self.discount_percent,
                format_price(self.discount_amount)
            )
        })
    }
}

/// Сумма скидки с округлением половины вверх до целой единицы валюты.
pub fn discount_amount(unit_price: i64, discount_percent: u32) -> i64 {
    let percent = i64::from(discount_percent.min(100));
    let scaled = unit_price * percent;
    if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    }
}

pub fn quote(concert: &Concert, ticket_count: u32) -> Quote {
    quote_price(concert.unit_price, concert.discount_percent, ticket_count)
}

/// Итог считается от уже округлённой цены билета: `final_unit_price * ticket_count`.
/// Поэтому при дробной скидке он может отличаться от точного
/// `unit_price * (100 - discount) / 100 * ticket_count` на кратное числу билетов.
pub fn quote_price(unit_price: i64, discount_percent: u32, ticket_count: u32) -> Quote {
    let discount_percent = discount_percent.min(100);
    let discount_amount = discount_amount(unit_price, discount_percent);
    let final_unit_price = unit_price - discount_amount;
    Quote {
        unit_price,
        discount_percent,
        discount_amount,
        final_unit_price,
        ticket_count,
        total_price: final_unit_price * i64::from(ticket_count),
    }
}

/// `Rp 1.500.000`: разделитель тысяч точка.
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}
