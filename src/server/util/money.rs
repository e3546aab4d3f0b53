use rust_decimal::Decimal;

/// amounts are kept and shown with two decimal places
pub(crate) const MONEY_SCALE: u32 = 2;

/// render an amount as `0.00`
pub(crate) fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(MONEY_SCALE))
}
