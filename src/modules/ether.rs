//! Ether amounts and their USD equivalent

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::U256;
use anyhow::{Context, Result};

use crate::domain::abi::is_plain_number;

/// Decimals kept when showing or typing USD
pub const MAX_DECIMALS_USD: usize = 2;

fn price_in_use(usd_mode: bool, price: f64) -> Option<f64> {
    (usd_mode && price > 0.0).then_some(price)
}

/// Text to show for an ether amount; USD is rounded to cents. Unparseable
/// input is shown as typed.
pub fn ether_to_display(usd_mode: bool, ether: &str, price: f64) -> String {
    let Some(price) = price_in_use(usd_mode, price) else {
        return ether.to_string();
    };
    match ether.trim().parse::<f64>() {
        Ok(value) => {
            let scale = 10f64.powi(MAX_DECIMALS_USD as i32);
            ((value * price * scale).round() / scale).to_string()
        }
        Err(_) => ether.to_string(),
    }
}

/// Ether amount for what the user typed, which is USD in USD mode
pub fn display_to_ether(usd_mode: bool, display: &str, price: f64) -> String {
    let Some(price) = price_in_use(usd_mode, price) else {
        return display.to_string();
    };
    match display.trim().parse::<f64>() {
        Ok(value) => (value / price).to_string(),
        Err(_) => display.to_string(),
    }
}

/// Whether the amount field accepts `value` as the user's next edit. A trailing
/// `.` or a lone `-` is accepted while typing.
pub fn accept_amount_input(usd_mode: bool, value: &str) -> bool {
    if value.is_empty() || value == "-" {
        return true;
    }
    let complete = value.strip_suffix('.').unwrap_or(value);
    if !is_plain_number(complete, true) {
        return false;
    }
    if usd_mode {
        if let Some((_, decimals)) = value.split_once('.') {
            return decimals.len() <= MAX_DECIMALS_USD;
        }
    }
    true
}

/// Parse an ether amount such as "0.5" into wei
pub fn ether_to_wei(amount: &str) -> Result<U256> {
    parse_ether(amount.trim()).with_context(|| format!("'{}' is not an ether amount", amount))
}

/// A balance in ETH with four decimals, or in USD when a price is given
pub fn format_balance(wei: U256, usd_price: Option<f64>) -> String {
    let ether: f64 = format_ether(wei).parse().unwrap_or(0.0);
    match usd_price.filter(|p| *p > 0.0) {
        Some(price) => format!("${:.2}", ether * price),
        None => format!("{:.4} ETH", ether),
    }
}
