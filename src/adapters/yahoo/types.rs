//! Yahoo Finance v7 response types

use serde::Deserialize;

use crate::domain::OptionContract;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote_response: QuoteResult,
}

#[derive(Debug, Deserialize)]
pub struct QuoteResult {
    #[serde(default)]
    pub result: Vec<QuoteData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    #[serde(default)]
    pub symbol: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    #[serde(rename = "averageDailyVolume3Month")]
    pub average_daily_volume_3_month: Option<f64>,
    pub average_daily_volume_10_day: Option<f64>,
}

impl QuoteData {
    /// Market price, falling back to the previous close, then zero
    pub fn price(&self) -> f64 {
        self.regular_market_price
            .or(self.regular_market_previous_close)
            .unwrap_or(0.0)
    }

    pub fn average_volume(&self) -> u64 {
        self.average_daily_volume_3_month
            .or(self.average_daily_volume_10_day)
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub option_chain: OptionChainResult,
}

#[derive(Debug, Deserialize)]
pub struct OptionChainResult {
    #[serde(default)]
    pub result: Vec<OptionChainData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainData {
    #[serde(default)]
    pub expiration_dates: Vec<i64>,
    #[serde(default)]
    pub quote: QuoteData,
    #[serde(default)]
    pub options: Vec<OptionsBlock>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionsBlock {
    #[serde(default)]
    pub calls: Vec<OptionData>,
    #[serde(default)]
    pub puts: Vec<OptionData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionData {
    pub contract_symbol: Option<String>,
    pub strike: Option<f64>,
    pub bid: Option<f64>,
    pub last_price: Option<f64>,
    pub volume: Option<i64>,
    pub open_interest: Option<i64>,
    pub implied_volatility: Option<f64>,
    // Greeks (rarely present)
    pub delta: Option<f64>,
}

impl OptionData {
    /// Convert to a domain contract; rows without a strike are dropped
    pub fn to_contract(&self) -> Option<OptionContract> {
        let strike = self.strike?;
        let mut contract = OptionContract::new(strike)
            .with_quote(self.bid.unwrap_or(0.0), self.last_price.unwrap_or(0.0))
            .with_liquidity(non_negative(self.volume), non_negative(self.open_interest))
            .with_iv(self.implied_volatility.unwrap_or(0.0));
        contract.delta = self.delta;
        Some(contract)
    }
}

fn non_negative(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}
