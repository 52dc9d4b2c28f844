//! Yahoo Finance Adapter
//!
//! Implementation of the MarketDataPort over Yahoo's public v7 endpoints.

mod client;
mod greeks;
mod types;

pub use client::{YahooClient, YahooConfig};
pub use greeks::{black_scholes_delta, OptionSide};
