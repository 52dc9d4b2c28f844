//! Short PUT Screener Library
//!
//! Screens equity option chains for cash-secured short PUT candidates and
//! reports the best contracts per ticker to a notification channel.
//!
//! # Modules
//!
//! - `domain`: Value objects (OptionContract, ExpirationChain, EvaluatedContract, TickerOutcome)
//! - `ports`: Trait abstractions (MarketDataPort, NotifierPort, EventSink)
//! - `strategy`: Screening rules (VolatilityGate, ContractScreener, Ranking)
//! - `adapters`: External implementations (Yahoo, Discord, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Ticker analyzer and group orchestrator

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
