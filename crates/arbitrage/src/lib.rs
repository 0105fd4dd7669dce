//! Risk-free arbitrage detection for prediction markets.
//!
//! A binary market's fair Yes/No prices sum to 1. When quoted prices sum to
//! less, buying both sides costs less than the guaranteed $1 payout:
//!
//! ```text
//! Single market:  YES @ $0.40,  NO @ $0.55
//!   Buy both sides:     $0.95
//!   Guaranteed payout:  $1.00
//!   Profit:             $0.05 (5.26%)
//!
//! Cross-exchange (matched markets for the same proposition):
//!   Kalshi YES @ $0.45 + Polymarket NO @ $0.48 = $0.93  ->  7.53%
//! ```
//!
//! # Modules
//!
//! - [`detector`]: per-market and per-match opportunity detection
//! - [`scanner`]: full-catalog scan with snapshot persistence

pub mod detector;
pub mod scanner;

pub use detector::{ArbitrageDetector, DetectorConfig};
pub use scanner::{ArbitrageScanner, ScanReport};
