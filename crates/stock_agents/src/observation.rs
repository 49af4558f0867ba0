//! Observations of a single investor, as reported by the market simulator.
//!
//! An [`Observation`] is produced once per simulated step and per investor. It
//! carries the investor's balance sheet together with the current quotes of
//! the stock it trades. Field names on the wire follow the simulator's
//! camel-case convention (`shareHolding`, `bidPrice`, `askPrice`, `isZombie`).
//!
//! ## Example
//!
//! ```
//! use stock_agents::Observation;
//!
//! let obs = Observation::new(1_000, 200, 10, 48, 50);
//! assert_eq!(obs.net_worth(), 800);
//! assert_eq!(obs.liquidation_value(), 1_480);
//! assert!(!obs.is_insolvent());
//! ```

use serde::{Deserialize, Serialize};

/// One immutable snapshot of an investor and its market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Current bank deposit. May be negative.
    pub deposit: i64,
    /// Current outstanding debt.
    pub debt: i64,
    /// Number of shares currently held.
    pub share_holding: i64,
    /// Best bid on the market.
    pub bid_price: i64,
    /// Best ask on the market.
    pub ask_price: i64,
    /// `true` once the simulator has liquidated the investor; this is the
    /// final observation of the episode.
    #[serde(default)]
    pub is_zombie: bool,
}

impl Observation {
    /// Creates a live (non-terminal) observation.
    pub fn new(deposit: i64, debt: i64, share_holding: i64, bid_price: i64, ask_price: i64) -> Self {
        Self {
            deposit,
            debt,
            share_holding,
            bid_price,
            ask_price,
            is_zombie: false,
        }
    }

    /// Marks this observation as terminal.
    pub fn zombie(mut self) -> Self {
        self.is_zombie = true;
        self
    }

    /// Deposit minus debt.
    pub fn net_worth(&self) -> i64 {
        self.deposit.saturating_sub(self.debt)
    }

    /// Value of the stock position at the current bid.
    pub fn stock_value(&self) -> i64 {
        self.bid_price.saturating_mul(self.share_holding)
    }

    /// Cash plus the stock position sold at the bid.
    pub fn liquidation_value(&self) -> i64 {
        self.deposit.saturating_add(self.stock_value())
    }

    /// Liabilities meet or exceed everything the investor could raise.
    pub fn is_insolvent(&self) -> bool {
        self.debt >= self.liquidation_value()
    }
}
