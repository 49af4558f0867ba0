//! The closed set of trading actions an investor can take.
//!
//! The labels are part of the contract with the market simulator, which maps
//! each one onto an order or a loan request. Adding a variant is a breaking
//! change on both sides.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading action returned to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Sell part of the stock position.
    SellShares,
    /// Sell the whole position.
    Liquidate,
    /// Place a bid for shares.
    BuyShares,
    /// Ask the bank for a loan.
    RequestLoan,
    /// Do nothing this step.
    Wait,
}

impl Action {
    /// Every action, in the fixed enumeration order used for tie-breaking.
    pub const ALL: [Action; 5] = [
        Action::SellShares,
        Action::Liquidate,
        Action::BuyShares,
        Action::RequestLoan,
        Action::Wait,
    ];

    /// The number of actions.
    pub const COUNT: usize = Self::ALL.len();

    /// The wire label understood by the simulator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SellShares => "sellShares",
            Action::Liquidate => "liquidate",
            Action::BuyShares => "buyShares",
            Action::RequestLoan => "requestLoan",
            Action::Wait => "wait",
        }
    }

    /// Position of this action in [`Action::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::UnknownAction(s.to_string()))
    }
}
