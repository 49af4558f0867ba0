//! State discretization.
//!
//! The learner works on a small, finite set of [`StateType`] labels instead of
//! raw observations. A label combines two components:
//!
//! - an [`InvestorState`]: the investor's solvency and holding category,
//! - a [`MarketBucket`]: the change in ask price since the previous step,
//!   quantized into fixed-width bands plus two overflow buckets.
//!
//! Two labels stand outside this product: `init`, for the first observation of
//! an episode, and `terminate`, for a bankrupt investor the simulator has just
//! liquidated.
//!
//! Classification is a pure function of the current and previous observation.
//! It never looks at learned values.
//!
//! ## Example
//!
//! ```
//! use stock_agents::{Observation, StateClassifier, StateType};
//!
//! let classifier = StateClassifier::default();
//! let before = Observation::new(1_000, 0, 0, 50, 50);
//! let now = Observation::new(1_000, 0, 0, 50, 57);
//!
//! assert_eq!(classifier.classify(&now, None), StateType::Init);
//! assert_eq!(classifier.classify(&now, Some(&before)).label(), "noStock[5,10)");
//! ```

use crate::error::{Error, Result};
use crate::observation::Observation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default width of one ask-price band.
pub const DEFAULT_STATE_GAP: i64 = 5;

/// Default magnitude beyond which price changes fall into an overflow bucket.
pub const DEFAULT_MARKET_RANGE: i64 = 100;

/// The investor half of a state label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvestorState {
    /// Debt meets or exceeds deposit plus stock value at the bid.
    Bankrupt,
    /// Holds shares worth less than twice the deposit.
    OwnStock,
    /// Stock position worth more than twice the deposit.
    DoubleStock,
    /// Holds no shares.
    NoStock,
}

impl InvestorState {
    const ALL: [InvestorState; 4] = [
        InvestorState::Bankrupt,
        InvestorState::OwnStock,
        InvestorState::DoubleStock,
        InvestorState::NoStock,
    ];

    /// Categorizes an investor. Bankruptcy wins over every holding category.
    pub fn of(obs: &Observation) -> Self {
        if obs.is_insolvent() {
            InvestorState::Bankrupt
        } else if obs.stock_value() > obs.deposit.saturating_mul(2) {
            InvestorState::DoubleStock
        } else if obs.share_holding > 0 {
            InvestorState::OwnStock
        } else {
            InvestorState::NoStock
        }
    }

    /// The label prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestorState::Bankrupt => "bankrupt",
            InvestorState::OwnStock => "ownStock",
            InvestorState::DoubleStock => "doubleStock",
            InvestorState::NoStock => "noStock",
        }
    }
}

/// The market half of a state label: where the last ask-price change landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarketBucket {
    /// The change fell below `-bound`.
    Below { bound: i64 },
    /// The half-open band `[lower, upper)`.
    Band { lower: i64, upper: i64 },
    /// The change exceeded `bound`.
    Above { bound: i64 },
}

impl fmt::Display for MarketBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketBucket::Below { bound } => write!(f, "(-inf,-{})", bound),
            MarketBucket::Band { lower, upper } => write!(f, "[{},{})", lower, upper),
            MarketBucket::Above { bound } => write!(f, "({},+inf)", bound),
        }
    }
}

impl FromStr for MarketBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.parse::<i64>()
                .map_err(|e| format!("bad bucket bound {:?}: {}", v, e))
        };

        let positive = |bound: i64| {
            if bound > 0 {
                Ok(bound)
            } else {
                Err(format!("bucket bound must be positive in {:?}", s))
            }
        };

        if let Some(rest) = s.strip_prefix("(-inf,").and_then(|r| r.strip_suffix(')')) {
            let bound = parse(rest)?
                .checked_neg()
                .ok_or_else(|| format!("bucket bound out of range in {:?}", s))?;
            return Ok(MarketBucket::Below {
                bound: positive(bound)?,
            });
        }
        if let Some(rest) = s.strip_prefix('(').and_then(|r| r.strip_suffix(",+inf)")) {
            return Ok(MarketBucket::Above {
                bound: positive(parse(rest)?)?,
            });
        }
        if let Some(rest) = s.strip_prefix('[').and_then(|r| r.strip_suffix(')')) {
            let (lower, upper) = rest
                .split_once(',')
                .ok_or_else(|| format!("bad bucket {:?}", s))?;
            return Ok(MarketBucket::Band {
                lower: parse(lower)?,
                upper: parse(upper)?,
            });
        }
        Err(format!("bad bucket {:?}", s))
    }
}

/// A discretized state label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StateType {
    /// No previous observation in this episode.
    Init,
    /// Bankrupt and liquidated by the simulator.
    Terminate,
    /// The ordinary investor x market product.
    Composite {
        investor: InvestorState,
        market: MarketBucket,
    },
}

impl StateType {
    /// The stable string form used for persistence and diagnostics.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// The investor component, if this is a composite label.
    pub fn investor(&self) -> Option<InvestorState> {
        match self {
            StateType::Composite { investor, .. } => Some(*investor),
            _ => None,
        }
    }

    /// The market component, if this is a composite label.
    pub fn market(&self) -> Option<MarketBucket> {
        match self {
            StateType::Composite { market, .. } => Some(*market),
            _ => None,
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateType::Init => f.write_str("init"),
            StateType::Terminate => f.write_str("terminate"),
            StateType::Composite { investor, market } => {
                write!(f, "{}{}", investor.as_str(), market)
            }
        }
    }
}

impl FromStr for StateType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "init" => return Ok(StateType::Init),
            "terminate" => return Ok(StateType::Terminate),
            _ => {}
        }

        let investor = InvestorState::ALL
            .iter()
            .copied()
            .find(|i| s.starts_with(i.as_str()))
            .ok_or_else(|| format!("unknown state label {:?}", s))?;
        let market = s[investor.as_str().len()..].parse()?;

        Ok(StateType::Composite { investor, market })
    }
}

impl From<StateType> for String {
    fn from(state: StateType) -> Self {
        state.to_string()
    }
}

impl TryFrom<String> for StateType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Maps observations onto [`StateType`] labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateClassifier {
    state_gap: i64,
    market_range: i64,
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self {
            state_gap: DEFAULT_STATE_GAP,
            market_range: DEFAULT_MARKET_RANGE,
        }
    }
}

impl StateClassifier {
    /// Creates a classifier with the given band width and overflow bound.
    pub fn new(state_gap: i64, market_range: i64) -> Result<Self> {
        if state_gap <= 0 {
            return Err(Error::Config(format!(
                "state_gap must be positive, got {}",
                state_gap
            )));
        }
        if market_range <= 0 {
            return Err(Error::Config(format!(
                "market_range must be positive, got {}",
                market_range
            )));
        }
        Ok(Self {
            state_gap,
            market_range,
        })
    }

    /// Classifies `current` given the previous observation of the episode.
    ///
    /// A missing previous observation, or one that was itself terminal,
    /// yields [`StateType::Init`].
    pub fn classify(&self, current: &Observation, previous: Option<&Observation>) -> StateType {
        let previous = match previous {
            Some(prev) if !prev.is_zombie => prev,
            _ => return StateType::Init,
        };

        let investor = InvestorState::of(current);
        if investor == InvestorState::Bankrupt && current.is_zombie {
            return StateType::Terminate;
        }

        StateType::Composite {
            investor,
            market: self.bucket(current.ask_price.saturating_sub(previous.ask_price)),
        }
    }

    /// Quantizes an ask-price change.
    pub fn bucket(&self, delta: i64) -> MarketBucket {
        if delta > self.market_range {
            MarketBucket::Above {
                bound: self.market_range,
            }
        } else if delta < -self.market_range {
            MarketBucket::Below {
                bound: self.market_range,
            }
        } else {
            let lower = delta.div_euclid(self.state_gap) * self.state_gap;
            MarketBucket::Band {
                lower,
                upper: lower + self.state_gap,
            }
        }
    }
}
