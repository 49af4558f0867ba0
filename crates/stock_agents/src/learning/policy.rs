//! Epsilon-greedy action selection.

use super::q_table::QTable;
use crate::action::Action;
use crate::state::StateType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How an action was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Uniformly random: exploration, bootstrap, or no greedy candidate.
    Random(Action),
    /// The greedy action from the table.
    Greedy(Action),
}

impl Choice {
    /// The chosen action.
    pub fn action(&self) -> Action {
        match self {
            Choice::Random(a) | Choice::Greedy(a) => *a,
        }
    }

    /// Whether the choice was random.
    pub fn is_random(&self) -> bool {
        matches!(self, Choice::Random(_))
    }
}

/// Epsilon-greedy selection over the fixed action set, with its own RNG.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Creates a policy seeded from the thread RNG.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Creates a policy with a reproducible random stream.
    pub fn seeded(epsilon: f64, seed: u64) -> Self {
        Self {
            epsilon,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A uniformly random action.
    pub fn random(&mut self) -> Action {
        Action::ALL[self.rng.random_range(0..Action::COUNT)]
    }

    /// Explores with probability epsilon, otherwise takes the greedy action.
    ///
    /// Falls back to a random action if the table offers no greedy candidate,
    /// so a choice is always made.
    pub fn select(&mut self, table: &QTable, state: &StateType) -> Choice {
        if self.rng.random::<f64>() < self.epsilon {
            return Choice::Random(self.random());
        }
        match table.best_action(state) {
            Some(action) => Choice::Greedy(action),
            None => Choice::Random(self.random()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{InvestorState, MarketBucket};

    fn state() -> StateType {
        StateType::Composite {
            investor: InvestorState::NoStock,
            market: MarketBucket::Band { lower: 0, upper: 5 },
        }
    }

    #[test]
    fn test_zero_epsilon_is_greedy() {
        let mut table = QTable::new();
        table.set(state(), Action::BuyShares, 4.0);
        let mut policy = EpsilonGreedy::seeded(0.0, 7);
        for _ in 0..50 {
            assert_eq!(policy.select(&table, &state()), Choice::Greedy(Action::BuyShares));
        }
    }

    #[test]
    fn test_full_epsilon_is_random() {
        let mut table = QTable::new();
        table.set(state(), Action::BuyShares, 4.0);
        let mut policy = EpsilonGreedy::seeded(1.0, 7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let choice = policy.select(&table, &state());
            assert!(choice.is_random());
            seen.insert(choice.action());
        }
        assert_eq!(seen.len(), Action::COUNT);
    }

    #[test]
    fn test_nan_table_falls_back_to_random() {
        let mut table = QTable::new();
        for action in Action::ALL {
            table.set(state(), action, f64::NAN);
        }
        let mut policy = EpsilonGreedy::seeded(0.0, 1);
        assert!(policy.select(&table, &state()).is_random());
    }

    #[test]
    fn test_seeded_policies_agree() {
        let table = QTable::new();
        let mut a = EpsilonGreedy::seeded(0.2, 42);
        let mut b = EpsilonGreedy::seeded(0.2, 42);
        for _ in 0..100 {
            assert_eq!(a.select(&table, &state()), b.select(&table, &state()));
        }
    }

    #[test]
    fn test_exploration_rate_roughly_epsilon() {
        let table = QTable::new();
        let mut policy = EpsilonGreedy::seeded(0.2, 3);
        let random = (0..10_000)
            .filter(|_| policy.select(&table, &state()).is_random())
            .count();
        assert!((1_500..2_500).contains(&random), "random = {}", random);
    }
}
