//! Step reward.

use crate::observation::Observation;

/// Reward for moving from `previous` to `current`.
///
/// `floor(shares / 2) + (net worth now - net worth before)`: growth in net
/// worth plus a small bonus for keeping a stock position.
pub fn calculate_reward(current: &Observation, previous: &Observation) -> i64 {
    let holding_bonus = current.share_holding.div_euclid(2);
    holding_bonus.saturating_add(current.net_worth().saturating_sub(previous.net_worth()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_worth_growth_plus_holding_bonus() {
        let previous = Observation::new(900, 200, 8, 10, 10);
        let current = Observation::new(1_000, 200, 10, 10, 10);
        assert_eq!(calculate_reward(&current, &previous), 105);
    }

    #[test]
    fn test_loss_is_negative() {
        let previous = Observation::new(500, 0, 0, 10, 10);
        let current = Observation::new(400, 50, 3, 10, 10);
        // floor(3 / 2) + (350 - 500)
        assert_eq!(calculate_reward(&current, &previous), -149);
    }

    #[test]
    fn test_extreme_balances_saturate() {
        let previous = Observation::new(i64::MIN + 10, 0, 0, 10, 10);
        let current = Observation::new(1_000, 0, 4, 10, 10);
        assert_eq!(calculate_reward(&current, &previous), i64::MAX);

        let previous = Observation::new(i64::MAX, 0, 0, 10, 10);
        let current = Observation::new(0, i64::MAX, 0, 10, 10);
        assert_eq!(calculate_reward(&current, &previous), i64::MIN);
    }

    #[test]
    fn test_prices_do_not_enter() {
        let previous = Observation::new(500, 0, 4, 10, 10);
        let current = Observation::new(500, 0, 4, 90, 95);
        assert_eq!(calculate_reward(&current, &previous), 2);
    }
}
