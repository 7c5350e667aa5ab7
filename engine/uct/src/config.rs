//! Search configuration parameters.

/// Returns discounted below this fraction of their weight are treated as
/// negligible when deriving the search horizon.
const NEGLIGIBLE_RETURN: f64 = 0.01;

/// Configuration for UCT search.
#[derive(Debug, Clone, Copy)]
pub struct UctConfig {
    /// Discount factor applied to future rewards. Must lie in (0, 1).
    pub discount: f64,

    /// Exploration-bias coefficient of the UCB1 rule.
    /// Higher values favor exploration; 0 collapses to greedy means.
    pub exploration: f64,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            discount: 0.95,
            exploration: 20.0,
        }
    }
}

impl UctConfig {
    /// Create a fast config for testing (short horizon).
    pub fn for_testing() -> Self {
        Self {
            discount: 0.9,
            exploration: 5.0,
        }
    }

    /// Builder pattern: set the discount factor.
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Builder pattern: set the exploration coefficient.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Effective search depth derived from the discount: the number of steps
    /// after which discounted rewards contribute less than one percent,
    /// ceil(ln(0.01) / ln(discount)). Recursion depth — and therefore stack
    /// usage — is bounded by this value, never by wall-clock or memory.
    pub fn search_depth(&self) -> u32 {
        (NEGLIGIBLE_RETURN.ln() / self.discount.ln()).ceil() as u32
    }
}
