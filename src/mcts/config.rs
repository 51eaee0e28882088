//! Search configuration and strength presets.
//!
//! `SearchConfig` is plain data: it can be serialized, compared across runs
//! and validated before any work is scheduled. Capabilities that cannot be
//! serialized (heuristic function, custom playout policy, estimators) are
//! attached to the [`DecisionEngine`](super::engine::DecisionEngine) instead.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Budget presets. Each maps to a determinization factor, a thinking time
/// and a per-tree run count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrengthLevel {
    FastTest,
    Test,
    Fast,
    Strong,
    Powerful,
    Extreme,
    Insane,
    Superman,
    Ironman,
    /// Run mode holds the total number of runs constant instead.
    HsluServer,
    Trumpf,
    TestWeakTime,
    TestStrongTime,
    TestWeakNumDeterminizations,
    TestStrongNumDeterminizations,
}

impl StrengthLevel {
    const fn parameters(self) -> (u32, u64, u64) {
        match self {
            StrengthLevel::FastTest => (1, 50, 10),
            StrengthLevel::Test => (2, 100, 20),
            StrengthLevel::Fast => (3, 200, 40),
            StrengthLevel::Strong => (4, 500, 100),
            StrengthLevel::Powerful => (5, 1000, 200),
            StrengthLevel::Extreme => (6, 2000, 400),
            StrengthLevel::Insane => (7, 2500, 500),
            StrengthLevel::Superman => (8, 5000, 1000),
            StrengthLevel::Ironman => (9, 10_000, 2000),
            StrengthLevel::HsluServer => (10, 9900, 2000),
            StrengthLevel::Trumpf => (15, 10_000, 2000),
            StrengthLevel::TestWeakTime => (1, 50, 10),
            StrengthLevel::TestStrongTime => (1, 250, 10),
            StrengthLevel::TestWeakNumDeterminizations => (1, 250, 10),
            StrengthLevel::TestStrongNumDeterminizations => (5, 250, 10),
        }
    }

    /// Multiplier applied to the number of determinizations.
    #[must_use]
    pub const fn factor(self) -> u32 {
        self.parameters().0
    }

    /// Wall-clock budget per decision in time mode.
    #[must_use]
    pub const fn max_thinking_time_ms(self) -> u64 {
        self.parameters().1
    }

    /// Iterations per tree in run mode.
    #[must_use]
    pub const fn runs(self) -> u64 {
        self.parameters().2
    }

    /// Whether run mode divides a fixed total across all trees.
    #[must_use]
    pub const fn uses_fixed_total(self) -> bool {
        matches!(self, StrengthLevel::HsluServer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunMode {
    /// Stop at a shared deadline.
    Time,
    /// Run a fixed number of iterations per tree.
    Runs,
}

/// How the merged root statistics become one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalSelectionPolicy {
    /// Most visited move.
    RobustChild,
    /// Highest mean score.
    MaxChild,
}

/// Built-in rollout policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayoutKind {
    Random,
    Light,
    Heavy,
}

/// Budget adjustments applied when a score estimator is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EstimatorTuning {
    /// Run mode: per-tree runs are divided by this.
    pub runs_divisor: u32,
    /// Time mode: determinization count is multiplied by this.
    pub determinization_multiplier: u32,
}

impl Default for EstimatorTuning {
    fn default() -> Self {
        Self {
            runs_divisor: 10,
            determinization_multiplier: 2,
        }
    }
}

/// What to do when one tree fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailurePolicy {
    /// Log the failure and merge the remaining trees.
    Exclude,
    /// Fail the whole decision.
    Escalate,
}

/// Kind of host a strategy runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentKind {
    Production,
    /// Developer machine; card play is weakened to stay responsive.
    LocalDevelopment,
    Test,
}

/// Description of the execution environment used to pick defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    pub kind: EnvironmentKind,
    /// Hardware threads available for run-mode pools.
    pub parallelism: usize,
}

impl Environment {
    #[must_use]
    pub const fn new(kind: EnvironmentKind, parallelism: usize) -> Self {
        Self { kind, parallelism }
    }

    /// Inspect the host. macOS machines are treated as development boxes.
    #[must_use]
    pub fn detect() -> Self {
        let kind = if cfg!(target_os = "macos") {
            EnvironmentKind::LocalDevelopment
        } else {
            EnvironmentKind::Production
        };
        Self::new(kind, num_cpus::get())
    }
}

/// Parameters of one decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub run_mode: RunMode,

    /// Strength for trumpf selection decisions.
    pub trumpf_strength: StrengthLevel,

    /// Strength for card play decisions.
    pub card_strength: StrengthLevel,

    /// UCT exploration constant (default: sqrt(2)).
    pub exploration_constant: f64,

    /// Weight of a child's optimistic bound in selection.
    pub optimistic_bias: f64,

    /// Penalty weight for the gap below a child's pessimistic bound.
    pub pessimistic_bias: f64,

    /// Track score bounds and prune dominated children.
    pub score_bounds: bool,

    /// Rollouts averaged per leaf evaluation.
    pub num_playouts: u32,

    pub final_selection: FinalSelectionPolicy,

    /// Decision seed. `None` draws from the OS.
    pub seed: Option<u64>,

    /// Search the true deal instead of sampling hidden cards.
    pub cheating: bool,

    /// Run one tree per determinization on the pool. When off, a single
    /// tree runs on the calling thread.
    pub root_parallelisation: bool,

    pub playout: PlayoutKind,

    pub estimator_tuning: EstimatorTuning,

    pub failure_policy: FailurePolicy,

    /// Subtracted from the thinking time when computing the deadline.
    pub safety_buffer_ms: u64,

    /// Rounds assumed for trumpf selection decisions.
    pub trumpf_round_multiplier: u32,

    /// Total runs split across trees for `HsluServer`.
    pub fixed_total_runs: u64,

    /// Upper bound on pool threads in run mode. `None` uses all cores.
    pub max_parallelism: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Time,
            trumpf_strength: StrengthLevel::Insane,
            card_strength: StrengthLevel::Insane,
            exploration_constant: std::f64::consts::SQRT_2,
            optimistic_bias: 0.0,
            pessimistic_bias: 0.0,
            score_bounds: false,
            num_playouts: 2,
            final_selection: FinalSelectionPolicy::RobustChild,
            seed: Some(42),
            cheating: false,
            root_parallelisation: true,
            playout: PlayoutKind::Random,
            estimator_tuning: EstimatorTuning::default(),
            failure_policy: FailurePolicy::Exclude,
            safety_buffer_ms: 10,
            trumpf_round_multiplier: 10,
            fixed_total_runs: 100_000,
            max_parallelism: None,
        }
    }
}

impl SearchConfig {
    /// Defaults for the given environment. The only source of
    /// host-dependent configuration.
    #[must_use]
    pub fn for_environment(env: &Environment) -> Self {
        let mut config = Self {
            playout: PlayoutKind::Light,
            max_parallelism: Some(env.parallelism.max(1)),
            ..Self::default()
        };
        match env.kind {
            EnvironmentKind::Production => {}
            EnvironmentKind::LocalDevelopment => config.card_strength = StrengthLevel::Fast,
            EnvironmentKind::Test => {
                config.trumpf_strength = StrengthLevel::Fast;
                config.card_strength = StrengthLevel::FastTest;
            }
        }
        config
    }

    pub fn with_run_mode(mut self, mode: RunMode) -> Self {
        self.run_mode = mode;
        self
    }

    pub fn with_strength(mut self, trumpf: StrengthLevel, card: StrengthLevel) -> Self {
        self.trumpf_strength = trumpf;
        self.card_strength = card;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    pub fn with_score_bounds(mut self, optimistic_bias: f64, pessimistic_bias: f64) -> Self {
        self.score_bounds = true;
        self.optimistic_bias = optimistic_bias;
        self.pessimistic_bias = pessimistic_bias;
        self
    }

    pub fn with_num_playouts(mut self, n: u32) -> Self {
        self.num_playouts = n;
        self
    }

    pub fn with_final_selection(mut self, policy: FinalSelectionPolicy) -> Self {
        self.final_selection = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Draw a fresh seed per decision.
    pub fn unseeded(mut self) -> Self {
        self.seed = None;
        self
    }

    pub fn with_cheating(mut self, cheating: bool) -> Self {
        self.cheating = cheating;
        self
    }

    pub fn with_root_parallelisation(mut self, enabled: bool) -> Self {
        self.root_parallelisation = enabled;
        self
    }

    pub fn with_playout(mut self, playout: PlayoutKind) -> Self {
        self.playout = playout;
        self
    }

    pub fn with_estimator_tuning(mut self, tuning: EstimatorTuning) -> Self {
        self.estimator_tuning = tuning;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_max_parallelism(mut self, threads: usize) -> Self {
        self.max_parallelism = Some(threads);
        self
    }

    /// Check parameter combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration_constant));
        }
        for (name, value) in [
            ("optimistic", self.optimistic_bias),
            ("pessimistic", self.pessimistic_bias),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidBias { name, value });
            }
        }
        if self.num_playouts == 0 {
            return Err(ConfigError::ZeroPlayouts);
        }
        if self.trumpf_round_multiplier == 0 {
            return Err(ConfigError::ZeroDeterminizations("trumpf_round_multiplier"));
        }
        if self.estimator_tuning.runs_divisor == 0 {
            return Err(ConfigError::ZeroTuning("runs_divisor"));
        }
        if self.estimator_tuning.determinization_multiplier == 0 {
            return Err(ConfigError::ZeroTuning("determinization_multiplier"));
        }
        if self.max_parallelism == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        match self.run_mode {
            RunMode::Time => {
                for strength in [self.trumpf_strength, self.card_strength] {
                    let thinking_ms = strength.max_thinking_time_ms();
                    if self.safety_buffer_ms >= thinking_ms {
                        return Err(ConfigError::BufferExceedsBudget {
                            buffer_ms: self.safety_buffer_ms,
                            thinking_ms,
                        });
                    }
                }
            }
            RunMode::Runs => {
                let fixed = self.trumpf_strength.uses_fixed_total() || self.card_strength.uses_fixed_total();
                if fixed && self.fixed_total_runs == 0 {
                    return Err(ConfigError::ZeroRuns);
                }
            }
        }
        Ok(())
    }

    /// Pool size for this configuration.
    ///
    /// Time mode needs every tree running at once, so the pool is sized for
    /// the largest expected determinization count, including the estimator
    /// multiplier. Run mode is capped at the available hardware threads.
    #[must_use]
    pub fn pool_threads(&self) -> usize {
        match self.run_mode {
            RunMode::Runs => self.max_parallelism.unwrap_or_else(num_cpus::get).max(1),
            RunMode::Time => {
                let trumpf = self.trumpf_round_multiplier * self.trumpf_strength.factor();
                let card = (crate::cards::HAND_SIZE as u32) * self.card_strength.factor();
                let trees = if self.root_parallelisation {
                    trumpf.max(card) * self.estimator_tuning.determinization_multiplier
                } else {
                    1
                };
                trees.max(1) as usize
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!((config.exploration_constant - std::f64::consts::SQRT_2).abs() < 0.001);
        assert_eq!(config.num_playouts, 2);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.run_mode, RunMode::Time);
        assert_eq!(config.final_selection, FinalSelectionPolicy::RobustChild);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strength_presets() {
        assert_eq!(StrengthLevel::Insane.factor(), 7);
        assert_eq!(StrengthLevel::Insane.max_thinking_time_ms(), 2500);
        assert_eq!(StrengthLevel::Insane.runs(), 500);
        assert_eq!(StrengthLevel::Trumpf.factor(), 15);
        assert!(StrengthLevel::HsluServer.uses_fixed_total());
        assert!(!StrengthLevel::Ironman.uses_fixed_total());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_exploration(2.0)
            .with_seed(123)
            .with_score_bounds(0.1, 0.2)
            .with_run_mode(RunMode::Runs);

        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.seed, Some(123));
        assert!(config.score_bounds);
        assert_eq!(config.pessimistic_bias, 0.2);
        assert_eq!(config.run_mode, RunMode::Runs);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let config = SearchConfig::default().with_num_playouts(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPlayouts));

        let config = SearchConfig::default().with_exploration(f64::NAN);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExploration(_))));

        let config = SearchConfig::default().with_max_parallelism(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroThreads));

        let mut config = SearchConfig::default();
        config.trumpf_round_multiplier = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDeterminizations(_))));
    }

    #[test]
    fn test_buffer_must_leave_thinking_time() {
        let mut config = SearchConfig::default().with_strength(StrengthLevel::Fast, StrengthLevel::FastTest);
        config.safety_buffer_ms = 50;
        assert_eq!(
            config.validate(),
            Err(ConfigError::BufferExceedsBudget { buffer_ms: 50, thinking_ms: 50 })
        );
        // The buffer is irrelevant in run mode.
        assert!(config.with_run_mode(RunMode::Runs).validate().is_ok());
    }

    #[test]
    fn test_environment_defaults() {
        let prod = SearchConfig::for_environment(&Environment::new(EnvironmentKind::Production, 8));
        assert_eq!(prod.card_strength, StrengthLevel::Insane);
        assert_eq!(prod.playout, PlayoutKind::Light);
        assert_eq!(prod.max_parallelism, Some(8));

        let dev = SearchConfig::for_environment(&Environment::new(EnvironmentKind::LocalDevelopment, 4));
        assert_eq!(dev.card_strength, StrengthLevel::Fast);

        let test = SearchConfig::for_environment(&Environment::new(EnvironmentKind::Test, 0));
        assert_eq!(test.card_strength, StrengthLevel::FastTest);
        assert_eq!(test.max_parallelism, Some(1));
    }

    #[test]
    fn test_pool_threads() {
        let config = SearchConfig::default();
        // 10 rounds * factor 7 for trumpf vs 9 * 7 for cards, doubled for
        // estimator-assisted searches.
        assert_eq!(config.pool_threads(), 140);

        let single = SearchConfig::default().with_root_parallelisation(false);
        assert_eq!(single.pool_threads(), 1);

        let config = SearchConfig::default().with_run_mode(RunMode::Runs).with_max_parallelism(3);
        assert_eq!(config.pool_threads(), 3);
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default().with_strength(StrengthLevel::HsluServer, StrengthLevel::TestWeakTime);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("HSLU_SERVER"));
        let deserialized: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
