//! Configuration management for evolution parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! a `morphogen.toml` file or to the `config` object of an evolve request.
//! Every section has defaults, so partial files are fine.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. TOML file or request JSON (overrides defaults)
//! 3. [`EvolutionConfig::normalized`] (mode contract, always last)
//!
//! ## Example `morphogen.toml`
//!
//! ```toml
//! populationSize = 60
//! seed = 42
//!
//! [selection]
//! method = "tournament"
//! cullPercentage = 0.5
//!
//! [neural]
//! mode = "neat"
//! ```

use crate::error::{EvolutionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How survivors are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    #[default]
    Truncation,
    Tournament,
    Rank,
    Speciation,
}

/// Which controller genomes carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeuralMode {
    /// Body only; muscles run open-loop.
    #[serde(alias = "none")]
    Off,
    #[default]
    Fixed,
    Neat,
}

/// Body gene recombination scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum BodyCrossoverMethod {
    SinglePoint,
    #[default]
    Uniform,
}

/// Fixed-topology weight recombination scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeuralCrossoverMethod {
    /// Each weight copied from a random parent.
    #[default]
    Uniform,
    /// Each weight a random convex combination of both parents.
    Blend,
    /// Simulated binary crossover.
    Sbx,
}

/// Shape of the mutation decay curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DecayMode {
    #[default]
    Off,
    Linear,
    Exponential,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    pub method: SelectionMethod,
    /// Fraction of the population removed each generation.
    pub cull_percentage: f64,
    pub tournament_size: usize,
    /// Exponent of the rank weighting curve; 1.0 is linear.
    pub rank_pressure: f64,
    /// Legacy: top genomes always kept verbatim.
    pub elite_count: Option<usize>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            method: SelectionMethod::Truncation,
            cull_percentage: 0.5,
            tournament_size: 3,
            rank_pressure: 1.0,
            elite_count: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MutationConfig {
    pub use_mutation: bool,
    /// Per-gene perturbation probability for body genes.
    pub rate: f64,
    /// Perturbation scale as a fraction of each field's valid range.
    pub magnitude: f64,
    /// Per-event probability of body structural mutation.
    pub structural_rate: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            use_mutation: true,
            rate: 0.1,
            magnitude: 0.3,
            structural_rate: 0.05,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CrossoverConfig {
    pub use_crossover: bool,
    pub rate: f64,
    pub body_method: BodyCrossoverMethod,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            use_crossover: true,
            rate: 0.5,
            body_method: BodyCrossoverMethod::Uniform,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyConfig {
    pub min_nodes: usize,
    pub max_nodes: usize,
    pub min_muscles: usize,
    pub max_muscles: usize,
    /// Half-extent of the cube founders' nodes are scattered in.
    pub spawn_radius: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            min_nodes: 2,
            max_nodes: 8,
            min_muscles: 1,
            max_muscles: 15,
            spawn_radius: 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NeuralConfig {
    pub mode: NeuralMode,
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    /// Per-weight perturbation probability (fixed topology).
    pub rate: f64,
    /// Standard deviation of weight perturbation (fixed topology).
    pub magnitude: f64,
    pub crossover_method: NeuralCrossoverMethod,
    /// SBX distribution index; larger keeps children closer to parents.
    pub sbx_eta: f64,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            mode: NeuralMode::Fixed,
            input_size: 8,
            hidden_size: 8,
            output_size: 8,
            rate: 0.1,
            magnitude: 0.3,
            crossover_method: NeuralCrossoverMethod::Uniform,
            sbx_eta: 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NeatConfig {
    pub add_connection_rate: f64,
    pub add_node_rate: f64,
    pub enable_rate: f64,
    pub disable_rate: f64,
    pub weight_mutation_rate: f64,
    /// Of mutated weights, the fraction perturbed rather than reset.
    pub perturb_rate: f64,
    pub weight_perturb_power: f64,
    /// Fresh weights are drawn from `[-weight_range, weight_range]`.
    pub weight_range: f64,
    /// Weights and biases are clamped to `[-weight_limit, weight_limit]`.
    pub weight_limit: f64,
    pub feedforward_only: bool,
    /// Chance a matching gene disabled in the chosen parent is re-enabled
    /// when the other parent has it enabled.
    pub reenable_rate: f64,
    /// Fraction of input→output pairs connected in founders.
    pub initial_connectivity: f64,
    pub excess_coefficient: f64,
    pub disjoint_coefficient: f64,
    pub weight_coefficient: f64,
    pub normalize_by_size: bool,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            add_connection_rate: 0.05,
            add_node_rate: 0.03,
            enable_rate: 0.02,
            disable_rate: 0.01,
            weight_mutation_rate: 0.8,
            perturb_rate: 0.9,
            weight_perturb_power: 0.5,
            weight_range: 1.0,
            weight_limit: 8.0,
            feedforward_only: true,
            reenable_rate: 0.25,
            initial_connectivity: 1.0,
            excess_coefficient: 1.0,
            disjoint_coefficient: 1.0,
            weight_coefficient: 0.4,
            normalize_by_size: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeciationConfig {
    pub compatibility_threshold: f64,
    pub min_species_size: usize,
}

impl Default for SpeciationConfig {
    fn default() -> Self {
        Self {
            compatibility_threshold: 3.0,
            min_species_size: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SharingConfig {
    pub use_fitness_sharing: bool,
    pub sharing_radius: f64,
    pub sharing_alpha: f64,
    /// Body distance weight per node-count difference.
    pub node_weight: f64,
    /// Body distance weight per muscle-count difference.
    pub muscle_weight: f64,
    /// Body distance weight of mean oscillator parameter difference.
    pub param_weight: f64,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            use_fitness_sharing: false,
            sharing_radius: 3.0,
            sharing_alpha: 1.0,
            node_weight: 1.0,
            muscle_weight: 1.0,
            param_weight: 0.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DecayConfig {
    pub mode: DecayMode,
    /// Multiplier reached once `decay_generations` have elapsed.
    pub final_fraction: f64,
    pub decay_generations: u32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            mode: DecayMode::Off,
            final_fraction: 0.2,
            decay_generations: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveConfig {
    pub enabled: bool,
    /// Generations without improvement before the boost level rises.
    pub stagnation_generations: u32,
    pub boost_factor: f64,
    pub max_boost_level: u32,
    pub improvement_epsilon: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stagnation_generations: 5,
            boost_factor: 1.5,
            max_boost_level: 3,
            improvement_epsilon: 1e-6,
        }
    }
}

/// Every tunable of the evolutionary engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionConfig {
    /// Size of founder populations; evolution keeps the input size.
    pub population_size: usize,
    pub seed: Option<u64>,
    pub selection: SelectionConfig,
    pub mutation: MutationConfig,
    pub crossover: CrossoverConfig,
    pub body: BodyConfig,
    pub neural: NeuralConfig,
    pub neat: NeatConfig,
    pub speciation: SpeciationConfig,
    pub sharing: SharingConfig,
    pub decay: DecayConfig,
    pub adaptive: AdaptiveConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            seed: None,
            selection: SelectionConfig::default(),
            mutation: MutationConfig::default(),
            crossover: CrossoverConfig::default(),
            body: BodyConfig::default(),
            neural: NeuralConfig::default(),
            neat: NeatConfig::default(),
            speciation: SpeciationConfig::default(),
            sharing: SharingConfig::default(),
            decay: DecayConfig::default(),
            adaptive: AdaptiveConfig::default(),
        }
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(EvolutionError::invalid_config(
            field,
            format!("{value} is outside [{min}, {max}]"),
        ))
    }
}

fn check_probability(field: &str, value: f64) -> Result<()> {
    check_range(field, value, 0.0, 1.0)
}

impl EvolutionConfig {
    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| EvolutionError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path).map_err(|e| {
            EvolutionError::Config(format!("reading {:?}: {}", path.as_ref(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every numeric field against its documented bounds. Values are
    /// never clamped silently.
    pub fn validate(&self) -> Result<()> {
        check_range(
            "selection.cullPercentage",
            self.selection.cull_percentage,
            0.1,
            0.9,
        )?;
        if self.selection.tournament_size == 0 {
            return Err(EvolutionError::invalid_config(
                "selection.tournamentSize",
                "must be at least 1",
            ));
        }
        check_range("selection.rankPressure", self.selection.rank_pressure, 0.0, 10.0)?;

        check_probability("mutation.rate", self.mutation.rate)?;
        check_range("mutation.magnitude", self.mutation.magnitude, 0.0, 10.0)?;
        check_probability("mutation.structuralRate", self.mutation.structural_rate)?;
        check_probability("crossover.rate", self.crossover.rate)?;

        let body = &self.body;
        if body.min_nodes < 2 || body.min_nodes > body.max_nodes {
            return Err(EvolutionError::invalid_config(
                "body.minNodes",
                format!(
                    "need 2 <= minNodes <= maxNodes, got {} and {}",
                    body.min_nodes, body.max_nodes
                ),
            ));
        }
        if body.min_muscles < 1 || body.min_muscles > body.max_muscles {
            return Err(EvolutionError::invalid_config(
                "body.minMuscles",
                format!(
                    "need 1 <= minMuscles <= maxMuscles, got {} and {}",
                    body.min_muscles, body.max_muscles
                ),
            ));
        }
        let pair_capacity = body.max_nodes * (body.max_nodes - 1) / 2;
        if body.min_muscles > pair_capacity {
            return Err(EvolutionError::invalid_config(
                "body.minMuscles",
                format!(
                    "{} nodes hold at most {} muscles, got minMuscles {}",
                    body.max_nodes, pair_capacity, body.min_muscles
                ),
            ));
        }
        check_range("body.spawnRadius", body.spawn_radius, 0.1, 100.0)?;

        check_probability("neural.rate", self.neural.rate)?;
        check_range("neural.magnitude", self.neural.magnitude, 0.0, 10.0)?;
        check_range("neural.sbxEta", self.neural.sbx_eta, 0.0, 100.0)?;
        if self.neural.mode != NeuralMode::Off
            && (self.neural.input_size == 0 || self.neural.output_size == 0)
        {
            return Err(EvolutionError::invalid_config(
                "neural.inputSize",
                "controllers need at least one input and one output",
            ));
        }

        let neat = &self.neat;
        for (field, value) in [
            ("neat.addConnectionRate", neat.add_connection_rate),
            ("neat.addNodeRate", neat.add_node_rate),
            ("neat.enableRate", neat.enable_rate),
            ("neat.disableRate", neat.disable_rate),
            ("neat.weightMutationRate", neat.weight_mutation_rate),
            ("neat.perturbRate", neat.perturb_rate),
            ("neat.reenableRate", neat.reenable_rate),
            ("neat.initialConnectivity", neat.initial_connectivity),
        ] {
            check_probability(field, value)?;
        }
        check_range("neat.weightPerturbPower", neat.weight_perturb_power, 0.0, 10.0)?;
        check_range("neat.weightRange", neat.weight_range, 0.0, 100.0)?;
        check_range("neat.weightLimit", neat.weight_limit, 0.1, 1000.0)?;
        for (field, value) in [
            ("neat.excessCoefficient", neat.excess_coefficient),
            ("neat.disjointCoefficient", neat.disjoint_coefficient),
            ("neat.weightCoefficient", neat.weight_coefficient),
        ] {
            check_range(field, value, 0.0, 100.0)?;
        }

        if !(self.speciation.compatibility_threshold.is_finite()
            && self.speciation.compatibility_threshold > 0.0)
        {
            return Err(EvolutionError::invalid_config(
                "speciation.compatibilityThreshold",
                "must be a positive number",
            ));
        }

        check_range("sharing.sharingRadius", self.sharing.sharing_radius, 0.0, 1e6)?;
        check_range("sharing.sharingAlpha", self.sharing.sharing_alpha, 0.0, 100.0)?;

        if !(self.decay.final_fraction > 0.0 && self.decay.final_fraction <= 1.0) {
            return Err(EvolutionError::invalid_config(
                "decay.finalFraction",
                format!("{} is outside (0, 1]", self.decay.final_fraction),
            ));
        }
        check_range("adaptive.boostFactor", self.adaptive.boost_factor, 1.0, 10.0)?;
        Ok(())
    }

    /// Applies the controller-mode contract and returns the effective
    /// configuration.
    ///
    /// NEAT mode always selects by species and never shares fitness:
    /// without species protection fresh topology is culled before its
    /// weights have had generations to adapt. Caller-supplied values for
    /// those two fields are overwritten, not rejected.
    #[must_use]
    pub fn normalized(&self) -> EvolutionConfig {
        let mut config = self.clone();
        if config.neural.mode == NeuralMode::Neat {
            if config.selection.method != SelectionMethod::Speciation {
                tracing::debug!(
                    requested = ?config.selection.method,
                    "NEAT mode forces speciation selection"
                );
                config.selection.method = SelectionMethod::Speciation;
            }
            if config.sharing.use_fitness_sharing {
                tracing::debug!("NEAT mode disables fitness sharing");
                config.sharing.use_fitness_sharing = false;
            }
        }
        config
    }
}
