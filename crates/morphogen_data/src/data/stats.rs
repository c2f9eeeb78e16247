use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Summary of one generation transition.
///
/// Fitness figures describe the raw scores of the generation that was just
/// evaluated; structural averages describe the population produced from it.
#[derive(
    Clone, Debug, Default, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase", default)]
pub struct PopulationStats {
    /// Generation index the scores belong to.
    pub generation: u32,
    pub best_fitness: f64,
    pub avg_fitness: f64,
    pub worst_fitness: f64,
    pub median_fitness: f64,
    /// Mean body node count of the new population.
    pub avg_nodes: f64,
    /// Mean muscle count of the new population.
    pub avg_muscles: f64,
    /// Mean enabled NEAT connections (0 for non-NEAT populations).
    pub avg_connections: f64,
    pub species_count: usize,
    pub survivor_count: usize,
    pub crossover_offspring: usize,
    pub mutation_offspring: usize,
    /// Scores that were NaN or infinite.
    pub non_finite_fitness: usize,
}

/// One evaluator verdict, same order as the genomes it was computed for.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FitnessResult {
    pub fitness: f64,
    #[serde(default)]
    pub disqualified: bool,
    #[serde(default)]
    pub disqualified_reason: Option<String>,
    /// Evaluator-specific extras (distance travelled, energy used, ...).
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl FitnessResult {
    #[must_use]
    pub fn scored(fitness: f64) -> Self {
        Self {
            fitness,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn disqualified(fitness: f64, reason: impl Into<String>) -> Self {
        Self {
            fitness,
            disqualified: true,
            disqualified_reason: Some(reason.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitness_result_keeps_metadata() {
        let json = r#"{"fitness": 12.5, "distance": 3.0}"#;
        let r: FitnessResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.fitness, 12.5);
        assert!(!r.disqualified);
        assert_eq!(r.metadata.get("distance"), Some(&serde_json::json!(3.0)));
    }
}
