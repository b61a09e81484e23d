//! Algorithm roster
//!
//! The common contract every heuristic implements, plus the construction of
//! the run roster from a configuration: family defaults for `--greedy`,
//! `--gpa` and `--node-centered`, explicit `-a` selections that replace the
//! families, the swaps-and-normal combinations, and the optional seeded
//! shuffle of the run order.
//!

use crate::config::{AlgorithmKind, MatchingConfig};
use crate::gpa::Gpa;
use crate::graph::Snapshot;
use crate::greedy_b_matching::GreedyBMatching;
use crate::greedy_iterative::GreedyIterative;
use crate::k_edge_coloring::KEdgeColoring;
use crate::node_centered::NodeCentered;
use crate::util::*;
use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

pub trait MatchingHeuristic {
    /// allocate and reset all run state; false means the instance cannot run
    fn prepare(&mut self, graph: &Snapshot, num_matchings: ColorIndex) -> bool;
    fn run(&mut self, graph: &mut Snapshot);
    fn deliver(&self) -> Weight;
    fn name(&self) -> String;
    fn short_name(&self) -> String;
    fn threshold(&self) -> f64 {
        -1.0
    }
}

pub fn build_roster(config: &MatchingConfig) -> Result<Vec<Box<dyn MatchingHeuristic>>> {
    let mut algos: Vec<Box<dyn MatchingHeuristic>> = Vec::new();

    if config.greedy {
        algos.push(Box::new(GreedyBMatching::new(config, false, false)));
        if config.swaps_and_normal {
            algos.push(Box::new(GreedyIterative::new(config, true, true)));
            algos.push(Box::new(GreedyIterative::new(config, true, false)));
            algos.push(Box::new(GreedyIterative::new(config, false, false)));
        } else {
            if config.swaps {
                algos.push(Box::new(GreedyIterative::new(config, true, true)));
            }
            algos.push(Box::new(GreedyIterative::new(config, config.swaps, false)));
        }
    }

    if config.node_centered {
        use crate::config::AggregateKind::*;
        // with a full threshold first, then without
        for threshold in [1.0, 0.0] {
            algos.push(Box::new(NodeCentered::new(config, Max, threshold)));
            algos.push(Box::new(NodeCentered::new(config, Sum, threshold)));
            algos.push(Box::new(NodeCentered::new(config, BSum, threshold)));
        }
    }

    if config.gpa {
        let roma = config.roma as i32;
        if config.swaps_and_normal {
            algos.push(Box::new(Gpa::new(config, false, false, 0)));
            algos.push(Box::new(Gpa::new(config, true, false, 0)));
            algos.push(Box::new(Gpa::new(config, false, true, 0)));
            algos.push(Box::new(Gpa::new(config, false, false, 1)));
        } else {
            if config.swaps {
                algos.push(Box::new(Gpa::new(config, true, false, roma)));
                algos.push(Box::new(Gpa::new(config, true, true, roma)));
            }
            algos.push(Box::new(Gpa::new(config, config.swaps, config.swaps_global, roma)));
        }
    }

    if !config.algorithms.is_empty() {
        algos.clear();
        for &algorithm in &config.algorithms {
            match algorithm {
                AlgorithmKind::BGreedyColor => {
                    if config.swaps_and_normal {
                        algos.push(Box::new(GreedyBMatching::new(config, false, false)));
                        algos.push(Box::new(GreedyBMatching::new(config, false, true)));
                    } else {
                        algos.push(Box::new(GreedyBMatching::new(config, false, config.swaps_global)));
                    }
                }
                AlgorithmKind::BGreedyExtend => {
                    if config.swaps_and_normal {
                        algos.push(Box::new(GreedyBMatching::new(config, true, false)));
                        algos.push(Box::new(GreedyBMatching::new(config, true, true)));
                    } else {
                        algos.push(Box::new(GreedyBMatching::new(config, true, config.swaps_global)));
                    }
                }
                AlgorithmKind::GreedyIterative => {
                    if config.swaps_and_normal {
                        algos.push(Box::new(GreedyIterative::new(config, false, config.swaps_global)));
                        if config.swaps_global {
                            algos.push(Box::new(GreedyIterative::new(config, true, false)));
                        }
                        algos.push(Box::new(GreedyIterative::new(config, true, config.swaps_global)));
                    } else {
                        algos.push(Box::new(GreedyIterative::new(config, config.swaps, config.swaps_global)));
                    }
                }
                AlgorithmKind::NodeCentered => {
                    if config.aggregation_types.is_empty() {
                        bail!("trying to run node-centered without any aggregation type set");
                    }
                    for &atype in &config.aggregation_types {
                        if config.global_thresholds.is_empty() {
                            algos.push(Box::new(NodeCentered::new(config, atype, -1.0)));
                        } else {
                            for &threshold in &config.global_thresholds {
                                algos.push(Box::new(NodeCentered::new(config, atype, threshold)));
                            }
                        }
                    }
                }
                AlgorithmKind::GpaIterative => {
                    if config.swaps_and_normal {
                        algos.push(Box::new(Gpa::new(config, false, config.swaps_global, 0)));
                        if config.swaps_global {
                            algos.push(Box::new(Gpa::new(config, true, false, 0)));
                        }
                        algos.push(Box::new(Gpa::new(config, true, config.swaps_global, 0)));
                        if config.roma {
                            algos.push(Box::new(Gpa::new(config, false, config.swaps_global, config.l)));
                        }
                    } else if config.swaps {
                        algos.push(Box::new(Gpa::new(config, true, config.swaps_global, 0)));
                        if config.roma {
                            algos.push(Box::new(Gpa::new(config, false, false, config.l)));
                        }
                    } else {
                        algos.push(Box::new(Gpa::new(config, false, config.swaps_global, config.l)));
                    }
                }
                AlgorithmKind::KEdgeColoring => {
                    // (common color, lightest color, long rotation)
                    let variants: &[(bool, bool, bool)] = if config.swaps_and_normal {
                        &[
                            (false, false, false),
                            (true, false, false),
                            (false, false, true),
                            (true, false, true),
                            (false, true, false),
                            (true, true, false),
                            (false, true, true),
                            (true, true, true),
                        ]
                    } else if config.swaps {
                        &[(false, true, false), (true, true, false), (false, true, true), (true, true, true)]
                    } else {
                        &[(false, false, false), (true, false, false), (false, false, true), (true, false, true)]
                    };
                    for &(cc, lc, rl) in variants {
                        algos.push(Box::new(KEdgeColoring::new(config, cc, lc, rl)));
                    }
                }
            }
        }
    }

    if config.algorithm_order_seed != 0 {
        let mut rng = Xoshiro256StarStar::seed_from_u64(config.algorithm_order_seed);
        algos.shuffle(&mut rng);
    }

    Ok(algos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggregateKind;

    #[test]
    fn greedy_family_roster() {
        let mut config = MatchingConfig::default();
        config.greedy = true;
        let algos = build_roster(&config).unwrap();
        let names: Vec<String> = algos.iter().map(|a| a.short_name()).collect();
        assert_eq!(names, vec!["bgreedy_color", "greedy_iterative"]);

        config.swaps = true;
        let names: Vec<String> = build_roster(&config).unwrap().iter().map(|a| a.short_name()).collect();
        assert_eq!(
            names,
            vec![
                "bgreedy_color",
                "greedy_iterative-swaps-global",
                "greedy_iterative-swaps-local"
            ]
        );
    }

    #[test]
    fn explicit_selection_discards_families() {
        let mut config = MatchingConfig::default();
        config.greedy = true;
        config.gpa = true;
        config.algorithms = vec![AlgorithmKind::KEdgeColoring];
        let algos = build_roster(&config).unwrap();
        let names: Vec<String> = algos.iter().map(|a| a.short_name()).collect();
        assert_eq!(names, vec!["k-EC", "k-EC+CC", "k-EC-RL", "k-EC+CC-RL"]);
    }

    #[test]
    fn node_centered_needs_aggregation_types() {
        let mut config = MatchingConfig::default();
        config.algorithms = vec![AlgorithmKind::NodeCentered];
        assert!(build_roster(&config).is_err());

        config.aggregation_types = vec![AggregateKind::Sum, AggregateKind::Max];
        config.global_thresholds = vec![0.5];
        let algos = build_roster(&config).unwrap();
        let names: Vec<String> = algos.iter().map(|a| a.short_name()).collect();
        assert_eq!(names, vec!["NC-SUM+t0.5", "NC-MAX+t0.5"]);
    }

    #[test]
    fn gpa_roster_includes_roma_when_requested() {
        let mut config = MatchingConfig::default();
        config.algorithms = vec![AlgorithmKind::GpaIterative];
        config.roma = true;
        config.l = 5;
        let algos = build_roster(&config).unwrap();
        let names: Vec<String> = algos.iter().map(|a| a.short_name()).collect();
        assert_eq!(names, vec!["gpa_roma-5"]);
    }

    #[test]
    fn order_shuffle_is_seeded() {
        let mut config = MatchingConfig::default();
        config.algorithms = vec![AlgorithmKind::KEdgeColoring];
        config.swaps_and_normal = true;
        config.algorithm_order_seed = 42;
        let first: Vec<String> = build_roster(&config).unwrap().iter().map(|a| a.short_name()).collect();
        let second: Vec<String> = build_roster(&config).unwrap().iter().map(|a| a.short_name()).collect();
        assert_eq!(first, second);
    }
}
