//! Run configuration
//!
//! Everything the driver and the algorithms need to know about one invocation.
//! Built by the CLI layer; algorithms keep their own copy.
//!

use anyhow::bail;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggregateKind {
    Sum,
    Max,
    Avg,
    Median,
    /// sum of the top-b incident weights only
    BSum,
}

impl FromStr for AggregateKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sum" => Self::Sum,
            "max" => Self::Max,
            "avg" => Self::Avg,
            "median" => Self::Median,
            "bsum" => Self::BSum,
            _ => bail!("invalid aggregation type passed! {}", s),
        })
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sum => "SUM",
            Self::Max => "MAX",
            Self::Avg => "AVG",
            Self::Median => "MEDIAN",
            Self::BSum => "B_SUM",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlgorithmKind {
    BGreedyColor,
    BGreedyExtend,
    GreedyIterative,
    GpaIterative,
    NodeCentered,
    KEdgeColoring,
}

impl FromStr for AlgorithmKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "nodecentered" => Self::NodeCentered,
            "bmatching" | "bgreedy-color" => Self::BGreedyColor,
            "bgreedy-extend" => Self::BGreedyExtend,
            "biterative" | "greedy-it" => Self::GreedyIterative,
            "gpa" | "gpa-it" => Self::GpaIterative,
            "k-ec" | "k-edgecoloring" => Self::KEdgeColoring,
            _ => bail!("invalid algorithm passed! {}", s),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchingConfig {
    pub greedy: bool,
    pub gpa: bool,
    pub node_centered: bool,

    pub swaps: bool,
    pub swaps_and_normal: bool,
    pub swaps_reverse_sort: bool,
    pub swaps_global: bool,

    pub all_bs: Vec<u32>,
    pub sanity_check: bool,
    /// basename of the input graph, carried into the results file
    pub graph_filename: String,

    pub output_file: Option<PathBuf>,

    pub global_thresholds: Vec<f64>,

    /// iteration bound for GPA-ROMA; -1 when unset
    pub l: i32,
    pub roma: bool,

    pub seed: u64,
    /// 0 disables algorithm-order shuffling
    pub algorithm_order_seed: u64,

    pub algorithms: Vec<AlgorithmKind>,
    pub aggregation_types: Vec<AggregateKind>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            greedy: false,
            gpa: false,
            node_centered: false,
            swaps: false,
            swaps_and_normal: false,
            swaps_reverse_sort: false,
            swaps_global: false,
            all_bs: Vec::new(),
            sanity_check: false,
            graph_filename: String::new(),
            output_file: None,
            global_thresholds: Vec::new(),
            l: -1,
            roma: false,
            seed: 123,
            algorithm_order_seed: 0,
            algorithms: Vec::new(),
            aggregation_types: Vec::new(),
        }
    }
}
