//! Command line interface and driver
//!
//! Parses the options, reads the snapshot, builds the algorithm roster and
//! runs every instance once per requested b value, printing a result table
//! and appending CSV rows when a results file is configured.
//!

use crate::algorithm::{self, MatchingHeuristic};
use crate::config::MatchingConfig;
use crate::konect;
use crate::results::{ResultRow, ResultsWriter};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Clone)]
#[clap(author, version)]
#[clap(about = "Disjoint b-matchings on edge-weighted undirected graphs")]
#[clap(color = clap::ColorChoice::Auto)]
pub struct Cli {
    /// path to the graph file (KONECT adjacency format)
    #[clap(value_parser)]
    graph_file: PathBuf,

    /// run the greedy family with default sub-options
    #[clap(long)]
    greedy: bool,

    /// run the GPA family with default sub-options
    #[clap(long)]
    gpa: bool,

    /// run the node-centered family with default sub-options
    #[clap(long)]
    node_centered: bool,

    /// explicit algorithm selection, discarding the default families; any of:
    /// nodecentered, bmatching, biterative, gpa, bgreedy-extend, bgreedy-color,
    /// greedy-it, gpa-it, k-ec
    #[clap(short = 'a', long = "algorithm")]
    algorithms: Vec<String>,

    /// compute a disjoint b-matching for each given value
    #[clap(short = 'b', long = "b")]
    b: Vec<u32>,

    /// iteration bound for GPA-ROMA; setting it enables ROMA
    #[clap(short = 'l', long = "l")]
    l: Option<i32>,

    /// use the swaps heuristic on results
    #[clap(long)]
    swaps: bool,

    /// run with and without the swaps heuristic
    #[clap(long)]
    swaps_and_normal: bool,

    /// for swaps, sort edges ascending by weight instead of descending
    #[clap(long)]
    swaps_reverse_sort: bool,

    /// swap globally after all rounds instead of locally after each round
    #[clap(long)]
    global_swaps: bool,

    /// aggregation type for node-centered; any of: sum, max, avg, median, bsum
    #[clap(short = 'g', long = "aggregation-type")]
    aggregation_types: Vec<String>,

    /// node-centered: only arcs of weight at least t * MAX are matched in the
    /// first round
    #[clap(short = 't', long = "threshold")]
    thresholds: Vec<f64>,

    /// seed for the PRNG
    #[clap(long, default_value_t = 123)]
    seed: u64,

    /// seed for shuffling the algorithm order; 0 keeps the roster order
    #[clap(long, default_value_t = 0)]
    oseed: u64,

    /// verify the matching invariants after every run
    #[clap(long)]
    sanity_check: bool,

    /// append one CSV row per algorithm and b value to this file
    #[clap(long = "results-output")]
    results_output: Option<PathBuf>,
}

fn base_name(path: &PathBuf) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Cli {
    fn into_config(self) -> Result<(MatchingConfig, PathBuf)> {
        let mut config = MatchingConfig {
            greedy: self.greedy,
            gpa: self.gpa,
            node_centered: self.node_centered,
            swaps: self.swaps || self.swaps_and_normal,
            swaps_and_normal: self.swaps_and_normal,
            swaps_reverse_sort: self.swaps_reverse_sort,
            swaps_global: self.global_swaps,
            all_bs: self.b,
            sanity_check: self.sanity_check,
            graph_filename: base_name(&self.graph_file),
            output_file: self.results_output,
            seed: self.seed,
            algorithm_order_seed: self.oseed,
            ..MatchingConfig::default()
        };
        if let Some(l) = self.l {
            config.l = l;
            config.roma = true;
        }
        for threshold in self.thresholds {
            if threshold > 0.0 {
                config.global_thresholds.push(threshold);
            }
        }
        for name in &self.algorithms {
            config.algorithms.push(name.parse()?);
        }
        for name in &self.aggregation_types {
            config.aggregation_types.push(name.parse()?);
        }
        Ok((config, self.graph_file))
    }

    pub fn run(self) -> Result<()> {
        println!("called with params:");
        for arg in std::env::args().skip(1) {
            println!("{}", arg);
        }

        let (mut config, graph_path) = self.into_config()?;
        log::debug!("config: {}", serde_json::to_string(&config)?);

        let timer = Instant::now();
        let mut graph = konect::read_graph_file(&graph_path)?;
        println!("Input I/O took {}s", timer.elapsed().as_secs_f64());
        println!("%n,m {},{}", graph.vertex_count(), graph.arc_count());

        let mut results = match &config.output_file {
            Some(path) => Some(ResultsWriter::open(path)?),
            None => None,
        };

        if config.all_bs.is_empty() {
            config.all_bs.push(1);
        }

        let mut algos: Vec<Box<dyn MatchingHeuristic>> = algorithm::build_roster(&config)?;

        for &b in &config.all_bs {
            println!("Running with b={}:", b);
            println!("| {:<40} | {:>20} | {:>12} |", "Algorithm", "Weight", "Time (s)");
            for algo in algos.iter_mut() {
                if !algo.prepare(&graph, b) {
                    println!("| {:<40} | {:>35} |", algo.name(), "FAILED TO PREPARE");
                    continue;
                }
                let timer = Instant::now();
                algo.run(&mut graph);
                let time = timer.elapsed().as_secs_f64();
                let weight = algo.deliver();
                if let Some(writer) = results.as_mut() {
                    writer.write_row(&ResultRow {
                        graph: &config.graph_filename,
                        b,
                        seed: config.seed,
                        l: config.l,
                        threshold_global: algo.threshold(),
                        algorithm: algo.short_name(),
                        time,
                        weight,
                    })?;
                }
                println!("| {:<40} | {:>20} | {:>12.6} |", algo.name(), weight, time);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_command_line() {
        let cli = Cli::parse_from([
            "bmatch",
            "graphs/toy.konect",
            "-a",
            "gpa",
            "-a",
            "k-ec",
            "-b",
            "2",
            "-b",
            "4",
            "-l",
            "3",
            "--swaps",
            "--global-swaps",
            "-g",
            "bsum",
            "-t",
            "0.5",
            "-t",
            "0",
            "--seed",
            "7",
            "--oseed",
            "9",
            "--sanity-check",
        ]);
        let (config, path) = cli.into_config().unwrap();
        assert_eq!(path, PathBuf::from("graphs/toy.konect"));
        assert_eq!(config.graph_filename, "toy.konect");
        assert_eq!(config.algorithms.len(), 2);
        assert_eq!(config.all_bs, vec![2, 4]);
        assert_eq!(config.l, 3);
        assert!(config.roma);
        assert!(config.swaps);
        assert!(config.swaps_global);
        // non-positive thresholds are dropped
        assert_eq!(config.global_thresholds, vec![0.5]);
        assert_eq!(config.seed, 7);
        assert_eq!(config.algorithm_order_seed, 9);
        assert!(config.sanity_check);
    }

    #[test]
    fn rejects_unknown_algorithm_names() {
        let cli = Cli::parse_from(["bmatch", "toy.konect", "-a", "quantum"]);
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn swaps_and_normal_implies_swaps() {
        let cli = Cli::parse_from(["bmatch", "toy.konect", "--swaps-and-normal"]);
        let (config, _) = cli.into_config().unwrap();
        assert!(config.swaps);
        assert!(config.swaps_and_normal);
    }
}
