//! Model configuration parsing from environment variables.
//!
//! This module handles the training-set size, forest shape and the
//! training lifecycle switches.

use anyhow::{Context, Result};
use std::env;

/// Valuation model environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Synthetic samples generated per training cycle
    pub training_samples: usize,
    /// Trees in the forest
    pub n_trees: usize,
    /// `None` grows every tree until its leaves are pure
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    /// Seeds the generator and the bootstrap draws
    pub seed: u64,

    // Lifecycle
    pub train_on_startup: bool,
    pub lazy_training: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            training_samples: 1000,
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
            train_on_startup: true,
            lazy_training: true,
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Result<Self> {
        let training_samples = env::var("TRAINING_SAMPLES")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<usize>()
            .context("Failed to parse TRAINING_SAMPLES")?;

        let n_trees = env::var("N_TREES")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<usize>()
            .context("Failed to parse N_TREES")?;

        let max_depth = match env::var("MAX_DEPTH") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse::<u16>()
                    .context("Failed to parse MAX_DEPTH")?,
            ),
            _ => None,
        };

        let min_samples_split = env::var("MIN_SAMPLES_SPLIT")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .context("Failed to parse MIN_SAMPLES_SPLIT")?;

        let seed = env::var("RANDOM_SEED")
            .unwrap_or_else(|_| "42".to_string())
            .parse::<u64>()
            .context("Failed to parse RANDOM_SEED")?;

        let train_on_startup = env::var("TRAIN_ON_STARTUP")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let lazy_training = env::var("LAZY_TRAINING")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        if training_samples < 2 {
            anyhow::bail!("TRAINING_SAMPLES must be at least 2, got {}", training_samples);
        }
        if n_trees == 0 {
            anyhow::bail!("N_TREES must be at least 1");
        }

        Ok(Self {
            training_samples,
            n_trees,
            max_depth,
            min_samples_split,
            seed,
            train_on_startup,
            lazy_training,
        })
    }
}
