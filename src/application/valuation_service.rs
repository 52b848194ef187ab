//! Owner of the live valuation model.
//!
//! Training is serialised behind `training_lock` and the fitted model is
//! published with a single `Arc` swap, so a reader sees either the previous
//! model or the new one, never a mix of the two.

use crate::application::ml::forest::ForestParameters;
use crate::application::ml::model::TrainedModel;
use crate::application::ml::predictor::PricePredictor;
use crate::application::ml::synthetic::SyntheticDataGenerator;
use crate::config::ModelConfig;
use crate::domain::errors::ValuationError;
use crate::domain::valuation::feature_registry::ParsedFeatures;
use crate::domain::valuation::types::{TrainingReport, ValuationResult};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{info, warn};

/// Why a training cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingTrigger {
    Startup,
    Explicit,
    FirstUse,
}

impl TrainingTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingTrigger::Startup => "startup",
            TrainingTrigger::Explicit => "explicit",
            TrainingTrigger::FirstUse => "first_use",
        }
    }
}

pub struct ValuationService {
    config: ModelConfig,
    model: RwLock<Option<Arc<dyn PricePredictor>>>,
    training_lock: Mutex<()>,
}

impl ValuationService {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            model: RwLock::new(None),
            training_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.current().map(|m| m.is_some()).unwrap_or(false)
    }

    /// Replaces the live model with `predictor`.
    pub fn install(&self, predictor: Arc<dyn PricePredictor>) -> Result<(), ValuationError> {
        let mut slot = self
            .model
            .write()
            .map_err(|_| ValuationError::internal("model lock poisoned"))?;
        info!(model = predictor.name(), version = predictor.version(), "Valuation model installed");
        *slot = Some(predictor);
        Ok(())
    }

    /// Generates a fresh synthetic set, fits a new model and swaps it in.
    pub fn train(&self, trigger: TrainingTrigger) -> Result<TrainingReport, ValuationError> {
        let _guard = self
            .training_lock
            .lock()
            .map_err(|_| ValuationError::internal("training lock poisoned"))?;
        self.train_locked(trigger)
    }

    fn train_locked(&self, trigger: TrainingTrigger) -> Result<TrainingReport, ValuationError> {
        let started = Instant::now();
        info!(
            trigger = trigger.as_str(),
            samples = self.config.training_samples,
            n_trees = self.config.n_trees,
            "Training property valuation model..."
        );

        let samples = SyntheticDataGenerator::new(self.config.seed).generate(self.config.training_samples);
        let params = ForestParameters {
            n_trees: self.config.n_trees,
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            seed: self.config.seed,
        };
        let model = TrainedModel::fit(&samples, &params)?;

        let report = TrainingReport {
            samples: model.samples(),
            n_trees: model.n_trees(),
            training_r2: model.training_r2(),
            duration_ms: started.elapsed().as_millis() as u64,
            trained_at: model.trained_at(),
        };
        self.install(Arc::new(model))?;

        info!(
            trigger = trigger.as_str(),
            r2 = %format!("{:.3}", report.training_r2),
            duration_ms = report.duration_ms,
            "Model trained"
        );
        Ok(report)
    }

    /// Trains once if no model is live. Concurrent callers wait for the first
    /// one and then reuse its model.
    pub fn ensure_trained(&self) -> Result<Option<TrainingReport>, ValuationError> {
        if self.is_trained() {
            return Ok(None);
        }
        let _guard = self
            .training_lock
            .lock()
            .map_err(|_| ValuationError::internal("training lock poisoned"))?;
        if self.is_trained() {
            return Ok(None);
        }
        self.train_locked(TrainingTrigger::FirstUse).map(Some)
    }

    /// Values one parsed request.
    ///
    /// With lazy training disabled an untrained service answers `ModelNotReady`.
    pub fn valuate(&self, parsed: &ParsedFeatures) -> Result<ValuationResult, ValuationError> {
        let model = match self.current()? {
            Some(model) => model,
            None if self.config.lazy_training => {
                warn!("Valuation requested before training; training now");
                self.ensure_trained()?;
                self.current()?.ok_or(ValuationError::ModelNotReady)?
            }
            None => return Err(ValuationError::ModelNotReady),
        };

        let mut result = model.predict(&parsed.vector)?;
        result.defaulted_features = parsed.defaulted.clone();
        Ok(result)
    }

    fn current(&self) -> Result<Option<Arc<dyn PricePredictor>>, ValuationError> {
        self.model
            .read()
            .map(|slot| slot.clone())
            .map_err(|_| ValuationError::internal("model lock poisoned"))
    }
}
