pub mod evaluation;
pub mod forest;
pub mod model;
pub mod predictor;
pub mod scaler;
pub mod synthetic;

pub use model::TrainedModel;
pub use predictor::PricePredictor;
pub use synthetic::SyntheticDataGenerator;
