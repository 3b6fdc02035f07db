//! External data sources.

pub mod predict;

pub use predict::{
    DEFAULT_ENDPOINT, PredictError, PredictionClient, PredictionCode, PredictionResult, Predictor,
};
