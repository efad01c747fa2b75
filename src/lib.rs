// House Price Client - Core Library
// Shared by the terminal form, the CLI and the web server

pub mod features;
pub mod record;
pub mod currency;
pub mod bridge;
pub mod config;
pub mod form;
pub mod logging;

// Re-export commonly used types
pub use features::{
    EditableField, FeatureDefinition, FeatureKind, FeatureRegistry, FeatureSource,
    FeatureValue, HousingInputs,
};
pub use record::{PredictionPayload, PredictionRecord};
pub use currency::format_currency;
pub use bridge::{
    interpret_response, BridgeError, Prediction, PredictionClient, PredictionService,
};
pub use config::{Config, DEFAULT_SERVICE_URL};
pub use form::{Control, FormState, Outcome};
pub use logging::init_logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
