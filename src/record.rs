// 📦 Prediction Record - one house, serialized the way the serving endpoint reads it
// Built fresh on every submit, discarded once the request completes

use crate::features::{FeatureRegistry, FeatureValue, HousingInputs};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// PredictionRecord - ordered column → value mapping
///
/// Serializes as a flat JSON object whose keys appear in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    fields: Vec<(&'static str, FeatureValue)>,
}

impl PredictionRecord {
    /// Merge the form values into the registry's template sample
    pub fn build(registry: &FeatureRegistry, inputs: &HousingInputs) -> Self {
        let fields = registry
            .iter()
            .map(|feature| (feature.name, feature.resolve(inputs)))
            .collect();

        PredictionRecord { fields }
    }

    /// Build against the standard housing registry
    pub fn from_inputs(inputs: &HousingInputs) -> Self {
        Self::build(&FeatureRegistry::new(), inputs)
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FeatureValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for PredictionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Request body of an MLflow-style `/invocations` call.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PredictionPayload {
    pub dataframe_records: Vec<PredictionRecord>,
}

impl PredictionPayload {
    pub fn single(record: PredictionRecord) -> Self {
        PredictionPayload {
            dataframe_records: vec![record],
        }
    }

    pub fn from_inputs(inputs: &HousingInputs) -> Self {
        Self::single(PredictionRecord::from_inputs(inputs))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
