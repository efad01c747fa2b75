// 🏠 Feature Registry - the housing attributes sent to the model
// One ordered catalogue: which fields exist, which the user edits, which stay constant

use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VALUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Integer,
    Float,
}

/// A single numeric cell of a record.
///
/// Integers and floats are kept apart so the serialized JSON carries `80.0`
/// for float columns and `1961` for integer columns, the way the serving
/// schema was inferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Int(_) => FeatureKind::Integer,
            FeatureValue::Float(_) => FeatureKind::Float,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            FeatureValue::Int(v) => *v as f64,
            FeatureValue::Float(v) => *v,
        }
    }
}

// ============================================================================
// EDITABLE FIELDS
// ============================================================================

/// The six attributes exposed as form controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    LotArea,
    OverallQual,
    YearBuilt,
    GrLivArea,
    GarageCars,
    TotalBsmtSf,
}

impl EditableField {
    /// Form order: first column, then second column.
    pub const ALL: [EditableField; 6] = [
        EditableField::LotArea,
        EditableField::OverallQual,
        EditableField::YearBuilt,
        EditableField::GrLivArea,
        EditableField::GarageCars,
        EditableField::TotalBsmtSf,
    ];

    /// Column name in the record
    pub fn feature_name(&self) -> &'static str {
        match self {
            EditableField::LotArea => "Lot Area",
            EditableField::OverallQual => "Overall Qual",
            EditableField::YearBuilt => "Year Built",
            EditableField::GrLivArea => "Gr Liv Area",
            EditableField::GarageCars => "Garage Cars",
            EditableField::TotalBsmtSf => "Total Bsmt SF",
        }
    }

    /// Label shown next to the control
    pub fn label(&self) -> &'static str {
        match self {
            EditableField::LotArea => "Lot Area",
            EditableField::OverallQual => "Overall Quality (1-10)",
            EditableField::YearBuilt => "Year Built",
            EditableField::GrLivArea => "Gr Liv Area (sq ft)",
            EditableField::GarageCars => "Garage Cars",
            EditableField::TotalBsmtSf => "Total Basement SF",
        }
    }

    pub fn default_value(&self) -> i64 {
        match self {
            EditableField::LotArea => 9600,
            EditableField::OverallQual => 5,
            EditableField::YearBuilt => 1961,
            EditableField::GrLivArea => 1710,
            EditableField::GarageCars => 2,
            EditableField::TotalBsmtSf => 850,
        }
    }

    /// Inclusive bounds for slider controls. Free-form number inputs have none.
    pub fn range(&self) -> Option<(i64, i64)> {
        match self {
            EditableField::OverallQual => Some((1, 10)),
            _ => None,
        }
    }

    pub fn is_slider(&self) -> bool {
        self.range().is_some()
    }

    /// Clamp a value into the control's range, if it has one
    pub fn clamp(&self, value: i64) -> i64 {
        match self.range() {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        }
    }

    pub fn from_feature_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.feature_name() == name)
    }
}

/// Current values of the editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingInputs {
    pub lot_area: i64,
    pub overall_qual: i64,
    pub year_built: i64,
    pub gr_liv_area: i64,
    pub garage_cars: i64,
    pub total_bsmt_sf: i64,
}

impl Default for HousingInputs {
    fn default() -> Self {
        HousingInputs {
            lot_area: EditableField::LotArea.default_value(),
            overall_qual: EditableField::OverallQual.default_value(),
            year_built: EditableField::YearBuilt.default_value(),
            gr_liv_area: EditableField::GrLivArea.default_value(),
            garage_cars: EditableField::GarageCars.default_value(),
            total_bsmt_sf: EditableField::TotalBsmtSf.default_value(),
        }
    }
}

impl HousingInputs {
    pub fn get(&self, field: EditableField) -> i64 {
        match field {
            EditableField::LotArea => self.lot_area,
            EditableField::OverallQual => self.overall_qual,
            EditableField::YearBuilt => self.year_built,
            EditableField::GrLivArea => self.gr_liv_area,
            EditableField::GarageCars => self.garage_cars,
            EditableField::TotalBsmtSf => self.total_bsmt_sf,
        }
    }

    /// Store a value, clamped to the control's range
    pub fn set(&mut self, field: EditableField, value: i64) {
        let value = field.clamp(value);
        match field {
            EditableField::LotArea => self.lot_area = value,
            EditableField::OverallQual => self.overall_qual = value,
            EditableField::YearBuilt => self.year_built = value,
            EditableField::GrLivArea => self.gr_liv_area = value,
            EditableField::GarageCars => self.garage_cars = value,
            EditableField::TotalBsmtSf => self.total_bsmt_sf = value,
        }
    }

    /// Same values with every slider brought back into its range
    pub fn clamped(mut self) -> Self {
        for field in EditableField::ALL {
            self.set(field, self.get(field));
        }
        self
    }
}

// ============================================================================
// FEATURE DEFINITION
// ============================================================================

/// Where a column's value comes from when a record is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureSource {
    /// Fixed value of the illustrative housing sample
    Constant(FeatureValue),
    /// Taken from the form
    Editable(EditableField),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDefinition {
    /// Column name expected by the serving schema (e.g., "Lot Area")
    pub name: &'static str,
    pub source: FeatureSource,
}

impl FeatureDefinition {
    pub fn int(name: &'static str, value: i64) -> Self {
        FeatureDefinition {
            name,
            source: FeatureSource::Constant(FeatureValue::Int(value)),
        }
    }

    pub fn float(name: &'static str, value: f64) -> Self {
        FeatureDefinition {
            name,
            source: FeatureSource::Constant(FeatureValue::Float(value)),
        }
    }

    pub fn editable(field: EditableField) -> Self {
        FeatureDefinition {
            name: field.feature_name(),
            source: FeatureSource::Editable(field),
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.source, FeatureSource::Editable(_))
    }

    /// Resolve this column against the current form values
    pub fn resolve(&self, inputs: &HousingInputs) -> FeatureValue {
        match self.source {
            FeatureSource::Constant(value) => value,
            FeatureSource::Editable(field) => FeatureValue::Int(inputs.get(field)),
        }
    }
}

// ============================================================================
// FEATURE REGISTRY
// ============================================================================

/// FeatureRegistry - ordered list of every column in a record
///
/// Order matters: the serving side reads `dataframe_records` into a frame
/// and the column order must match the training frame.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    features: Vec<FeatureDefinition>,
}

impl FeatureRegistry {
    /// Registry holding the Ames housing columns of the deployed model
    pub fn new() -> Self {
        let mut registry = FeatureRegistry {
            features: Vec::with_capacity(38),
        };

        registry.register_housing_features();
        registry
    }

    fn register_housing_features(&mut self) {
        use EditableField::*;

        // Identification and zoning
        self.register(FeatureDefinition::int("Order", 1));
        self.register(FeatureDefinition::int("PID", 5286));
        self.register(FeatureDefinition::int("MS SubClass", 20));

        // Lot and quality
        self.register(FeatureDefinition::float("Lot Frontage", 80.0));
        self.register(FeatureDefinition::editable(LotArea));
        self.register(FeatureDefinition::editable(OverallQual));
        self.register(FeatureDefinition::int("Overall Cond", 7));
        self.register(FeatureDefinition::editable(YearBuilt));
        self.register(FeatureDefinition::int("Year Remod/Add", 1961));
        self.register(FeatureDefinition::float("Mas Vnr Area", 0.0));

        // Basement
        self.register(FeatureDefinition::float("BsmtFin SF 1", 700.0));
        self.register(FeatureDefinition::float("BsmtFin SF 2", 0.0));
        self.register(FeatureDefinition::float("Bsmt Unf SF", 150.0));
        self.register(FeatureDefinition::editable(TotalBsmtSf));

        // Living area
        self.register(FeatureDefinition::int("1st Flr SF", 856));
        self.register(FeatureDefinition::int("2nd Flr SF", 854));
        self.register(FeatureDefinition::int("Low Qual Fin SF", 0));
        self.register(FeatureDefinition::editable(GrLivArea));
        self.register(FeatureDefinition::int("Bsmt Full Bath", 1));
        self.register(FeatureDefinition::int("Bsmt Half Bath", 0));
        self.register(FeatureDefinition::int("Full Bath", 1));
        self.register(FeatureDefinition::int("Half Bath", 0));
        self.register(FeatureDefinition::int("Bedroom AbvGr", 3));
        self.register(FeatureDefinition::int("Kitchen AbvGr", 1));
        self.register(FeatureDefinition::int("TotRms AbvGrd", 7));
        self.register(FeatureDefinition::int("Fireplaces", 2));

        // Garage and outdoor
        self.register(FeatureDefinition::int("Garage Yr Blt", 1961));
        self.register(FeatureDefinition::editable(GarageCars));
        self.register(FeatureDefinition::float("Garage Area", 500.0));
        self.register(FeatureDefinition::float("Wood Deck SF", 210.0));
        self.register(FeatureDefinition::int("Open Porch SF", 0));
        self.register(FeatureDefinition::int("Enclosed Porch", 0));
        self.register(FeatureDefinition::int("3Ssn Porch", 0));
        self.register(FeatureDefinition::int("Screen Porch", 0));
        self.register(FeatureDefinition::int("Pool Area", 0));
        self.register(FeatureDefinition::int("Misc Val", 0));

        // Sale
        self.register(FeatureDefinition::int("Mo Sold", 5));
        self.register(FeatureDefinition::int("Yr Sold", 2010));
    }

    /// Append a column. Re-registering an existing name replaces it in place.
    pub fn register(&mut self, feature: FeatureDefinition) {
        match self.features.iter_mut().find(|f| f.name == feature.name) {
            Some(existing) => *existing = feature,
            None => self.features.push(feature),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureDefinition> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDefinition> {
        self.features.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name).collect()
    }

    pub fn editable(&self) -> impl Iterator<Item = &FeatureDefinition> {
        self.features.iter().filter(|f| f.is_editable())
    }

    pub fn constants(&self) -> impl Iterator<Item = &FeatureDefinition> {
        self.features.iter().filter(|f| !f.is_editable())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_has_every_housing_column_once() {
        let registry = FeatureRegistry::new();
        let names = registry.names();
        let unique: HashSet<_> = names.iter().collect();

        assert_eq!(registry.len(), 38);
        assert_eq!(unique.len(), names.len());
        assert_eq!(names.first(), Some(&"Order"));
        assert_eq!(names.last(), Some(&"Yr Sold"));
    }

    #[test]
    fn test_registry_exposes_exactly_the_six_editable_fields() {
        let registry = FeatureRegistry::new();
        let editable: Vec<_> = registry.editable().map(|f| f.name).collect();

        assert_eq!(editable.len(), EditableField::ALL.len());
        for field in EditableField::ALL {
            assert!(editable.contains(&field.feature_name()), "{:?} missing", field);
        }
        assert_eq!(registry.constants().count(), 32);
    }

    #[test]
    fn test_float_columns_keep_float_kind() {
        let registry = FeatureRegistry::new();
        let inputs = HousingInputs::default();
        let kind_of = |name: &str| registry.get(name).unwrap().resolve(&inputs).kind();

        assert_eq!(kind_of("Lot Frontage"), FeatureKind::Float);
        assert_eq!(kind_of("Garage Area"), FeatureKind::Float);
        assert_eq!(kind_of("Pool Area"), FeatureKind::Integer);
        assert_eq!(kind_of("Lot Area"), FeatureKind::Integer);
    }

    #[test]
    fn test_register_replaces_existing_column_in_place() {
        let mut registry = FeatureRegistry::new();
        let position = registry.names().iter().position(|n| *n == "PID").unwrap();

        registry.register(FeatureDefinition::int("PID", 9999));

        assert_eq!(registry.len(), 38);
        assert_eq!(registry.names()[position], "PID");
        assert_eq!(
            registry.get("PID").unwrap().resolve(&HousingInputs::default()),
            FeatureValue::Int(9999)
        );
    }

    #[test]
    fn test_overall_quality_is_clamped_to_slider_range() {
        let mut inputs = HousingInputs::default();

        inputs.set(EditableField::OverallQual, 42);
        assert_eq!(inputs.overall_qual, 10);

        inputs.set(EditableField::OverallQual, -3);
        assert_eq!(inputs.overall_qual, 1);

        // Number inputs are not bounded
        inputs.set(EditableField::LotArea, -5);
        assert_eq!(inputs.lot_area, -5);
    }

    #[test]
    fn test_clamped_only_touches_sliders() {
        let inputs: HousingInputs =
            serde_json::from_str(r#"{"overall_qual": 15, "garage_cars": -1}"#).unwrap();
        let clamped = inputs.clamped();

        assert_eq!(clamped.overall_qual, 10);
        assert_eq!(clamped.garage_cars, -1);
    }

    #[test]
    fn test_inputs_deserialize_with_missing_fields_as_defaults() {
        let inputs: HousingInputs = serde_json::from_str(r#"{"lot_area": 12000}"#).unwrap();

        assert_eq!(inputs.lot_area, 12000);
        assert_eq!(inputs.year_built, 1961);
        assert_eq!(inputs.overall_qual, 5);
    }

    #[test]
    fn test_feature_name_lookup() {
        assert_eq!(
            EditableField::from_feature_name("Gr Liv Area"),
            Some(EditableField::GrLivArea)
        );
        assert_eq!(EditableField::from_feature_name("PID"), None);
    }
}
