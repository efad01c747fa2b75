// 📝 Form State - the controls of the prediction form, independent of any renderer
// Read control values, build the record, call the bridge. Nothing persists across sessions.

use crate::bridge::{BridgeError, Prediction, PredictionService};
use crate::features::{EditableField, HousingInputs};
use crate::record::{PredictionPayload, PredictionRecord};
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Url,
    Field(EditableField),
    ShowPayload,
    Predict,
}

impl Control {
    /// Focus order, top to bottom
    pub fn all() -> Vec<Control> {
        let mut controls = vec![Control::Url];
        controls.extend(EditableField::ALL.iter().map(|f| Control::Field(*f)));
        controls.push(Control::ShowPayload);
        controls.push(Control::Predict);
        controls
    }

    fn position(&self) -> usize {
        Self::all().iter().position(|c| c == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        all[(self.position() + 1) % all.len()]
    }

    pub fn previous(&self) -> Self {
        let all = Self::all();
        all[(self.position() + all.len() - 1) % all.len()]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Control::Url => "Prediction Service URL",
            Control::Field(field) => field.label(),
            Control::ShowPayload => "Show Raw JSON Payload",
            Control::Predict => "Predict",
        }
    }
}

/// Result of the last submit, stamped with when it completed.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub result: Result<Prediction, BridgeError>,
    pub completed_at: DateTime<Local>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn message(&self) -> String {
        match &self.result {
            Ok(prediction) => prediction.display(),
            Err(e) => e.to_string(),
        }
    }
}

pub struct FormState {
    pub url: String,
    inputs: HousingInputs,
    /// Text being typed into the focused number input
    buffer: Option<String>,
    pub show_payload: bool,
    focus: Control,
    last_outcome: Option<Outcome>,
}

impl FormState {
    pub fn new(url: impl Into<String>) -> Self {
        FormState {
            url: url.into(),
            inputs: HousingInputs::default(),
            buffer: None,
            show_payload: false,
            focus: Control::Url,
            last_outcome: None,
        }
    }

    pub fn focus(&self) -> Control {
        self.focus
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    pub fn set_focus(&mut self, control: Control) {
        self.commit_buffer();
        self.focus = control;
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_previous(&mut self) {
        self.set_focus(self.focus.previous());
    }

    /// Values as they would be submitted right now
    pub fn inputs(&self) -> HousingInputs {
        let mut inputs = self.inputs;
        if let (Control::Field(field), Some(value)) = (self.focus, self.parsed_buffer()) {
            inputs.set(field, value);
        }
        inputs
    }

    pub fn set_value(&mut self, field: EditableField, value: i64) {
        if self.focus == Control::Field(field) {
            self.buffer = None;
        }
        self.inputs.set(field, value);
    }

    /// Text displayed inside a number control
    pub fn field_text(&self, field: EditableField) -> String {
        match (&self.buffer, self.focus) {
            (Some(text), Control::Field(focused)) if focused == field => text.clone(),
            _ => self.inputs.get(field).to_string(),
        }
    }

    /// Type one character into the focused control
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            Control::Url => self.url.push(c),
            Control::Field(field) if !field.is_slider() => {
                let buffer = self
                    .buffer
                    .get_or_insert_with(|| self.inputs.get(field).to_string());
                let accepts = c.is_ascii_digit() || (c == '-' && buffer.is_empty());
                if accepts {
                    buffer.push(c);
                }
            }
            Control::ShowPayload if c == ' ' => self.toggle_payload(),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Control::Url => {
                self.url.pop();
            }
            Control::Field(field) if !field.is_slider() => {
                let buffer = self
                    .buffer
                    .get_or_insert_with(|| self.inputs.get(field).to_string());
                buffer.pop();
            }
            _ => {}
        }
    }

    /// Step the focused number control (slider arrows, number-input +/-)
    pub fn step(&mut self, delta: i64) {
        if let Control::Field(field) = self.focus {
            self.commit_buffer();
            let current = self.inputs.get(field);
            self.inputs.set(field, current.saturating_add(delta));
        }
    }

    pub fn toggle_payload(&mut self) {
        self.show_payload = !self.show_payload;
    }

    pub fn record(&self) -> PredictionRecord {
        PredictionRecord::from_inputs(&self.inputs())
    }

    pub fn payload(&self) -> PredictionPayload {
        PredictionPayload::single(self.record())
    }

    /// Pretty JSON of what Predict would send
    pub fn payload_json(&self) -> String {
        self.payload()
            .to_pretty_json()
            .unwrap_or_else(|e| format!("<unserializable payload: {}>", e))
    }

    /// Build the record from current control values and send it once.
    pub fn submit(&mut self, service: &dyn PredictionService) -> &Outcome {
        self.commit_buffer();
        let payload = self.payload();
        let result = service.predict(&self.url, &payload);

        self.last_outcome.insert(Outcome {
            result,
            completed_at: Local::now(),
        })
    }

    fn parsed_buffer(&self) -> Option<i64> {
        self.buffer.as_deref().and_then(|text| text.parse().ok())
    }

    /// Keep a typed number if it parses, otherwise fall back to the previous value
    fn commit_buffer(&mut self) {
        if let Control::Field(field) = self.focus {
            if let Some(value) = self.parsed_buffer() {
                self.inputs.set(field, value);
            }
        }
        self.buffer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureValue;
    use std::cell::RefCell;

    /// Records every call and answers with a canned result
    struct CannedService {
        answer: Result<Prediction, BridgeError>,
        calls: RefCell<Vec<(String, PredictionPayload)>>,
    }

    impl CannedService {
        fn new(answer: Result<Prediction, BridgeError>) -> Self {
            CannedService {
                answer,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PredictionService for CannedService {
        fn predict(&self, url: &str, payload: &PredictionPayload) -> Result<Prediction, BridgeError> {
            self.calls.borrow_mut().push((url.to_string(), payload.clone()));
            self.answer.clone()
        }
    }

    fn focus_field(form: &mut FormState, field: EditableField) {
        form.set_focus(Control::Field(field));
    }

    #[test]
    fn test_focus_cycles_through_every_control() {
        let mut form = FormState::new("http://localhost:8000/invocations");
        let total = Control::all().len();

        for _ in 0..total {
            form.focus_next();
        }
        assert_eq!(form.focus(), Control::Url);

        form.focus_previous();
        assert_eq!(form.focus(), Control::Predict);
    }

    #[test]
    fn test_typing_into_number_input_updates_record() {
        let mut form = FormState::new("http://localhost:8000/invocations");
        focus_field(&mut form, EditableField::LotArea);

        for _ in 0..4 {
            form.backspace();
        }
        for c in "12000".chars() {
            form.input_char(c);
        }

        assert_eq!(form.field_text(EditableField::LotArea), "12000");
        assert_eq!(form.inputs().lot_area, 12000);

        form.focus_next();
        assert_eq!(form.record().get("Lot Area"), Some(FeatureValue::Int(12000)));
    }

    #[test]
    fn test_unparseable_text_reverts_to_previous_value() {
        let mut form = FormState::new("http://localhost:8000/invocations");
        focus_field(&mut form, EditableField::YearBuilt);

        for _ in 0..4 {
            form.backspace();
        }
        form.input_char('-');
        form.focus_next();

        assert_eq!(form.inputs().year_built, 1961);
    }

    #[test]
    fn test_letters_are_ignored_in_number_inputs() {
        let mut form = FormState::new("http://localhost:8000/invocations");
        focus_field(&mut form, EditableField::GarageCars);

        form.input_char('x');
        form.input_char('3');

        assert_eq!(form.field_text(EditableField::GarageCars), "23");
    }

    #[test]
    fn test_slider_steps_within_range() {
        let mut form = FormState::new("http://localhost:8000/invocations");
        focus_field(&mut form, EditableField::OverallQual);

        for _ in 0..20 {
            form.step(1);
        }
        assert_eq!(form.inputs().overall_qual, 10);

        form.input_char('3');
        assert_eq!(form.inputs().overall_qual, 10);

        for _ in 0..20 {
            form.step(-1);
        }
        assert_eq!(form.inputs().overall_qual, 1);
    }

    #[test]
    fn test_url_editing() {
        let mut form = FormState::new("http://localhost:8000/invocations");

        for _ in 0.."invocations".len() {
            form.backspace();
        }
        for c in "predict".chars() {
            form.input_char(c);
        }

        assert_eq!(form.url, "http://localhost:8000/predict");
    }

    #[test]
    fn test_payload_toggle_with_space() {
        let mut form = FormState::new("http://localhost:8000/invocations");
        form.set_focus(Control::ShowPayload);

        form.input_char(' ');
        assert!(form.show_payload);
        assert!(form.payload_json().contains("\"dataframe_records\""));

        form.input_char(' ');
        assert!(!form.show_payload);
    }

    #[test]
    fn test_submit_sends_current_values_once() {
        let service = CannedService::new(Ok(Prediction::Price(181000.0)));
        let mut form = FormState::new("http://model:8000/invocations");
        form.set_value(EditableField::GarageCars, 4);

        let outcome = form.submit(&service);
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "$181,000.00");

        let calls = service.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "http://model:8000/invocations");
        assert_eq!(
            calls[0].1.dataframe_records[0].get("Garage Cars"),
            Some(FeatureValue::Int(4))
        );
    }

    #[test]
    fn test_submit_commits_pending_text() {
        let service = CannedService::new(Ok(Prediction::Price(1.0)));
        let mut form = FormState::new("http://model:8000/invocations");
        focus_field(&mut form, EditableField::GrLivArea);
        form.input_char('0');

        form.submit(&service);

        let calls = service.calls.borrow();
        assert_eq!(
            calls[0].1.dataframe_records[0].get("Gr Liv Area"),
            Some(FeatureValue::Int(17100))
        );
    }

    #[test]
    fn test_failed_submit_is_kept_as_outcome() {
        let service = CannedService::new(Err(BridgeError::Status {
            status: 500,
            body: "model crashed".to_string(),
        }));
        let mut form = FormState::new("http://model:8000/invocations");

        form.submit(&service);

        let outcome = form.last_outcome().unwrap();
        assert!(!outcome.is_success());
        assert!(outcome.message().contains("500"));
        assert!(outcome.message().contains("model crashed"));
    }
}
