use crate::{FormError, FormSpec, FormValues};
use std::collections::HashMap;
use wf_domain::{is_blank, values_equivalent, FieldOption};

/// Live state of one form: values entered so far, the current option list
/// per field (mutated by cascading populators), and per-field validation
/// errors from the last validation pass.
///
/// Owns its form exclusively, as Section 5 requires — there is no shared
/// mutable access; every mutation goes through `update_field`.
pub struct FormInstance<'spec> {
    spec: &'spec FormSpec,
    bound: FormValues,
    incremental: FormValues,
    options: HashMap<String, Vec<FieldOption>>,
    errors: HashMap<String, Vec<String>>,
}

impl<'spec> FormInstance<'spec> {
    pub fn new(spec: &'spec FormSpec, bound: FormValues) -> Self {
        let options = spec.fields().map(|f| (f.name.clone(), f.options.clone())).collect();
        Self { spec, bound, incremental: FormValues::new(), options, errors: HashMap::new() }
    }

    /// Resolution order: incremental store > bound data > declared default.
    pub fn get_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.incremental.get(name).or_else(|| self.bound.get(name)).or_else(|| self.spec.field(name).and_then(|f| f.default.as_ref()))
    }

    pub fn options(&self, name: &str) -> &[FieldOption] {
        self.options.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn errors_for(&self, name: &str) -> &[String] {
        self.errors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn snapshot(&self) -> FormValues {
        let mut out = FormValues::new();
        for field in self.spec.fields() {
            if let Some(v) = self.get_value(&field.name) {
                out.insert(field.name.clone(), v.clone());
            }
        }
        out
    }

    fn clear_field(&mut self, name: &str) {
        self.incremental.shift_remove(name);
        self.options.insert(name.to_string(), Vec::new());
        self.errors.remove(name);
    }

    /// Implements 4.2's `update_field` contract: a no-op value assignment
    /// only refreshes bookkeeping; an actual change clears every transitive
    /// dependent, repopulates direct dependents from the new snapshot, and
    /// validates the changed field.
    pub fn update_field(&mut self, name: &str, value: serde_json::Value) -> Result<(), FormError> {
        if self.spec.field(name).is_none() {
            return Err(FormError::UnknownField(name.to_string()));
        }

        let current = self.get_value(name).cloned();
        if values_equivalent(current.as_ref(), Some(&value)) {
            self.incremental.insert(name.to_string(), value);
            return Ok(());
        }

        self.incremental.insert(name.to_string(), value);

        for dependent in self.spec.transitive_dependents(name) {
            self.clear_field(&dependent);
        }

        let snapshot = self.snapshot();
        let mut failure: Option<FormError> = None;
        for dependent in self.spec.direct_dependents(name) {
            if let Some(populator) = self.spec.populator(dependent) {
                match populator(&snapshot) {
                    Ok(options) => {
                        self.options.insert(dependent.clone(), options);
                    }
                    Err(message) => {
                        self.options.insert(dependent.clone(), Vec::new());
                        failure.get_or_insert_with(|| FormError::PopulatorFailed(dependent.clone(), message));
                    }
                }
            }
        }

        self.errors.insert(name.to_string(), self.validate_field(name));
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn validate_field(&self, name: &str) -> Vec<String> {
        let Some(field) = self.spec.field(name) else {
            return Vec::new();
        };
        let mut errors = Vec::new();
        if field.required && is_blank(self.get_value(name)) {
            errors.push(format!("{} is required", field.label));
        }
        errors
    }

    pub fn full_validate(&mut self) -> HashMap<String, Vec<String>> {
        let mut report = HashMap::new();
        let names: Vec<String> = self.spec.fields().map(|f| f.name.clone()).collect();
        for name in names {
            let errs = self.validate_field(&name);
            if !errs.is_empty() {
                report.insert(name.clone(), errs.clone());
            }
            self.errors.insert(name, errs);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap as Map;
    use serde_json::json;
    use wf_domain::{FieldKind, FieldSpec};

    fn cascade_spec() -> FormSpec {
        let mut populators: Map<String, crate::spec::Populator> = Map::new();
        populators.insert(
            "state".to_string(),
            std::sync::Arc::new(|values: &FormValues| {
                match values.get("country").and_then(|v| v.as_str()) {
                    Some("india") => Ok(vec![FieldOption { value: "mh".into(), text: "Maharashtra".into() }]),
                    Some("usa") => Ok(vec![FieldOption { value: "ca".into(), text: "California".into() }]),
                    _ => Ok(vec![]),
                }
            }),
        );
        populators.insert(
            "language".to_string(),
            std::sync::Arc::new(|values: &FormValues| {
                match values.get("state").and_then(|v| v.as_str()) {
                    Some("mh") => Ok(vec![FieldOption { value: "mr".into(), text: "Marathi".into() }]),
                    _ => Ok(vec![]),
                }
            }),
        );
        FormSpec::build(
            vec![
                FieldSpec::new("country", FieldKind::Select, "Country"),
                FieldSpec::new("state", FieldKind::Select, "State").depends_on(["country"]),
                FieldSpec::new("language", FieldKind::Select, "Language").depends_on(["state"]),
            ],
            populators,
        )
        .unwrap()
    }

    #[test]
    fn cascades_on_change_and_skips_on_no_op() {
        let spec = cascade_spec();
        let mut form = FormInstance::new(&spec, Map::new());

        form.update_field("country", json!("india")).unwrap();
        assert_eq!(form.options("state").first().unwrap().value, "mh");
        assert!(form.options("language").is_empty());

        form.update_field("state", json!("mh")).unwrap();
        assert_eq!(form.options("language").first().unwrap().value, "mr");

        // no-op: reassigning the same value must not clear language's options
        form.update_field("state", json!("mh")).unwrap();
        assert_eq!(form.options("language").first().unwrap().value, "mr");

        // changing country again clears state and language
        form.update_field("country", json!("usa")).unwrap();
        assert_eq!(form.options("state").first().unwrap().value, "ca");
        assert!(form.options("language").is_empty());
    }

    #[test]
    fn populator_failure_reports_field_and_empties_options() {
        let mut populators: Map<String, crate::spec::Populator> = Map::new();
        populators.insert("state".to_string(), std::sync::Arc::new(|_: &FormValues| Err("boom".to_string())));
        let spec = FormSpec::build(vec![FieldSpec::new("country", FieldKind::Select, "Country"), FieldSpec::new("state", FieldKind::Select, "State").depends_on(["country"])], populators).unwrap();
        let mut form = FormInstance::new(&spec, Map::new());
        let err = form.update_field("country", json!("india")).unwrap_err();
        match err {
            FormError::PopulatorFailed(field, _) => assert_eq!(field, "state"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(form.options("state").is_empty());
    }

    #[test]
    fn all_direct_dependents_repopulate_even_when_one_populator_fails() {
        let mut populators: Map<String, crate::spec::Populator> = Map::new();
        populators.insert("state".to_string(), std::sync::Arc::new(|_: &FormValues| Err("boom".to_string())));
        populators.insert("currency".to_string(), std::sync::Arc::new(|_: &FormValues| Ok(vec![FieldOption { value: "inr".into(), text: "Rupee".into() }])));
        let spec = FormSpec::build(
            vec![
                FieldSpec::new("country", FieldKind::Select, "Country"),
                FieldSpec::new("state", FieldKind::Select, "State").depends_on(["country"]),
                FieldSpec::new("currency", FieldKind::Select, "Currency").depends_on(["country"]),
            ],
            populators,
        )
        .unwrap();
        let mut form = FormInstance::new(&spec, Map::new());
        let err = form.update_field("country", json!("india")).unwrap_err();
        match err {
            FormError::PopulatorFailed(field, _) => assert_eq!(field, "state"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(form.options("state").is_empty());
        assert_eq!(form.options("currency").first().unwrap().value, "inr");
    }
}
