use crate::FormError;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use wf_domain::{FieldOption, FieldSpec};

pub type FormValues = IndexMap<String, serde_json::Value>;

/// A populator maps the current form-value snapshot to a fresh option list
/// for the field it's attached to. It's a plain closure rather than a
/// trait object hierarchy — a populator is a pure function of the
/// snapshot and nothing else, so there's no state to own.
pub type Populator = Arc<dyn Fn(&FormValues) -> Result<Vec<FieldOption>, String> + Send + Sync>;

/// Built, validated description of a form: field declarations plus the
/// dependency DAG derived from `depends_on`, with dependents precomputed
/// in declared order so `update_field` never has to re-derive them.
pub struct FormSpec {
    fields: IndexMap<String, FieldSpec>,
    populators: IndexMap<String, Populator>,
    // direct dependents of a field, in the order those dependents were declared
    dependents: IndexMap<String, Vec<String>>,
}

impl FormSpec {
    pub fn build(fields: Vec<FieldSpec>, populators: IndexMap<String, Populator>) -> Result<Self, FormError> {
        let mut by_name: IndexMap<String, FieldSpec> = IndexMap::new();
        for field in fields {
            if by_name.contains_key(&field.name) {
                return Err(FormError::DuplicateField(field.name));
            }
            by_name.insert(field.name.clone(), field);
        }

        for field in by_name.values() {
            for parent in &field.depends_on {
                if !by_name.contains_key(parent) {
                    return Err(FormError::UnknownDependency { field: field.name.clone(), parent: parent.clone() });
                }
            }
        }

        let mut dependents: IndexMap<String, Vec<String>> = IndexMap::new();
        for field in by_name.values() {
            for parent in &field.depends_on {
                dependents.entry(parent.clone()).or_default().push(field.name.clone());
            }
        }

        detect_cycle(&by_name)?;

        Ok(Self { fields: by_name, populators, dependents })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn direct_dependents(&self, name: &str) -> &[String] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All fields transitively downstream of `name`, in the order they'd be
    /// encountered walking dependents breadth-first from their declared
    /// order — "dependents are processed in the order they appear in the
    /// original spec; ties broken by stable declared order".
    pub fn transitive_dependents(&self, name: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<String> = self.direct_dependents(name).to_vec().into();
        let mut ordered = Vec::new();
        while let Some(f) = queue.pop_front() {
            if visited.insert(f.clone()) {
                for d in self.direct_dependents(&f) {
                    queue.push_back(d.clone());
                }
                ordered.push(f);
            }
        }
        ordered
    }

    pub fn populator(&self, name: &str) -> Option<&Populator> {
        self.populators.get(name)
    }
}

fn detect_cycle(fields: &IndexMap<String, FieldSpec>) -> Result<(), FormError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }
    let mut marks: IndexMap<&str, Mark> = fields.keys().map(|k| (k.as_str(), Mark::Unvisited)).collect();

    fn visit<'a>(name: &'a str, fields: &'a IndexMap<String, FieldSpec>, marks: &mut IndexMap<&'a str, Mark>) -> Result<(), FormError> {
        match marks.get(name).copied() {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => return Err(FormError::FormCycle(name.to_string())),
            _ => {}
        }
        marks.insert(name, Mark::InProgress);
        if let Some(field) = fields.get(name) {
            for parent in &field.depends_on {
                visit(parent, fields, marks)?;
            }
        }
        marks.insert(name, Mark::Done);
        Ok(())
    }

    let names: Vec<&str> = fields.keys().map(String::as_str).collect();
    for name in names {
        visit(name, fields, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_domain::FieldKind;

    #[test]
    fn detects_unknown_dependency() {
        let fields = vec![FieldSpec::new("state", FieldKind::Select, "State").depends_on(["country"])];
        let err = FormSpec::build(fields, IndexMap::new()).unwrap_err();
        assert!(matches!(err, FormError::UnknownDependency { .. }));
    }

    #[test]
    fn detects_cycle() {
        let fields = vec![FieldSpec::new("a", FieldKind::Text, "A").depends_on(["b"]), FieldSpec::new("b", FieldKind::Text, "B").depends_on(["a"])];
        let err = FormSpec::build(fields, IndexMap::new()).unwrap_err();
        assert!(matches!(err, FormError::FormCycle(_)));
    }

    #[test]
    fn transitive_dependents_in_declared_order() {
        let fields = vec![
            FieldSpec::new("country", FieldKind::Select, "Country"),
            FieldSpec::new("state", FieldKind::Select, "State").depends_on(["country"]),
            FieldSpec::new("language", FieldKind::Select, "Language").depends_on(["state"]),
        ];
        let spec = FormSpec::build(fields, IndexMap::new()).unwrap();
        assert_eq!(spec.transitive_dependents("country"), vec!["state".to_string(), "language".to_string()]);
    }
}
