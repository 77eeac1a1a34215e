//! # Table Views
//!
//! Typed, borrowed accessors over generic records for the tables the
//! integrity checks inspect. Views never copy a record and never fail: an
//! absent or null field simply reads as `None`.

use crate::primitives::{
    CONSTRUCTION_SET_CONTEXT_FIELDS, MATERIALS_FIELD, SPACE_TYPE_CONTEXT_FIELDS,
};
use crate::{Record, RecordStore};
use serde_json::Value;
use std::collections::HashMap;

/// A row of `space_types`.
#[derive(Debug, Clone, Copy)]
pub struct SpaceTypeView<'r>(pub &'r Record);

impl<'r> SpaceTypeView<'r> {
    /// Name, or `template/building_type/space_type` when unnamed.
    #[must_use]
    pub fn label(&self) -> String {
        self.0.label(SPACE_TYPE_CONTEXT_FIELDS)
    }

    /// Non-null schedule references among `fields`, as `(field, schedule name)`.
    pub fn schedule_references<'f, S: AsRef<str>>(
        &self,
        fields: &'f [S],
    ) -> impl Iterator<Item = (&'f str, &'r str)> + use<'f, 'r, S> {
        let record = self.0;
        fields.iter().filter_map(move |field| {
            let field = field.as_ref();
            record.str_field(field).map(|name| (field, name))
        })
    }
}

/// A row of `constructions`.
#[derive(Debug, Clone, Copy)]
pub struct ConstructionView<'r>(pub &'r Record);

impl<'r> ConstructionView<'r> {
    #[must_use]
    pub fn name(&self) -> Option<&'r str> {
        self.0.name()
    }

    /// Ordered layers, outside to inside. Empty when absent.
    #[must_use]
    pub fn layers(&self) -> &'r [Value] {
        match self.0.get(MATERIALS_FIELD) {
            Some(Value::Array(layers)) => layers,
            _ => &[],
        }
    }

    /// Whether this construction's layers are the exact reverse of `other`'s.
    #[must_use]
    pub fn mirrors(&self, other: &ConstructionView<'_>) -> bool {
        let ours = self.layers();
        let theirs = other.layers();
        ours.len() == theirs.len() && ours.iter().eq(theirs.iter().rev())
    }
}

/// A row of `construction_sets`.
#[derive(Debug, Clone, Copy)]
pub struct ConstructionSetView<'r>(pub &'r Record);

impl<'r> ConstructionSetView<'r> {
    /// Construction named by `field`, if non-null.
    #[must_use]
    pub fn construction(&self, field: &str) -> Option<&'r str> {
        self.0.str_field(field)
    }

    /// `template/building_type/space_type/climate_zone_set`.
    #[must_use]
    pub fn context(&self) -> String {
        CONSTRUCTION_SET_CONTEXT_FIELDS
            .iter()
            .map(|field| self.0.str_field(field).unwrap_or("-"))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Name -> record lookup for a name-keyed table. The first row wins.
#[derive(Debug, Clone, Default)]
pub struct NameIndex<'r> {
    by_name: HashMap<&'r str, &'r Record>,
}

impl<'r> NameIndex<'r> {
    /// Index the named records of a store.
    #[must_use]
    pub fn build(store: &'r RecordStore) -> Self {
        let mut by_name = HashMap::with_capacity(store.len());
        for record in store.records() {
            if let Some(name) = record.name() {
                by_name.entry(name).or_insert(record);
            }
        }
        Self { by_name }
    }

    /// Look up a record by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'r Record> {
        self.by_name.get(name).copied()
    }

    /// Whether a name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn mirrored_layers() {
        let a = record(json!({"name": "Wall-A", "materials": [1, 2, 3]}));
        let b = record(json!({"name": "Wall-B", "materials": [3, 2, 1]}));
        let c = record(json!({"name": "Wall-C", "materials": [3, 2, 2]}));
        assert!(ConstructionView(&a).mirrors(&ConstructionView(&b)));
        assert!(!ConstructionView(&a).mirrors(&ConstructionView(&c)));
    }

    #[test]
    fn symmetric_construction_mirrors_itself() {
        let wall = record(json!({"materials": ["Gypsum", "Air", "Gypsum"]}));
        let view = ConstructionView(&wall);
        assert!(view.mirrors(&view));
    }

    #[test]
    fn schedule_references_skip_nulls() {
        let space = record(json!({
            "name": "Office",
            "lighting_schedule": "Office Lights",
            "occupancy_schedule": null
        }));
        let fields = ["lighting_schedule", "occupancy_schedule", "gas_equipment_schedule"];
        let refs: Vec<_> = SpaceTypeView(&space).schedule_references(&fields).collect();
        assert_eq!(refs, vec![("lighting_schedule", "Office Lights")]);
    }

    #[test]
    fn construction_set_context() {
        let set = record(json!({
            "template": "90.1-2013",
            "building_type": "Office",
            "space_type": null,
            "climate_zone_set": "ClimateZone 1-8"
        }));
        assert_eq!(
            ConstructionSetView(&set).context(),
            "90.1-2013/Office/-/ClimateZone 1-8"
        );
    }

    #[test]
    fn name_index_keeps_first() {
        let store = RecordStore::new(vec![
            record(json!({"name": "A", "v": 1})),
            record(json!({"name": "A", "v": 2})),
        ]);
        let index = NameIndex::build(&store);
        assert_eq!(index.get("A").and_then(|r| r.get("v")), Some(&json!(1)));
        assert!(!index.contains("B"));
    }
}
