//! # Integrity Validator
//!
//! Consistency checks over a loaded corpus. Violations are data, not
//! errors: every check runs to completion and all findings are returned
//! in one ordered list.
//!
//! Checks, in report order:
//! 1. Name uniqueness (name-keyed tables, exempt tables skipped)
//! 2. Duplicate content ignoring `name`
//! 3. `space_types` schedule references resolve in `schedules`
//! 4. Paired interior constructions are layer mirrors
//! 5. Names contain no forbidden characters

use crate::formats::record_key;
use crate::primitives::{
    CONSTRUCTIONS_TABLE, CONSTRUCTION_SETS_TABLE, FORBIDDEN_NAME_CHARS, NAME_EXEMPT_TABLES,
    NAME_FIELD, REVERSE_CONSTRUCTION_PAIRS, SCHEDULE_REFERENCE_FIELDS, SCHEDULES_TABLE,
    SPACE_TYPES_TABLE,
};
use crate::views::{ConstructionSetView, ConstructionView, NameIndex, SpaceTypeView};
use crate::{Corpus, RecordStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

// =============================================================================
// VIOLATIONS
// =============================================================================

/// One integrity finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A name occurs more than once in a name-keyed table.
    DuplicateName {
        table: String,
        name: String,
        count: usize,
    },
    /// Rows identical apart from `name`.
    DuplicateContent {
        table: String,
        duplicates: usize,
        total: usize,
    },
    /// A space type references a schedule that does not exist.
    UnresolvedSchedule {
        space_type: String,
        field: String,
        schedule: String,
    },
    /// A construction set references a construction that does not exist.
    UnresolvedConstruction {
        context: String,
        field: String,
        construction: String,
    },
    /// Two paired constructions are not exact layer reverses.
    LayerMismatch {
        context: String,
        first: String,
        second: String,
    },
    /// A name contains a character reserved by downstream serialization.
    ForbiddenCharacter {
        table: String,
        name: String,
        character: char,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateName { table, name, count } => write!(
                f,
                "table '{}' has name '{}' repeated {} times",
                table, name, count
            ),
            Violation::DuplicateContent {
                table,
                duplicates,
                total,
            } => write!(
                f,
                "table '{}' has {} duplicate rows (ignoring name) out of {} rows",
                table, duplicates, total
            ),
            Violation::UnresolvedSchedule {
                space_type,
                field,
                schedule,
            } => write!(
                f,
                "space type '{}' {} '{}' not found in {}",
                space_type, field, schedule, SCHEDULES_TABLE
            ),
            Violation::UnresolvedConstruction {
                context,
                field,
                construction,
            } => write!(
                f,
                "construction set {} {} '{}' not found in {}",
                context, field, construction, CONSTRUCTIONS_TABLE
            ),
            Violation::LayerMismatch {
                context,
                first,
                second,
            } => write!(
                f,
                "construction set {}: layers of '{}' are not the reverse of '{}'",
                context, first, second
            ),
            Violation::ForbiddenCharacter {
                table,
                name,
                character,
            } => write!(
                f,
                "table '{}' name '{}' contains forbidden character '{}'",
                table, name, character
            ),
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Which tables and fields the checks look at.
///
/// `Default` is the standard battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Tables where repeated names are allowed.
    pub exempt_tables: BTreeSet<String>,
    /// `space_types` fields naming a schedule.
    pub schedule_fields: Vec<String>,
    /// `construction_sets` field pairs that must be layer mirrors.
    pub reverse_pairs: Vec<(String, String)>,
    /// Characters not allowed in names.
    pub forbidden_chars: Vec<char>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            exempt_tables: NAME_EXEMPT_TABLES.iter().map(|t| t.to_string()).collect(),
            schedule_fields: SCHEDULE_REFERENCE_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            reverse_pairs: REVERSE_CONSTRUCTION_PAIRS
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            forbidden_chars: FORBIDDEN_NAME_CHARS.to_vec(),
        }
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Runs the integrity battery over a corpus.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every check and collect all violations.
    #[must_use]
    pub fn validate(&self, corpus: &Corpus) -> Vec<Violation> {
        let mut violations = Vec::new();
        violations.extend(self.check_name_uniqueness(corpus));
        violations.extend(self.check_duplicate_content(corpus));
        violations.extend(self.check_schedule_references(corpus));
        violations.extend(self.check_reverse_constructions(corpus));
        violations.extend(self.check_forbidden_characters(corpus));
        tracing::info!(
            tables = corpus.len(),
            violations = violations.len(),
            "integrity check finished"
        );
        violations
    }

    /// Names must be unique within name-keyed, non-exempt tables.
    #[must_use]
    pub fn check_name_uniqueness(&self, corpus: &Corpus) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (table, store) in corpus.record_tables() {
            if self.config.exempt_tables.contains(table) || !store.has_names() {
                continue;
            }
            for (name, count) in repeated_names(store) {
                violations.push(Violation::DuplicateName {
                    table: table.to_string(),
                    name: name.to_string(),
                    count,
                });
            }
        }
        violations
    }

    /// No two rows of a table may be identical once `name` is stripped.
    #[must_use]
    pub fn check_duplicate_content(&self, corpus: &Corpus) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (table, store) in corpus.record_tables() {
            let total = store.len();
            let distinct: HashSet<String> = store
                .records()
                .iter()
                .map(|record| record_key(record, Some(NAME_FIELD)))
                .collect();
            let duplicates = total - distinct.len();
            if duplicates > 0 {
                violations.push(Violation::DuplicateContent {
                    table: table.to_string(),
                    duplicates,
                    total,
                });
            }
        }
        violations
    }

    /// Every non-null schedule reference of a space type must name a schedule.
    #[must_use]
    pub fn check_schedule_references(&self, corpus: &Corpus) -> Vec<Violation> {
        let Some(spaces) = record_table(corpus, SPACE_TYPES_TABLE) else {
            return Vec::new();
        };
        let schedule_names: HashSet<&str> = record_table(corpus, SCHEDULES_TABLE)
            .map(|store| {
                store
                    .records()
                    .iter()
                    .filter_map(|r| r.name())
                    .collect::<HashSet<&str>>()
            })
            .unwrap_or_default();

        let mut violations = Vec::new();
        for record in spaces.records() {
            let space = SpaceTypeView(record);
            for (field, schedule) in space.schedule_references(self.config.schedule_fields.as_slice()) {
                if !schedule_names.contains(schedule) {
                    violations.push(Violation::UnresolvedSchedule {
                        space_type: space.label(),
                        field: field.to_string(),
                        schedule: schedule.to_string(),
                    });
                }
            }
        }
        violations
    }

    /// Paired interior constructions must be exact layer reverses.
    #[must_use]
    pub fn check_reverse_constructions(&self, corpus: &Corpus) -> Vec<Violation> {
        let Some(sets) = record_table(corpus, CONSTRUCTION_SETS_TABLE) else {
            return Vec::new();
        };
        let constructions = record_table(corpus, CONSTRUCTIONS_TABLE)
            .map(NameIndex::build)
            .unwrap_or_default();

        let mut violations = Vec::new();
        for record in sets.records() {
            let set = ConstructionSetView(record);
            for (first_field, second_field) in &self.config.reverse_pairs {
                let first = set.construction(first_field);
                let second = set.construction(second_field);
                if first.is_none() && second.is_none() {
                    continue;
                }

                // a self-paired field is resolved once and compared with itself
                let sides: Vec<(&String, Option<&str>)> = if first_field == second_field {
                    vec![(first_field, first)]
                } else {
                    vec![(first_field, first), (second_field, second)]
                };

                let mut resolved = Vec::with_capacity(2);
                for &(field, name) in &sides {
                    match name.and_then(|n| constructions.get(n)) {
                        Some(found) => resolved.push(ConstructionView(found)),
                        None => violations.push(Violation::UnresolvedConstruction {
                            context: set.context(),
                            field: field.clone(),
                            construction: name.unwrap_or("null").to_string(),
                        }),
                    }
                }

                let pair = match resolved.as_slice() {
                    [only] if sides.len() == 1 => Some((*only, *only)),
                    [a, b] => Some((*a, *b)),
                    _ => None,
                };
                if let Some((a, b)) = pair
                    && !a.mirrors(&b)
                {
                    violations.push(Violation::LayerMismatch {
                        context: set.context(),
                        first: a.name().unwrap_or_default().to_string(),
                        second: b.name().unwrap_or_default().to_string(),
                    });
                }
            }
        }
        violations
    }

    /// Names must not contain forbidden characters.
    #[must_use]
    pub fn check_forbidden_characters(&self, corpus: &Corpus) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (table, store) in corpus.record_tables() {
            for record in store.records() {
                let Some(name) = record.name() else {
                    continue;
                };
                if let Some(character) = name.chars().find(|c| self.config.forbidden_chars.contains(c))
                {
                    violations.push(Violation::ForbiddenCharacter {
                        table: table.to_string(),
                        name: name.to_string(),
                        character,
                    });
                }
            }
        }
        violations
    }
}

/// Run the standard battery and render each violation as text.
#[must_use]
pub fn validate(corpus: &Corpus) -> Vec<String> {
    Validator::default()
        .validate(corpus)
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn record_table<'c>(corpus: &'c Corpus, name: &str) -> Option<&'c RecordStore> {
    corpus.get(name).and_then(|table| table.records())
}

/// Names occurring more than once, in order of first appearance.
fn repeated_names(store: &RecordStore) -> Vec<(&str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for name in store.records().iter().filter_map(|r| r.name()) {
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter_map(|name| {
            let count = counts.get(name).copied().unwrap_or(0);
            (count > 1).then_some((name, count))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn corpus(doc: Value) -> Corpus {
        Corpus::from_json_value(doc).unwrap()
    }

    #[test]
    fn repeated_name_reported_once() {
        let c = corpus(json!({"widgets": [
            {"name": "A", "v": 1}, {"name": "A", "v": 2}, {"name": "B", "v": 3}
        ]}));
        let found = Validator::default().check_name_uniqueness(&c);
        assert_eq!(
            found,
            vec![Violation::DuplicateName {
                table: "widgets".to_string(),
                name: "A".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn schedules_may_repeat_names() {
        let c = corpus(json!({"schedules": [
            {"name": "A", "day": 1}, {"name": "A", "day": 2}, {"name": "B", "day": 3}
        ]}));
        assert!(Validator::default().check_name_uniqueness(&c).is_empty());
    }

    #[test]
    fn duplicate_content_counts_per_table() {
        // the small table must report against its own row count
        let c = corpus(json!({
            "alpha": [{"v": 0}, {"v": 1}, {"v": 2}, {"v": 3}, {"v": 4}, {"v": 5}],
            "beta": [{"name": "X", "v": 1}, {"name": "Y", "v": 1}, {"name": "Z", "v": 2}]
        }));
        let found = Validator::default().check_duplicate_content(&c);
        assert_eq!(
            found,
            vec![Violation::DuplicateContent {
                table: "beta".to_string(),
                duplicates: 1,
                total: 3
            }]
        );
        assert!(found[0].to_string().contains("out of 3 rows"));
    }

    #[test]
    fn dangling_schedule_reported() {
        let c = corpus(json!({
            "schedules": [{"name": "Office Lights"}],
            "space_types": [{
                "name": "Office",
                "lighting_schedule": "Office Lights",
                "occupancy_schedule": "Office Occ",
                "infiltration_schedule": null
            }]
        }));
        let found = Validator::default().check_schedule_references(&c);
        assert_eq!(found.len(), 1);
        let text = found[0].to_string();
        assert!(text.contains("Office Occ"));
        assert!(text.contains("occupancy_schedule"));
    }

    #[test]
    fn floors_pair_with_ceilings() {
        let c = corpus(json!({
            "constructions": [
                {"name": "Floor", "materials": ["Carpet", "Slab", "Tile"]},
                {"name": "Ceiling", "materials": ["Tile", "Slab", "Carpet"]},
                {"name": "Bad Ceiling", "materials": ["Slab", "Tile", "Carpet"]}
            ],
            "construction_sets": [
                {"template": "T", "interior_floor_construction": "Floor", "interior_ceiling_construction": "Ceiling"},
                {"template": "U", "interior_floor_construction": "Floor", "interior_ceiling_construction": "Bad Ceiling"}
            ]
        }));
        let found = Validator::default().check_reverse_constructions(&c);
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0],
            Violation::LayerMismatch { context, first, second }
                if context.starts_with("U/") && first == "Floor" && second == "Bad Ceiling"
        ));
    }

    #[test]
    fn unresolved_construction_reported() {
        let c = corpus(json!({
            "constructions": [{"name": "Floor", "materials": ["Slab"]}],
            "construction_sets": [
                {"interior_floor_construction": "Floor", "interior_ceiling_construction": null},
                {"interior_wall_construction": "Ghost Wall"}
            ]
        }));
        let found = Validator::default().check_reverse_constructions(&c);
        assert_eq!(found.len(), 2, "{:?}", found);
        assert!(found.iter().any(|v| matches!(
            v,
            Violation::UnresolvedConstruction { construction, .. } if construction == "null"
        )));
        assert!(found.iter().any(|v| v.to_string().contains("Ghost Wall")));
    }

    #[test]
    fn each_unresolved_side_reported() {
        let c = corpus(json!({
            "constructions": [{"name": "Floor", "materials": ["Slab"]}],
            "construction_sets": [
                {"interior_floor_construction": "Lost Floor", "interior_ceiling_construction": "Lost Ceiling"}
            ]
        }));
        let found = Validator::default().check_reverse_constructions(&c);
        let fields: Vec<&str> = found
            .iter()
            .filter_map(|v| match v {
                Violation::UnresolvedConstruction { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec!["interior_floor_construction", "interior_ceiling_construction"]
        );
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn comma_in_name_reported() {
        let c = corpus(json!({"space_types": [{"name": "Office, Large"}, {"name": "Lobby"}]}));
        let found = Validator::default().check_forbidden_characters(&c);
        assert_eq!(found.len(), 1);
        let text = found[0].to_string();
        assert!(text.contains("space_types") && text.contains("Office, Large"));
    }

    #[test]
    fn checks_do_not_short_circuit() {
        let c = corpus(json!({
            "widgets": [{"name": "A,B"}, {"name": "A,B"}],
            "space_types": [{"name": "S", "lighting_schedule": "Missing"}]
        }));
        let found = validate(&c);
        // duplicate name, duplicate content, dangling schedule, two comma names
        assert_eq!(found.len(), 5, "{:?}", found);
    }

    #[test]
    fn clean_corpus_has_no_violations() {
        let c = corpus(json!({
            "schedules": [{"name": "Lights"}],
            "space_types": [{"name": "Office", "lighting_schedule": "Lights"}]
        }));
        assert!(validate(&c).is_empty());
    }

    #[test]
    fn violations_serialize_with_kind() {
        let v = Violation::ForbiddenCharacter {
            table: "t".to_string(),
            name: "a,b".to_string(),
            character: ',',
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "forbidden_character");
    }
}
