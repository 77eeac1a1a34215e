//! # Lookup Primitives
//!
//! Fixed constants shared by the loader, the search engine and the
//! integrity validator. Table and field names here are the ones the
//! standards corpus uses.

// =============================================================================
// FIELD AND TABLE NAMES
// =============================================================================

/// Record-side wildcard: a field holding this value matches any query value.
pub const WILDCARD: &str = "Any";

/// The human-readable identifier field.
pub const NAME_FIELD: &str = "name";

/// Key of the object that wraps a table's rows (`{"table": [...]}`).
pub const TABLE_WRAPPER_KEY: &str = "table";

/// Lower (exclusive) capacity bound field.
pub const MIN_CAPACITY_FIELD: &str = "minimum_capacity";

/// Upper (inclusive) capacity bound field.
pub const MAX_CAPACITY_FIELD: &str = "maximum_capacity";

/// Lower (exclusive) date bound field.
pub const START_DATE_FIELD: &str = "start_date";

/// Upper (inclusive) date bound field.
pub const END_DATE_FIELD: &str = "end_date";

pub const SCHEDULES_TABLE: &str = "schedules";
pub const SPACE_TYPES_TABLE: &str = "space_types";
pub const CONSTRUCTIONS_TABLE: &str = "constructions";
pub const CONSTRUCTION_SETS_TABLE: &str = "construction_sets";

/// Ordered layer list of a construction.
pub const MATERIALS_FIELD: &str = "materials";

// =============================================================================
// CAPACITY BANDING
// =============================================================================

/// Whole-number capacities are inflated by this factor before comparison.
pub const CAPACITY_ROUND_UP: f64 = 1.01;

/// Applied once when no capacity band matched.
pub const CAPACITY_ROUND_DOWN: f64 = 0.99;

// =============================================================================
// INTEGRITY RULES
// =============================================================================

/// Tables where repeated names are allowed.
pub const NAME_EXEMPT_TABLES: &[&str] = &[SCHEDULES_TABLE];

/// `space_types` fields that must name a row of `schedules`.
pub const SCHEDULE_REFERENCE_FIELDS: &[&str] = &[
    "lighting_schedule",
    "occupancy_schedule",
    "occupancy_activity_schedule",
    "infiltration_schedule",
    "electric_equipment_schedule",
    "gas_equipment_schedule",
    "heating_setpoint_schedule",
    "cooling_setpoint_schedule",
];

/// `construction_sets` field pairs whose constructions must be layer mirrors.
///
/// Floors and ceilings are two sides of the same assembly; every other
/// interior construction is seen from both sides and must mirror itself.
pub const REVERSE_CONSTRUCTION_PAIRS: &[(&str, &str)] = &[
    (
        "interior_operable_window_construction",
        "interior_operable_window_construction",
    ),
    (
        "interior_fixed_window_construction",
        "interior_fixed_window_construction",
    ),
    ("interior_wall_construction", "interior_wall_construction"),
    ("interior_door_construction", "interior_door_construction"),
    ("interior_floor_construction", "interior_ceiling_construction"),
];

/// Fields identifying a construction set in violation messages.
pub const CONSTRUCTION_SET_CONTEXT_FIELDS: &[&str] =
    &["template", "building_type", "space_type", "climate_zone_set"];

/// Fields identifying a space type when it has no `name`.
pub const SPACE_TYPE_CONTEXT_FIELDS: &[&str] = &["template", "building_type", "space_type"];

/// Characters never allowed in a `name` (names are serialized comma-delimited).
pub const FORBIDDEN_NAME_CHARS: &[char] = &[','];

// =============================================================================
// LOADING
// =============================================================================

/// The standard table files, in load order. Later files win per table name.
pub const DEFAULT_TABLE_FILES: &[&str] = &[
    "templates.json",
    "boilers.json",
    "chillers.json",
    "climate_zone_sets.json",
    "climate_zones.json",
    "construction_properties.json",
    "construction_sets.json",
    "constructions.json",
    "curves.json",
    "economizers.json",
    "fans.json",
    "furnaces.json",
    "heat_pumps.json",
    "heat_pumps_heating.json",
    "heat_rejection.json",
    "materials.json",
    "motors.json",
    "prototype_inputs.json",
    "schedules.json",
    "space_types.json",
    "unitary_acs.json",
    "water_heaters.json",
];

/// Maximum size of a single table file (100 MB).
pub const MAX_TABLE_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_factors_bracket_one() {
        assert!(CAPACITY_ROUND_UP > 1.0);
        assert!(CAPACITY_ROUND_DOWN < 1.0);
    }

    #[test]
    fn floors_pair_with_ceilings() {
        assert!(
            REVERSE_CONSTRUCTION_PAIRS
                .contains(&("interior_floor_construction", "interior_ceiling_construction"))
        );
        assert_eq!(REVERSE_CONSTRUCTION_PAIRS.len(), 5);
    }

    #[test]
    fn schedules_is_name_exempt() {
        assert_eq!(NAME_EXEMPT_TABLES, &["schedules"]);
    }
}
