mod common;

use common::*;
use vizmodel::engine::{compute_key_field_names, compute_measure_field_names};
use vizmodel::{FieldType, KeyClassification, MappingField, Model, VisualKeyType, VisualRoleMapping};

fn names(list: Vec<smol_str::SmolStr>) -> Vec<String> {
    list.into_iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_repeated_key_fields_collapse_and_keys_shadow_measures() {
    let log = new_log();
    let mut model = setup();
    let mut tx = model.transaction();
    tx.set_mapping("rows", SpyMapping::new("rows", true, &["a", "b", "a"], &log))
        .unwrap();
    tx.set_mapping("measures", SpyMapping::new("measures", false, &["b", "c"], &log))
        .unwrap();
    tx.commit().unwrap();

    assert_eq!(names(model.key_field_names()), vec!["a", "b"]);
    assert_eq!(names(model.measure_field_names()), vec!["c"]);
}

#[test]
fn test_free_functions_match_accessors() {
    let log = new_log();
    let model = setup_with_spies(&log);
    assert_eq!(compute_key_field_names(&model), model.key_field_names());
    assert_eq!(compute_measure_field_names(&model), model.measure_field_names());
    assert_eq!(names(model.key_field_names()), vec!["country", "product"]);
    assert_eq!(names(model.measure_field_names()), vec!["sales"]);
}

#[test]
fn test_key_type_gates_both_lists() {
    for key_type in [VisualKeyType::Undefined, VisualKeyType::DataOrdinal] {
        let log = new_log();
        let mut model = Model::new(line_type_with(key_type));
        let mut tx = model.transaction();
        tx.set_mapping("rows", SpyMapping::new("rows", true, &["a"], &log))
            .unwrap();
        tx.set_mapping("measures", SpyMapping::new("measures", false, &["m"], &log))
            .unwrap();
        tx.commit().unwrap();

        assert!(model.key_field_names().is_empty());
        assert!(model.measure_field_names().is_empty());
    }
}

#[test]
fn test_lists_follow_current_mappings() {
    let mut model = setup();
    let mut tx = model.transaction();
    tx.set_mapping(
        "rows",
        VisualRoleMapping::with_fields(KeyClassification::Key, ["country"]),
    )
    .unwrap();
    tx.set_mapping(
        "measures",
        VisualRoleMapping::with_fields(KeyClassification::Measure, ["sales", "country"]),
    )
    .unwrap();
    tx.commit().unwrap();
    assert_eq!(names(model.measure_field_names()), vec!["sales"]);

    // Moving country out of the key role makes it a measure.
    let mut tx = model.transaction();
    tx.set_mapping(
        "rows",
        VisualRoleMapping::with_fields(KeyClassification::Key, ["product"]),
    )
    .unwrap();
    tx.commit().unwrap();

    assert_eq!(names(model.key_field_names()), vec!["product"]);
    assert_eq!(names(model.measure_field_names()), vec!["sales", "country"]);
}

#[test]
fn test_auto_roles_classify_by_field_type() {
    let mut model = setup();
    let mut tx = model.transaction();
    tx.set_mapping(
        "measures",
        VisualRoleMapping::with_fields(
            KeyClassification::Auto,
            [MappingField::typed("year", FieldType::Date)],
        ),
    )
    .unwrap();
    tx.set_mapping(
        "columns",
        VisualRoleMapping::with_fields(
            KeyClassification::Auto,
            [MappingField::typed("sales", FieldType::Number)],
        ),
    )
    .unwrap();
    tx.commit().unwrap();

    assert_eq!(names(model.key_field_names()), vec!["year"]);
    assert_eq!(names(model.measure_field_names()), vec!["sales"]);
}

#[test]
fn test_abstract_model_derives_nothing() {
    let model = Model::new(vizmodel::ModelType::base());
    assert!(model.key_field_names().is_empty());
    assert!(model.measure_field_names().is_empty());
}
