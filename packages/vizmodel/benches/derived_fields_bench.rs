use divan::{black_box, AllocProfiler, Bencher};
use serde_json::json;
use std::sync::Arc;
use vizmodel::{
    Column, DataTable, FieldType, KeyClassification, MappingField, Model, ModelType, VisualKeyType,
    VisualRoleMapping,
};

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

// --------------------------------------------------------------------------
// Fixtures
// --------------------------------------------------------------------------

/// A type with `roles` roles, alternating key and measure.
fn wide_type(roles: usize) -> Arc<ModelType> {
    (0..roles)
        .fold(
            ModelType::builder("bench/Wide").visual_key_type(VisualKeyType::DataKey),
            |builder, i| {
                let key = if i % 2 == 0 {
                    KeyClassification::Key
                } else {
                    KeyClassification::Measure
                };
                builder.visual_role(format!("role{}", i), key)
            },
        )
        .build()
        .expect("bench type")
}

fn table(columns: usize, rows: usize) -> DataTable {
    DataTable::new(
        (0..columns)
            .map(|c| Column::new(format!("f{}", c), FieldType::Number))
            .collect(),
    )
    .with_rows((0..rows).map(|r| vec![json!(r); columns]).collect())
}

/// Every role maps 4 fields out of a pool of 16, so roles overlap.
fn mapped_model(roles: usize) -> Model {
    let mut model = Model::new(wide_type(roles));
    let mut tx = model.transaction();
    tx.set_data(table(16, 100)).unwrap();
    for i in 0..roles {
        let key = if i % 2 == 0 {
            KeyClassification::Key
        } else {
            KeyClassification::Measure
        };
        let fields = (0..4).map(|f| MappingField::new(format!("f{}", (i * 3 + f) % 16)));
        tx.set_mapping(&format!("role{}", i), VisualRoleMapping::with_fields(key, fields))
            .unwrap();
    }
    tx.commit().unwrap();
    model
}

// --------------------------------------------------------------------------
// Benches
// --------------------------------------------------------------------------

#[divan::bench(args = [2, 8, 32])]
fn bench_derived_field_names(bencher: Bencher, roles: usize) {
    let model = mapped_model(roles);
    bencher.bench_local(|| {
        black_box(model.key_field_names());
        black_box(model.measure_field_names());
    });
}

#[divan::bench(args = [2, 8, 32], sample_count = 1_000, sample_size = 1)]
fn bench_data_commit_cascade(bencher: Bencher, roles: usize) {
    let replacement = Arc::new(table(16, 1_000));
    bencher
        .with_inputs(|| mapped_model(roles))
        .bench_local_values(|mut model| {
            let mut tx = model.transaction();
            tx.set_data(replacement.clone()).unwrap();
            black_box(tx.commit().unwrap());
            model
        });
}

#[divan::bench(sample_count = 1_000, sample_size = 1)]
fn bench_json_spec(bencher: Bencher) {
    let model = mapped_model(8);
    bencher.bench_local(|| black_box(serde_json::to_string(&model).unwrap()));
}
