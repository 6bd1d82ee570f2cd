use ams_frame::{Axis, ContingencyTable, Value};

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn ams_table() -> ContingencyTable {
    ContingencyTable::new(
        labels(&["Had AMS", "No AMS"]),
        labels(&["Ginkgo", "Placebo"]),
        vec![vec![5, 17], vec![45, 33]],
    )
    .unwrap()
}

#[test]
fn totals_and_marginals() {
    let table = ams_table();
    assert_eq!(table.total(), 100);
    assert_eq!(table.column_sums(), vec![50, 50]);
    assert_eq!(table.row_sums(), vec![22, 78]);
    assert_eq!(table.get("Had AMS", "Placebo"), Some(17));
    assert_eq!(table.get("Had AMS", "Aspirin"), None);
    assert_eq!(table.shape(), (2, 2));
}

#[test]
fn sum_series_is_labelled_by_the_remaining_axis() {
    let table = ams_table();
    let by_column = table.sum(Axis::Index);
    assert_eq!(by_column.index, vec![Value::from("Ginkgo"), Value::from("Placebo")]);
    assert_eq!(by_column.values, vec![Value::Int(50), Value::Int(50)]);

    let by_row = table.sum(Axis::Columns);
    assert_eq!(by_row.get(&Value::from("No AMS")), Some(&Value::Int(78)));
}

#[test]
fn invalid_shapes_are_rejected() {
    let ragged = ContingencyTable::new(
        labels(&["a", "b"]),
        labels(&["x", "y"]),
        vec![vec![1, 2], vec![3]],
    )
    .unwrap_err();
    assert_eq!(ragged.code(), "ragged-counts");

    let negative =
        ContingencyTable::new(labels(&["a"]), labels(&["x"]), vec![vec![-1]]).unwrap_err();
    assert_eq!(negative.code(), "negative-count");

    let duplicate = ContingencyTable::new(
        labels(&["a", "a"]),
        labels(&["x"]),
        vec![vec![1], vec![2]],
    )
    .unwrap_err();
    assert_eq!(duplicate.code(), "duplicate-label");

    let empty = ContingencyTable::new(vec![], labels(&["x"]), vec![]).unwrap_err();
    assert_eq!(empty.code(), "empty-table");
}

#[test]
fn equals_ignores_axis_names_but_not_order() {
    let named = ams_table().with_axis_names(Some("AMS".into()), Some("Drug".into()));
    assert!(named.equals(&ams_table()));

    let swapped = ContingencyTable::new(
        labels(&["No AMS", "Had AMS"]),
        labels(&["Ginkgo", "Placebo"]),
        vec![vec![45, 33], vec![5, 17]],
    )
    .unwrap();
    assert!(!swapped.equals(&ams_table()));
}

#[test]
fn deserialization_validates_counts() {
    let bad = br#"{"rows":["a"],"columns":["x","y"],"counts":[[1]]}"#;
    let err = serde_json::from_slice::<ContingencyTable>(bad).unwrap_err();
    assert!(err.to_string().contains("ragged-counts"));

    let good = br#"{"index_name":"AMS","rows":["a"],"columns":["x"],"counts":[[4]]}"#;
    let table: ContingencyTable = serde_json::from_slice(good).unwrap();
    assert_eq!(table.index_name(), Some("AMS"));
    assert_eq!(table.total(), 4);
}
