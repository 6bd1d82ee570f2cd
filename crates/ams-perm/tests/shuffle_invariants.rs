use ams_core::rng::RngHandle;
use ams_frame::ContingencyTable;
use ams_perm::{observations, reference_table, shuffle_table};
use proptest::prelude::*;

fn table_strategy() -> impl Strategy<Value = ContingencyTable> {
    (1usize..4, 1usize..4)
        .prop_flat_map(|(rows, columns)| {
            prop::collection::vec(prop::collection::vec(0i64..6, columns), rows)
        })
        .prop_filter("at least one observation", |counts| {
            counts.iter().flatten().sum::<i64>() > 0
        })
        .prop_map(|counts| {
            let rows = (0..counts.len()).map(|idx| format!("r{idx}")).collect();
            let columns = (0..counts[0].len()).map(|idx| format!("c{idx}")).collect();
            ContingencyTable::new(rows, columns, counts).unwrap()
        })
}

proptest! {
    #[test]
    fn shuffling_preserves_marginals(table in table_strategy(), seed in any::<u64>()) {
        let shuffled = shuffle_table(&table, &mut RngHandle::from_seed(seed)).unwrap();
        prop_assert_eq!(shuffled.rows(), table.rows());
        prop_assert_eq!(shuffled.columns(), table.columns());
        prop_assert_eq!(shuffled.row_sums(), table.row_sums());
        prop_assert_eq!(shuffled.column_sums(), table.column_sums());
    }

    #[test]
    fn observations_match_the_total(table in table_strategy()) {
        prop_assert_eq!(observations(&table).len() as i64, table.total());
    }
}

#[test]
fn reference_shuffle_keeps_axis_names() {
    let table = reference_table().unwrap();
    let shuffled = shuffle_table(&table, &mut RngHandle::from_seed(7)).unwrap();
    assert_eq!(shuffled.index_name(), Some("AMS"));
    assert_eq!(shuffled.columns_name(), Some("Drug"));
    assert_eq!(shuffled.total(), 100);
}

#[test]
fn same_seed_same_table() {
    let table = reference_table().unwrap();
    let a = shuffle_table(&table, &mut RngHandle::from_seed(42)).unwrap();
    let b = shuffle_table(&table, &mut RngHandle::from_seed(42)).unwrap();
    assert_eq!(a, b);
}
