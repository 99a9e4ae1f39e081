use proptest::prelude::*;
use ufoq_core::ops::{
    aggregate, filter, parse_number, rank_within, top_k, AggregateOptions, AggregateSpec,
    Predicate, RankOptions,
};
use ufoq_core::{Table, Value};

fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Missing),
        "[a-c]{1,2}".prop_map(Value::text),
        (-50i64..50).prop_map(Value::Int),
        (-100.0f64..100.0).prop_map(Value::number),
    ]
}

fn table() -> impl Strategy<Value = Table> {
    prop::collection::vec(prop::collection::vec(cell(), 3), 0..40).prop_map(|rows| {
        Table::from_rows(["k1", "k2", "v"], rows).expect("rows have three cells")
    })
}

fn predicate() -> impl Strategy<Value = Predicate> {
    let leaf = prop_oneof![
        ("[a-c]{1,2}").prop_map(|s| Predicate::eq("k1", s.as_str())),
        (-50i64..50).prop_map(|n| Predicate::ge("v", n)),
        Just(Predicate::not_missing("k2")),
        (-50i64..50).prop_map(|n| Predicate::ne("v", n)),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Predicate::and),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Predicate::or),
            inner.prop_map(Predicate::not),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn coercion_never_panics(text in "\\PC{0,12}") {
        let value = parse_number(&text);
        prop_assert!(value.is_missing() || value.as_f64().is_some());
    }

    #[test]
    fn coercion_parses_numeric_grammar(n in -1.0e9f64..1.0e9, pad in " {0,2}") {
        let text = format!("{pad}{n}{pad}");
        prop_assert_eq!(parse_number(&text), Value::Number(n));
    }

    #[test]
    fn filter_is_idempotent(t in table(), p in predicate()) {
        let once = filter(&t, &p).unwrap();
        let twice = filter(&once, &p).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filter_keeps_relative_order(t in table(), p in predicate()) {
        let out = filter(&t, &p).unwrap();
        let mut rest = t.raw_rows().iter();
        for row in out.raw_rows() {
            prop_assert!(rest.any(|r| r == row), "output row out of order");
        }
    }

    #[test]
    fn count_sums_to_row_count(t in table(), two_keys in any::<bool>()) {
        let keys: Vec<String> = if two_keys {
            vec!["k1".to_string(), "k2".to_string()]
        } else {
            vec!["k1".to_string()]
        };
        let out = aggregate(&t, &keys, &[AggregateSpec::count_rows()], &AggregateOptions::default())
            .unwrap();
        let total: i64 = out
            .column("count")
            .unwrap()
            .into_iter()
            .map(|v| v.as_i64().unwrap())
            .sum();
        prop_assert_eq!(total, t.row_count() as i64);
    }

    #[test]
    fn top_k_never_exceeds_k(t in table(), k in 0usize..6) {
        let numeric = filter(&t, &Predicate::ge("v", -1000i64)).unwrap();
        let ranked = rank_within(&numeric, &RankOptions::new(vec!["k1".to_string()], "v").descending())
            .unwrap();
        let top = top_k(&ranked, k);
        for rank in top.column("rank").unwrap() {
            prop_assert!(rank.as_i64().unwrap() <= k as i64);
        }
        // every row ranked k or better survives
        let expected = ranked
            .table()
            .column("rank")
            .unwrap()
            .into_iter()
            .filter(|r| r.as_i64().unwrap() <= k as i64)
            .count();
        prop_assert_eq!(top.row_count(), expected);
    }
}
