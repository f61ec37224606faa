// Property-based tests for classification and count aggregation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use qatrack_analyzer::analyze::{analyze_column, analyze_sheet};
use qatrack_analyzer::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Mostly result-like words, sometimes glyphs, noise or blanks.
fn arb_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec![
            "Pass", "PASSED", "ok", "Fail", "failed", "error", "N/A", "n.a", "none",
            "not applicable", "skip", "✓", "✗", "Working", "not working",
        ])
        .prop_map(String::from),
        2 => r"[a-zA-Z /.]{0,12}",
        1 => Just(String::new()),
        1 => r"\s{1,3}",
    ]
}

fn arb_column(len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_cell(), 0..=len)
}

fn grid_from(columns: &[Vec<String>]) -> SheetGrid {
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    let headers = (0..columns.len()).map(|i| format!("Result {i}")).collect();
    let rows = (0..height)
        .map(|r| {
            columns
                .iter()
                .map(|c| c.get(r).map(|v| CellValue::from(v.as_str())).unwrap_or_default())
                .collect()
        })
        .collect();
    SheetGrid::new("Generated", headers, rows)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Every input classifies, and classification is deterministic.
    #[test]
    fn classify_is_total_and_stable(value in any::<String>()) {
        let first = classify(&value);
        prop_assert_eq!(first, classify(&value));
    }

    /// Surrounding whitespace and letter case never change the class.
    #[test]
    fn classify_ignores_case_and_padding(value in arb_cell(), pad in r"\s{0,3}") {
        let padded = format!("{pad}{}{pad}", value.to_uppercase());
        if value.to_uppercase().to_lowercase() == value.to_lowercase() {
            prop_assert_eq!(classify(&value), classify(&padded));
        }
    }

    /// Counts always partition the rows.
    #[test]
    fn column_counts_partition_rows(values in arb_column(60)) {
        let grid = grid_from(&[values.clone()]);
        let r = analyze_column(&grid, 0);
        prop_assert_eq!(r.total_rows, values.len());
        prop_assert_eq!(r.pass_count + r.fail_count + r.not_available_count + r.invalid_count, r.total_rows);
        prop_assert_eq!(r.total(), r.total_rows - r.invalid_count);
    }

    /// Combining columns is an elementwise, order-independent sum.
    #[test]
    fn combined_columns_sum(a in arb_column(30), b in arb_column(30)) {
        let grid = grid_from(&[a, b]);
        let ab = analyze_sheet(&grid, Some(&["A".to_string(), "B".to_string()]), &DetectionOptions::default());
        let ba = analyze_sheet(&grid, Some(&["B".to_string(), "A".to_string()]), &DetectionOptions::default());

        let expected = analyze_column(&grid, 0) + analyze_column(&grid, 1);
        prop_assert_eq!(ab.summary().copied(), Some(expected));
        prop_assert_eq!(ba.summary().copied(), Some(expected));
    }

    /// Percentages stay within bounds and sum to ~100 when there are valid tests.
    #[test]
    fn percentages_bounded(p in 0i64..500, f in 0i64..500, n in 0i64..500) {
        let t = Totals { pass_count: p, fail_count: f, not_available_count: n, total_tests: p + f + n };
        for pct in [t.pass_percentage(), t.fail_percentage(), t.not_available_percentage()] {
            prop_assert!((0.0..=100.0).contains(&pct));
        }
        if t.total_tests > 0 {
            let sum = t.pass_percentage() + t.fail_percentage() + t.not_available_percentage();
            prop_assert!((sum - 100.0).abs() < 0.02, "sum was {}", sum);
        }
    }

    /// Letter/index conversion round-trips for every column a sheet can have.
    #[test]
    fn column_letters_round_trip(index in 0usize..16_384) {
        let letter = column_index_to_letter(index);
        prop_assert_eq!(column_letter_to_index(&letter).unwrap(), index);
    }
}
