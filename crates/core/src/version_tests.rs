// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    simple_numeric = { "1.2.3", "1.2.10", Ordering::Less },
    equal = { "1.64.121", "1.64.121", Ordering::Equal },
    shorter_prefix_is_less = { "1.2", "1.2.1", Ordering::Less },
    numeric_beats_alpha_suffix = { "1.2.3", "1.2.rc", Ordering::Greater },
    double_digit_vs_single = { "18.15", "9.0", Ordering::Greater },
)]
fn ordering_matches_expectation(a: &str, b: &str, expected: Ordering) {
    assert_eq!(LooseVersion::parse(a).cmp(&LooseVersion::parse(b)), expected);
}

#[test]
fn picks_highest_among_several() {
    let versions = ["1.0.0", "1.64.121", "1.9.0"].map(LooseVersion::parse);
    let highest = versions.iter().max().unwrap();
    assert_eq!(*highest, LooseVersion::parse("1.64.121"));
}
