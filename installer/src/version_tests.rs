//! Unit tests for version parsing and ordering.

use super::*;
use rstest::rstest;

fn v(text: &str) -> Version {
    Version::parse(text).expect("valid version text")
}

#[rstest]
#[case::three_segments("go1.11.5")]
#[case::two_segments("go1.12")]
#[case::release_candidate("go1.18rc1")]
#[case::beta("go1.21beta1")]
#[case::no_prefix("1.21.0")]
fn parse_preserves_original_text(#[case] text: &str) {
    let version = v(text);
    assert_eq!(version.to_string(), text);
    assert_eq!(version.as_str(), text);
}

#[test]
fn parse_extracts_fields() {
    let version = v("go1.11.5");
    assert_eq!(version.major(), 1);
    assert_eq!(version.minor(), 11);
    assert_eq!(version.patch(), 5);
    assert_eq!(version.qualifier(), Qualifier::Stable);
    assert!(version.is_stable());
}

#[test]
fn parse_defaults_patch_to_zero() {
    assert_eq!(v("go1.12").patch(), 0);
}

#[rstest]
#[case::rc_on_minor("go1.18rc1", Qualifier::ReleaseCandidate(1))]
#[case::beta_on_minor("go1.21beta2", Qualifier::Beta(2))]
#[case::rc_on_patch("go1.21.0rc3", Qualifier::ReleaseCandidate(3))]
fn parse_reads_qualifier(#[case] text: &str, #[case] expected: Qualifier) {
    let version = v(text);
    assert_eq!(version.qualifier(), expected);
    assert!(!version.is_stable());
}

#[rstest]
#[case::single_segment("go1")]
#[case::mixed_markers("go1.2.3.4rc1beta2")]
#[case::mixed_markers_short("go1.2rc1beta2")]
#[case::empty("")]
#[case::prefix_only("go")]
#[case::four_segments("go1.2.3.4")]
#[case::marker_without_digits("go1.21rc")]
#[case::marker_without_number("go1.rc1")]
#[case::non_numeric("go1.x")]
#[case::signed("go1.+2")]
#[case::empty_segment("go1..2")]
#[case::qualifier_on_major("go1rc1.2")]
#[case::two_qualifiers("go1.2rc1.3rc2")]
#[case::qualifier_before_patch("go1.2rc1.3")]
#[case::overflow("go1.99999999999")]
fn parse_rejects_malformed_text(#[case] text: &str) {
    let result = Version::parse(text);
    assert!(
        matches!(result, Err(ParseError::MalformedVersion { .. })),
        "expected {text:?} to be rejected, got {result:?}"
    );
}

#[test]
fn parse_error_names_the_offending_text() {
    let err = Version::parse("go1").expect_err("single segment is malformed");
    assert!(err.to_string().contains("\"go1\""));
}

#[test]
fn from_str_matches_parse() {
    let parsed: Version = "go1.20".parse().expect("valid");
    assert_eq!(parsed, v("go1.20"));
}

#[rstest]
#[case::minor_beats_candidate("go1.3.0rc1", "go1.5.0")]
#[case::stable_beats_own_beta("go1.12.0beta1", "go1.12.0")]
#[case::numeric_minor("go1.9.0", "go1.10.0")]
#[case::stable_beats_own_candidate("go1.21rc1", "go1.21")]
#[case::candidate_beats_beta("go1.21beta2", "go1.21rc1")]
#[case::higher_candidate("go1.21rc1", "go1.21rc2")]
#[case::patch("go1.21.1", "go1.21.2")]
#[case::candidate_beats_older_minor("go1.20", "go1.21rc1")]
fn compare_orders_pairs(#[case] lower: &str, #[case] higher: &str) {
    let low = v(lower);
    let high = v(higher);
    assert_eq!(low.compare(&high), Ordering::Less);
    assert_eq!(high.compare(&low), Ordering::Greater);
    assert!(low < high);
}

#[test]
fn omitted_patch_equals_explicit_zero() {
    let short = v("go1.12");
    let long = v("go1.12.0");
    assert_eq!(short.compare(&long), Ordering::Equal);
    assert_eq!(short, long);
    assert_ne!(short.to_string(), long.to_string());
}

#[test]
fn compare_is_transitive_and_antisymmetric() {
    let versions: Vec<Version> = [
        "go1.19",
        "go1.21rc1",
        "go1.20",
        "go1.21beta1",
        "go1.21",
        "go1.20.3",
        "go1.9.7",
    ]
    .iter()
    .map(|text| v(text))
    .collect();

    for a in &versions {
        for b in &versions {
            assert_eq!(a.compare(b), b.compare(a).reverse(), "{a} vs {b}");
            for c in &versions {
                if a.compare(b) != Ordering::Greater && b.compare(c) != Ordering::Greater {
                    assert_ne!(a.compare(c), Ordering::Greater, "{a} <= {b} <= {c}");
                }
            }
        }
    }
}

#[test]
fn descending_sort_places_candidate_of_newer_minor_first() {
    let mut versions = vec![v("go1.20"), v("go1.21rc1"), v("go1.19")];
    versions.sort_by(|a, b| b.cmp(a));
    let texts: Vec<&str> = versions.iter().map(Version::as_str).collect();
    assert_eq!(texts, ["go1.21rc1", "go1.20", "go1.19"]);
}

#[test]
fn qualifier_display_matches_marker() {
    assert_eq!(Qualifier::ReleaseCandidate(2).to_string(), "rc2");
    assert_eq!(Qualifier::Beta(1).to_string(), "beta1");
    assert_eq!(Qualifier::Stable.to_string(), "");
}
