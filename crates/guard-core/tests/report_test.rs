use guard_core::report::{AnalysisReport, ReportError, Severity};

#[test]
fn minimal_report_parses() {
    let report = AnalysisReport::parse(br#"{"health_score": 0.9}"#).expect("parse");
    assert_eq!(report.health_score, 0.9);
    assert!(report.issues.is_empty());
    assert!(report.schema_version.is_none());

    let summary = report.summary();
    assert_eq!(summary.total_issues, 0);
    assert_eq!(summary.critical_issues, 0);
}

#[test]
fn summary_counts_critical_issues() {
    let raw = br#"{
        "health_score": 0.55,
        "issues": [
            {"severity": "critical", "message": "unsafe eval"},
            {"severity": "critical", "file": "src/lib.rs"},
            {"severity": "low"},
            {"severity": "info"}
        ]
    }"#;
    let summary = AnalysisReport::parse(raw).expect("parse").summary();
    assert_eq!(summary.total_issues, 4);
    assert_eq!(summary.critical_issues, 2);
    assert!(summary.critical_issues <= summary.total_issues);
}

#[test]
fn unknown_severity_counts_toward_total_only() {
    let raw = br#"{
        "health_score": 1.0,
        "issues": [{"severity": "catastrophic"}, {"severity": "critical"}]
    }"#;
    let report = AnalysisReport::parse(raw).expect("parse");
    assert_eq!(report.issues[0].severity, Severity::Unknown);

    let summary = report.summary();
    assert_eq!(summary.total_issues, 2);
    assert_eq!(summary.critical_issues, 1);
}

#[test]
fn unknown_top_level_fields_are_ignored() {
    let raw = br#"{
        "health_score": 0.7,
        "issues": [],
        "analysis_duration_ms": 4200,
        "recommendations": ["split module"]
    }"#;
    let report = AnalysisReport::parse(raw).expect("unknown fields should be ignored");
    assert_eq!(report.health_score, 0.7);
}

#[test]
fn schema_version_is_accepted() {
    let raw = br#"{"schema_version": "2", "health_score": 0.8}"#;
    let report = AnalysisReport::parse(raw).expect("parse");
    assert_eq!(report.schema_version.as_deref(), Some("2"));
}

#[test]
fn issue_fields_beyond_the_contract_are_ignored() {
    let raw = br#"{
        "health_score": 0.8,
        "issues": [{"severity": "high", "line": 14, "rule_id": "RS0001"}]
    }"#;
    let report = AnalysisReport::parse(raw).expect("parse");
    assert_eq!(report.issues[0].severity, Severity::High);
}

#[test]
fn missing_health_score_is_malformed() {
    let err = AnalysisReport::parse(br#"{"issues": []}"#).expect_err("should fail");
    assert!(matches!(err, ReportError::Malformed(_)));
}

#[test]
fn invalid_json_is_malformed() {
    let err = AnalysisReport::parse(b"not json at all").expect_err("should fail");
    assert!(matches!(err, ReportError::Malformed(_)));
}

#[test]
fn out_of_range_health_score_violates_contract() {
    for raw in [
        br#"{"health_score": 1.5}"#.as_slice(),
        br#"{"health_score": -0.1}"#.as_slice(),
    ] {
        let err = AnalysisReport::parse(raw).expect_err("should fail");
        assert!(matches!(err, ReportError::Contract(_)));
    }
}

#[test]
fn boundary_scores_are_accepted() {
    for (raw, expected) in [
        (br#"{"health_score": 0.0}"#.as_slice(), 0.0),
        (br#"{"health_score": 1.0}"#.as_slice(), 1.0),
    ] {
        let report = AnalysisReport::parse(raw).expect("boundary score should parse");
        assert_eq!(report.health_score, expected);
    }
}
