use std::path::Path;
use wptriage_log::ir::{ComponentType, Priority};
use wptriage_log::{ErrorLogAnalyzer, MemorySink};

fn analyze_fixture() -> wptriage_log::Analysis {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/example.com-error.log");
    let analyzer = ErrorLogAnalyzer::new(path).unwrap();
    let mut sink = MemorySink::new();
    let analysis = analyzer.analyze(&mut sink).unwrap();
    assert_eq!(sink.parse_failures(), 0);
    analysis
}

#[test]
fn test_fixture_records() {
    let analysis = analyze_fixture();

    assert_eq!(analysis.source_id, "example.com");
    assert_eq!(analysis.lines_read, 8);
    assert_eq!(analysis.error_lines, 6);
    assert_eq!(analysis.records.len(), 6);

    let levels: Vec<&str> = analysis
        .records
        .iter()
        .map(|r| r.error_level.as_str())
        .collect();
    assert_eq!(
        levels,
        ["php", "proxy_fcgi", "authz_core", "php", "core", "php"]
    );

    let astra = &analysis.records[1];
    assert_eq!(astra.component_type, ComponentType::Theme);
    assert_eq!(astra.component_name, "astra");
    assert_eq!(astra.line_number.as_deref(), Some("17"));
    assert_eq!(
        astra.suggested_resolution,
        "Verify array keys and data structure in astra"
    );
    assert!(astra.error_message.starts_with("PHP Warning:  Undefined array key"));

    let denied = &analysis.records[2];
    assert_eq!(denied.priority, Priority::High);
    assert_eq!(denied.component_type, ComponentType::Core);
    assert_eq!(
        denied.suggested_resolution,
        "Check server configuration and access permissions"
    );

    let fatal = &analysis.records[3];
    assert_eq!(fatal.component_name, "woocommerce");
    assert_eq!(fatal.line_number, None);
    assert_eq!(
        fatal.suggested_resolution,
        "Critical review needed for woocommerce"
    );

    let untimed = &analysis.records[5];
    assert_eq!(untimed.timestamp, None);
    assert_eq!(untimed.component_name, "my-plugin");
    assert_eq!(untimed.suggested_resolution, "Investigate and review code");
}

#[test]
fn test_fixture_summary() {
    let summary = analyze_fixture().summary;

    assert_eq!(summary.total, 6);
    assert_eq!(summary.by_priority.get(&Priority::High), Some(&1));
    assert_eq!(summary.by_priority.get(&Priority::Low), Some(&5));
    assert_eq!(summary.by_priority.get(&Priority::Medium), None);
    assert_eq!(
        summary.top_components(),
        vec![
            ("WordPress Core", 2),
            ("my-plugin", 2),
            ("astra", 1),
            ("woocommerce", 1),
        ]
    );
}
