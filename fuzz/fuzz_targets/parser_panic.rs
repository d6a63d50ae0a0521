#![no_main]
use libfuzzer_sys::fuzz_target;
use wptriage_log::{ErrorLogAnalyzer, MemorySink};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes, including invalid UTF-8, must never panic the analyzer.
    let analyzer = ErrorLogAnalyzer::new("fuzz-error.log").unwrap();
    let mut sink = MemorySink::new();
    let analysis = analyzer.analyze_reader(data, &mut sink).unwrap();
    assert_eq!(
        analysis.records.len() + sink.parse_failures(),
        analysis.error_lines
    );
});
