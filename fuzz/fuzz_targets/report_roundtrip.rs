#![no_main]
use libfuzzer_sys::fuzz_target;
use wptriage_log::LineParser;
use wptriage_log::report::{parse_report, write_csv};

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data).replace(['\n', '\r'], " ");
    let Ok(record) = LineParser::new("fuzz").parse_line(&line) else {
        return;
    };
    let mut out = Vec::new();
    write_csv(std::slice::from_ref(&record), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(parse_report(&text).unwrap(), vec![record]);
});
