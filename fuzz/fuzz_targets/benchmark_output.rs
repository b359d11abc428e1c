#![no_main]

use benchgate::ingest::parse_benchmark_output;
use benchgate::summary::RunId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the parser or the aggregation behind it
    if let Ok(groups) = parse_benchmark_output(data) {
        for group in &groups {
            let _ = group.summarize(RunId(1));
        }
    }
});
