#![no_main]

use comprobante::core::SummaryStatus;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Errors are expected; panics are bugs.
        let _ = comprobante::ubl::summary_line_from_xml(s, SummaryStatus::Add);
    }
});
