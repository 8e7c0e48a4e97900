#![no_main]

use libfuzzer_sys::fuzz_target;

use reunite_types::{Case, CaseId, Evidence};

// Decoding untrusted bytes as stored cases, wire evidence or case ids must
// fail cleanly, never panic. Whatever decodes must re-encode.
fuzz_target!(|data: &[u8]| {
    if let Ok(case) = bincode::deserialize::<Case>(data) {
        let bytes = bincode::serialize(&case).expect("decoded case re-encodes");
        let again: Case = bincode::deserialize(&bytes).expect("re-encoded case decodes");
        assert_eq!(again, case);
    }

    if let Ok(evidence) = serde_json::from_slice::<Evidence>(data) {
        let _ = evidence.method();
        serde_json::to_vec(&evidence).expect("decoded evidence re-encodes");
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(id) = text.parse::<CaseId>() {
            assert_eq!(id.to_string().parse::<CaseId>().ok(), Some(id));
        }
    }
});
