#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must never panic, whatever the shape of the input
        let _ = gate_core::jwt::strip_bearer(input);
        if let Ok(token) = gate_core::jwt::parse(input) {
            // A parsed token always came from exactly three segments
            assert_eq!(input.matches('.').count(), 2);
            assert!(input.len() <= gate_core::MAX_JWT_SIZE_BYTES);
            let _ = token.claims.scopes();
        }
    }
});
