//! Fixed test values for deterministic tests.

// Providers
pub const TEST_ISSUER: &str = "example.com/issuer";
pub const TEST_ISSUER_2: &str = "example.com/other-issuer";
pub const TEST_INVALID_ISSUER: &str = "example.com/invalidissuer";
pub const TEST_AUDIENCE: &str = "example.com";
pub const TEST_OTHER_AUDIENCE: &str = "other";

// Signing Key IDs
pub const TEST_KEY_ID_1: &str = "test-key-2025-01";
pub const TEST_KEY_ID_2: &str = "test-key-2025-02";
pub const TEST_KEY_ID_3: &str = "test-key-2025-03";

// Subjects
pub const TEST_SUBJECT: &str = "test-subject";
pub const TEST_SUBJECT_ALICE: &str = "alice";
pub const TEST_SUBJECT_MALLORY: &str = "mallory";

// Scopes
pub const SCOPE_AUTHZED: &str = "authzed";
pub const SCOPE_READ: &str = "read";
pub const SCOPE_WRITE: &str = "write";

// Dates (Unix epoch seconds)
/// 2000-01-02T00:00:00Z
pub const DATE_2000_01_02: i64 = 946_771_200;
/// 2200-01-01T00:00:00Z
pub const DATE_2200_01_01: i64 = 7_258_118_400;
/// 2023-11-14T22:13:20Z, a fixed "now" for deterministic validation tests.
pub const TEST_NOW: i64 = 1_700_000_000;
