//! Location code verification for scanned and manually entered codes.

/// Outcome of comparing a submitted code with the location's code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Matched,
    Mismatch,
}

/// Where a submitted code came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    Scanned,
    Manual,
}

/// Trim and upper-case a code for comparison.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn codes_match(input: &str, expected: &str) -> bool {
    normalize_code(input) == normalize_code(expected)
}

pub fn verify_code(input: &str, expected: &str) -> VerifyOutcome {
    if codes_match(input, expected) {
        VerifyOutcome::Matched
    } else {
        VerifyOutcome::Mismatch
    }
}
