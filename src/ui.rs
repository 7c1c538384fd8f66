//! ANSI styling for console output.
//!
//! A stateless constant table; prompts and status lines are the tool's UX,
//! diagnostics for operators go through `tracing` instead.

const HEADER: &str = "\x1b[95m";
const OK: &str = "\x1b[92m";
const WARN: &str = "\x1b[93m";
const FAIL: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

pub fn header(text: &str) -> String {
    format!("{HEADER}{text}{RESET}")
}

pub fn ok(text: &str) -> String {
    format!("{OK}{text}{RESET}")
}

pub fn warn(text: &str) -> String {
    format!("{WARN}{text}{RESET}")
}

pub fn fail(text: &str) -> String {
    format!("{FAIL}{text}{RESET}")
}
