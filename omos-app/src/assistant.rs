//! Offline canned-response logic. Everything here stays on the local
//! machine; a reply is picked by keyword matching, never by a model call.

use std::env;

use chrono::Local;
use rand::seq::SliceRandom;

const FALLBACK_RESPONSES: [&str; 4] = [
    "I am here and listening. Try asking about the system or the time.",
    "Still offline-friendly. No cloud calls were harmed in this reply.",
    "Processing locally. Ask for the date, the time, or a system status update.",
    "Let's keep things simple. Ask for date, time, or a quick status check.",
];

fn current_time() -> String {
    Local::now().format("%-I:%M %p").to_string()
}

fn current_date() -> String {
    Local::now().format("%A, %B %d, %Y").to_string()
}

fn host_name() -> String {
    env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string())
}

fn system_summary() -> String {
    format!(
        "Running on {} ({}), host name {}.",
        env::consts::OS,
        env::consts::ARCH,
        host_name()
    )
}

fn contains_any(prompt: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| prompt.contains(k))
}

/// Generates a canned response to the supplied user prompt.
///
/// Matching is case-insensitive substring search, checked in a fixed
/// priority order; unmatched prompts get a pseudo-random reply from a
/// fixed pool.
pub fn answer(prompt: &str) -> String {
    if prompt.is_empty() {
        return "I did not catch anything to process.".to_string();
    }

    let prompt = prompt.to_lowercase();
    if contains_any(&prompt, &["time", "clock"]) {
        return format!("Current time: {}", current_time());
    }
    if contains_any(&prompt, &["date", "day"]) {
        return format!("Today is {}", current_date());
    }
    if contains_any(&prompt, &["hello", "hi"]) {
        return "Hello! Ready to help locally.".to_string();
    }
    if prompt.contains("who") && prompt.contains("you") {
        return "I am OMOS, a desktop-first assistant keeping your data on device.".to_string();
    }
    if contains_any(&prompt, &["system", "status"]) {
        return system_summary();
    }
    if prompt.contains("help") {
        return "Try asking for the current time, current date, or a quick system summary."
            .to_string();
    }

    FALLBACK_RESPONSES
        .choose(&mut rand::thread_rng())
        .expect("pool is non-empty")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt() {
        assert_eq!(answer(""), "I did not catch anything to process.");
    }

    #[test]
    fn test_time_prompt() {
        assert!(answer("what TIME is it?").starts_with("Current time:"));
        assert!(answer("check the clock").starts_with("Current time:"));
    }

    #[test]
    fn test_time_wins_over_date() {
        // Both keyword sets match; time has priority.
        assert!(answer("time and date please").starts_with("Current time:"));
    }

    #[test]
    fn test_date_prompt() {
        assert!(answer("what day is it").starts_with("Today is "));
    }

    #[test]
    fn test_greeting() {
        assert_eq!(answer("Hello there"), "Hello! Ready to help locally.");
    }

    #[test]
    fn test_identity() {
        assert!(answer("who are you?").contains("OMOS"));
    }

    #[test]
    fn test_system_status() {
        let reply = answer("system status please");
        assert!(reply.starts_with("Running on "));
        assert!(reply.contains(std::env::consts::OS));
    }

    #[test]
    fn test_help_prompt() {
        assert!(answer("help me out").contains("current time"));
    }

    #[test]
    fn test_fallback_comes_from_pool() {
        let reply = answer("xyzzy");
        assert!(FALLBACK_RESPONSES.contains(&reply.as_str()));
    }
}
