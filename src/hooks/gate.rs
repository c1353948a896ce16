//! Static gate for hook command strings.
//!
//! This is a heuristic filter applied before a hook reaches `sh -c`, not a
//! security boundary: anyone who controls hook text can still run whatever
//! the allowed character set can express. It deliberately rejects some
//! legitimate syntax (`&&`, `||`, pipes, substitutions) so the decision stays
//! simple to audit.
//!
//! The substring denylist overlaps with the allowed character set: backticks
//! and the `&`/`|` forms would fail the character check anyway, but matching
//! them first reports which pattern tripped the gate.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Longest accepted hook command, in characters.
pub const MAX_HOOK_COMMAND_LEN: usize = 1000;

/// Substrings that reject a command outright (matched case-insensitively).
pub const DANGEROUS_PATTERNS: &[&str] = &[
    ";rm -rf", "rm -rf /", ";curl", "curl ", "wget", "sudo ", "su ", "|sh", "|bash", "| sh",
    "| bash", "eval ", "exec ", "`", "$(", "& ", "&&", "||", "|&",
];

/// Programs refused wherever they appear as a word, after any whitespace or
/// grouping character and regardless of a leading directory.
pub const PRIVILEGED_WORDS: &[&str] = &["sudo", "su", "eval", "exec", "curl", "wget"];

static SAFE_COMMAND: OnceLock<Regex> = OnceLock::new();

fn safe_command() -> &'static Regex {
    SAFE_COMMAND.get_or_init(|| {
        Regex::new(r#"^[a-zA-Z0-9\s\-_./=:@\[\]{}()\n"']+$"#).expect("safe command regex is valid")
    })
}

/// Why a hook command was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookRejection {
    #[error("hook command cannot be empty")]
    Empty,

    #[error("hook command too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },

    #[error("hook command contains potentially dangerous pattern: {0}")]
    DangerousPattern(String),

    #[error("hook command contains unsafe characters")]
    UnsafeCharacters,
}

/// Check a hook command against the gate. Rules apply in order: empty,
/// length, dangerous substrings, then the allowed character set.
pub fn validate_hook_command(command: &str) -> Result<(), HookRejection> {
    if command.is_empty() {
        return Err(HookRejection::Empty);
    }

    let len = command.chars().count();
    if len > MAX_HOOK_COMMAND_LEN {
        return Err(HookRejection::TooLong {
            len,
            max: MAX_HOOK_COMMAND_LEN,
        });
    }

    let lower = command.to_lowercase();
    if let Some(pattern) = DANGEROUS_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(HookRejection::DangerousPattern(pattern.to_string()));
    }
    if lower.trim_end().ends_with('&') {
        return Err(HookRejection::DangerousPattern("&".to_string()));
    }
    if let Some(word) = privileged_word(&lower) {
        return Err(HookRejection::DangerousPattern(word.to_string()));
    }

    if !safe_command().is_match(command) {
        return Err(HookRejection::UnsafeCharacters);
    }

    Ok(())
}

/// First privileged program named anywhere in `lower`. Words are split on
/// every character a shell could treat as a separator, so tabs, newlines,
/// quotes and subshell parentheses do not hide them.
fn privileged_word(lower: &str) -> Option<&'static str> {
    lower
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')))
        .filter_map(|token| token.rsplit('/').next())
        .find_map(|program| PRIVILEGED_WORDS.iter().copied().find(|w| *w == program))
}
