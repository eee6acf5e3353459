//! Post-processing of raw generator output.

const TERMINAL_PUNCTUATION: [char; 3] = ['.', '!', '?'];

/// Clean raw generator output for display.
///
/// 1. Strip `enhanced_prompt` if the output starts with it verbatim.
/// 2. Replace each `"  "` with `" "` in a single pass, so runs of three or
///    more spaces are only partially collapsed.
/// 3. Trim surrounding whitespace.
/// 4. Append `.` unless the text already ends in `.`, `!` or `?`.
///
/// Empty results stay empty.
pub fn clean(raw_text: &str, enhanced_prompt: &str) -> String {
    let body = raw_text.strip_prefix(enhanced_prompt).unwrap_or(raw_text);

    let mut cleaned = body.replace("  ", " ").trim().to_string();

    if let Some(last) = cleaned.chars().last() {
        if !TERMINAL_PUNCTUATION.contains(&last) {
            cleaned.push('.');
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_echoed_prompt_and_terminates() {
        let prefix = "Write about: rain. This is concerning. ";
        let raw = format!("{prefix}hello world");
        assert_eq!(clean(&raw, prefix), "hello world.");
    }

    #[test]
    fn keeps_existing_punctuation() {
        assert_eq!(
            clean("Already ends with punctuation!", ""),
            "Already ends with punctuation!"
        );
        assert_eq!(clean("Is it?", ""), "Is it?");
    }

    #[test]
    fn collapses_double_spaces_once() {
        assert_eq!(clean("a  b", ""), "a b.");
        assert_eq!(clean("a   b", ""), "a  b.");
        assert_eq!(clean("a    b", ""), "a  b.");
    }

    #[test]
    fn uses_raw_text_when_prompt_not_echoed() {
        assert_eq!(clean("  fresh text  ", "Write about: x. "), "fresh text.");
    }

    #[test]
    fn partial_echo_is_not_stripped() {
        assert_eq!(clean("Write about: y", "Write about: x. "), "Write about: y.");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean("", ""), "");
        assert_eq!(clean("   ", ""), "");
        assert_eq!(clean("prompt. ", "prompt. "), "");
    }

    #[test]
    fn multibyte_tail_is_handled() {
        assert_eq!(clean("sunny day ☀", ""), "sunny day ☀.");
    }
}
