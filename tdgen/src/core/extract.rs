//! Extraction of fenced code blocks from model output.

use std::sync::LazyLock;

use regex::Regex;

/// Return the body of the first complete fenced code block in `text`.
///
/// The info string after the opening fence (```` ```rust ````) is ignored.
/// Returns `None` when no complete fence is present.
pub fn extract_code_block(text: &str) -> Option<&str> {
    static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```[^\n`]*\r?\n(.*?)```").expect("fence pattern should be valid")
    });
    FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_block_with_language_tag() {
        let text = "Here you go:\n```swift\nstruct Adder {}\n```\nDone.";
        assert_eq!(extract_code_block(text), Some("struct Adder {}\n"));
    }

    #[test]
    fn extracts_block_without_language_tag() {
        let text = "```\nlet x = 1;\n```";
        assert_eq!(extract_code_block(text), Some("let x = 1;\n"));
    }

    #[test]
    fn takes_first_block_only() {
        let text = "```rust\nfn a() {}\n```\n\n```rust\nfn b() {}\n```";
        assert_eq!(extract_code_block(text), Some("fn a() {}\n"));
    }

    #[test]
    fn unterminated_fence_is_none() {
        assert_eq!(extract_code_block("```rust\nfn a() {}\n"), None);
    }

    #[test]
    fn plain_text_is_none() {
        assert_eq!(extract_code_block("fn a() {}"), None);
    }
}
