//! Neutralization of script-bearing constructs
//!
//! Applied to the raw buffer before markdown parsing. Whatever raw HTML
//! survives this pass is still escaped to text during rendering; this
//! strip exists so script bodies, frame targets, URI schemes, and handler
//! attributes never reach the output in any form.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap());

static IFRAME_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe\b.*?</iframe\s*>").unwrap());

static JS_SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)javascript:").unwrap());

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)on\w+\s*=").unwrap());

/// Strip `<script>`/`<iframe>` blocks, `javascript:` schemes, and inline
/// `on<word>=` handler attributes from the input.
pub fn neutralize(text: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(text, "");
    let text = IFRAME_BLOCK.replace_all(&text, "");
    let text = JS_SCHEME.replace_all(&text, "");
    EVENT_HANDLER.replace_all(&text, "").into_owned()
}
