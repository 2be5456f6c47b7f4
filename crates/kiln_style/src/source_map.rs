//! Inline source map embedding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Appends `map` to `code` as a base64 data URL comment.
pub fn append_inline_map(code: &mut String, map: &str) {
    if !code.is_empty() && !code.ends_with('\n') {
        code.push('\n');
    }
    code.push_str("/*# sourceMappingURL=data:application/json;base64,");
    code.push_str(&STANDARD.encode(map));
    code.push_str(" */");
}
