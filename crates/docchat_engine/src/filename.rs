use sha2::{Digest, Sha256};

const MAX_STEM_CHARS: usize = 40;

/// Filesystem-safe, deterministic clip name: `{sanitized_text_prefix}--{short_hash(text)}.{ext}`
pub fn clip_filename(text: &str, extension: &str) -> String {
    let prefix: String = text.chars().take(MAX_STEM_CHARS).collect();
    let sanitized = sanitize_stem(&prefix);
    let hash = short_hash(text);
    format!("{sanitized}--{hash}.{extension}")
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut cleaned = compacted.trim_matches(&['_', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "speech".to_string();
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::clip_filename;

    #[test]
    fn clip_name_is_safe_and_stable() {
        let name = clip_filename("What: is *this*?", "mp3");
        assert!(name.starts_with("What_is_this--"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(name, clip_filename("What: is *this*?", "mp3"));
    }

    #[test]
    fn different_text_with_same_prefix_gets_distinct_names() {
        let long = "a".repeat(60);
        let longer = format!("{long}b");
        assert_ne!(clip_filename(&long, "mp3"), clip_filename(&longer, "mp3"));
    }

    #[test]
    fn empty_and_reserved_stems_are_patched() {
        assert!(clip_filename("???", "mp3").starts_with("speech--"));
        assert!(clip_filename("con", "mp3").starts_with("con_--"));
    }
}
