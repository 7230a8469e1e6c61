//! Filename sanitization for series and chapter folder names.

/// Replaces characters that are invalid in filenames on common filesystems
/// (`<>:"/\|?*`, NUL and control characters) with `_`, collapses runs of `_`,
/// and trims surrounding whitespace, dots and underscores.
///
/// Limits length to 255 bytes (NAME_MAX). Returns `"untitled"` when nothing is left.
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let invalid = matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            || c == '\0'
            || c.is_control();
        let replacement = if invalid { '_' } else { c };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == '_');
    if trimmed.is_empty() {
        return "untitled".to_string();
    }

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_reserved_characters() {
        assert_eq!(sanitize_filename("Re:Zero / Arc 3?"), "Re_Zero _ Arc 3");
        assert_eq!(sanitize_filename("a<b>c|d*e\"f"), "a_b_c_d_e_f");
    }

    #[test]
    fn keeps_spaces_inside() {
        assert_eq!(sanitize_filename("  One Piece  "), "One Piece");
    }

    #[test]
    fn control_chars() {
        assert_eq!(sanitize_filename("name\x00x"), "name_x");
    }

    #[test]
    fn empty_after_trim() {
        assert_eq!(sanitize_filename(" ... "), "untitled");
    }
}
