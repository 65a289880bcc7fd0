//! Symbol mangling: turns D-Bus names into Rust identifiers.
//!
//! Grounded on `dbus-codegen`'s `make_camel`/`make_snake`/`make_fn_name`;
//! generalized here so assemblers in more than one module can reuse the
//! same collision-avoidance loop (the teacher's version only deduplicated
//! against a single `Intf`'s methods/props).

pub const RUST_KEYWORDS: [&str; 57] = [
    "as", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "Self", "self", "static", "struct", "super", "trait", "true", "type", "union",
    "unsafe", "use", "where", "while", "abstract", "alignof", "async", "await", "become", "box",
    "do", "final", "macro", "offsetof", "override", "priv", "proc", "pure", "sizeof", "try",
    "typeof", "unsized", "virtual", "yield",
];

fn is_keyword(s: &str) -> bool {
    RUST_KEYWORDS.iter().any(|k| *k == s)
}

/// `foo-bar_baz` -> `FooBarBaz`.
pub fn make_camel(s: &str) -> String {
    let mut ucase = true;
    let mut r: String = s
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => {
                let cc = if ucase { c.to_uppercase().next() } else { Some(c) };
                ucase = false;
                cc
            }
            _ => {
                ucase = true;
                None
            }
        })
        .collect();
    if is_keyword(&r) {
        r.push('_');
    }
    r
}

/// `FooBarBaz` -> `foo_bar_baz`. `keyword_check` additionally escapes a
/// result that collides with a Rust reserved word. Also separates a
/// letter from a following run of digits (`Foo2Bar` -> `foo_2_bar`).
pub fn make_snake(s: &str, keyword_check: bool) -> String {
    let mut lcase = false;
    let mut in_digit_run = false;
    let mut r = String::new();
    for c in s.chars() {
        match c {
            '0'..='9' => {
                if lcase && !in_digit_run {
                    r.push('_');
                }
                r.push(c);
                lcase = true;
                in_digit_run = true;
            }
            'a'..='z' => {
                r.push(c);
                lcase = true;
                in_digit_run = false;
            }
            'A'..='Z' => {
                if lcase {
                    r.push('_');
                }
                lcase = false;
                in_digit_run = false;
                r.push(c.to_lowercase().next().unwrap());
            }
            _ => {
                if lcase {
                    r.push('_');
                }
                lcase = false;
                in_digit_run = false;
            }
        }
    }
    if r.len() < 2 {
        // Don't interfere with variable names like 'm' and 'i'.
        r.push('_');
    }
    if keyword_check && is_keyword(&r) {
        r.push('_');
    }
    r
}

/// Appends `_` to `candidate` until it is absent from `taken`.
pub fn dedupe_against(candidate: String, mut taken: impl FnMut(&str) -> bool) -> String {
    let mut r = candidate;
    while taken(&r) {
        r.push('_');
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_basic() {
        assert_eq!(make_camel("foo_bar"), "FooBar");
        assert_eq!(make_camel("org.freedesktop.DBus"), "OrgFreedesktopDBus");
    }

    #[test]
    fn camel_keyword_collision() {
        // "type" mangled via make_camel never collides (camel-cases), but
        // make_snake must escape it.
        assert_eq!(make_snake("Type", true), "type_");
    }

    #[test]
    fn snake_basic() {
        assert_eq!(make_snake("FooBar", true), "foo_bar");
        assert_eq!(make_snake("NameOwnerChanged", true), "name_owner_changed");
    }

    #[test]
    fn snake_inserts_underscore_at_letter_to_digit_run_boundary() {
        assert_eq!(make_snake("Foo2Bar", true), "foo_2_bar");
        assert_eq!(make_snake("Item0", true), "item_0");
    }

    #[test]
    fn snake_short_names_get_padded() {
        assert_eq!(make_snake("m", true), "m_");
        assert_eq!(make_snake("i", true), "i_");
    }

    #[test]
    fn dedupe_appends_underscores() {
        let mut seen = vec!["get_x".to_string(), "get_x_".to_string()];
        let r = dedupe_against("get_x".to_string(), |s| seen.iter().any(|t| t == s));
        assert_eq!(r, "get_x__");
        seen.push(r);
        assert_eq!(seen.len(), 3);
    }
}
