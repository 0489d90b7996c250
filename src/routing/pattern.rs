//! Path template compilation.
//!
//! # Responsibilities
//! - Split path templates into literal text and `{name}` / `{name?}` placeholders
//! - Wrap parameter constraints as named captures
//! - Build the anchored pattern for a template and its constraints
//! - Normalize request paths before matching
//!
//! # Design Decisions
//! - Literal template text is regex-escaped; only constraints carry regex syntax
//! - Placeholders without a constraint stay literal in the pattern
//! - Patterns are matched case-insensitively
//! - Groups inside constraints are rewritten as non-capturing so the only
//!   captures in a pattern are the named placeholders

use regex::{Regex, RegexBuilder};

/// Upper bound on the compiled size of a single route pattern.
const MAX_PATTERN_SIZE: usize = 1 << 20;

/// A piece of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text matched verbatim.
    Literal(&'a str),
    /// A `{name}` or `{name?}` placeholder; `raw` is the text including braces.
    Placeholder {
        name: &'a str,
        optional: bool,
        raw: &'a str,
    },
}

/// Split a template into literal text and placeholders.
///
/// Malformed braces (unclosed, empty, nested) are kept as literal text.
pub fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    loop {
        let Some(start) = rest.find('{') else {
            if !rest.is_empty() {
                out.push(Segment::Literal(rest));
            }
            break;
        };

        let tail = &rest[start + 1..];
        let placeholder = tail.find('}').and_then(|end| {
            let inner = &tail[..end];
            if inner.contains('{') {
                return None;
            }
            let (name, optional) = match inner.strip_suffix('?') {
                Some(name) => (name, true),
                None => (inner, false),
            };
            (!name.is_empty()).then_some((name, optional, end))
        });

        match placeholder {
            Some((name, optional, end)) => {
                if start > 0 {
                    out.push(Segment::Literal(&rest[..start]));
                }
                out.push(Segment::Placeholder {
                    name,
                    optional,
                    raw: &rest[start..start + end + 2],
                });
                rest = &tail[end + 1..];
            }
            None => {
                out.push(Segment::Literal(&rest[..=start]));
                rest = tail;
            }
        }
    }

    out
}

/// Placeholder names of a template, left to right.
pub fn placeholder_names(template: &str) -> Vec<&str> {
    segments(template)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder { name, .. } => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// First placeholder name that occurs more than once in a template.
pub fn duplicate_placeholder(template: &str) -> Option<&str> {
    let names = placeholder_names(template);
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(name))
        .map(|(_, name)| *name)
}

/// Strip leading and trailing slashes (either direction).
pub fn trim_slashes(path: &str) -> &str {
    path.trim_matches(|c| c == '/' || c == '\\')
}

/// Drop the query string and surrounding slashes from a request path.
pub fn resolve_url(path: &str) -> &str {
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    trim_slashes(path)
}

/// Rewrite capturing groups in a constraint as non-capturing.
///
/// Escaped parentheses, parentheses inside character classes and groups
/// that already start with `(?` are left alone.
pub fn non_capturing(constraint: &str) -> String {
    let mut out = String::with_capacity(constraint.len() + 8);
    let mut chars = constraint.chars().peekable();
    let mut escaped = false;
    let mut in_class = false;

    while let Some(c) = chars.next() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '(' if !in_class && chars.peek() != Some(&'?') => out.push_str("(?:"),
            _ => out.push(c),
        }
    }

    out
}

/// Wrap a constraint as the named capture for `name`.
pub fn wrap_constraint(name: &str, constraint: &str) -> String {
    format!("(?P<{}>{})", name, non_capturing(constraint))
}

/// Compile a single constraint as the anchored capture for `name`.
pub fn check_constraint(name: &str, constraint: &str) -> Result<Regex, regex::Error> {
    compile(&format!("^{}$", wrap_constraint(name, constraint)))
}

/// Build the anchored pattern for a template.
///
/// `constraints` holds wrapped captures keyed by placeholder name. A
/// `{name?}` placeholder becomes optional together with the literal
/// character right before it, so `user/{id?}` also matches `user`.
pub fn generate_pattern(template: &str, constraints: &[(String, String)]) -> String {
    let mut pattern = String::from("^");
    let mut after_literal = false;

    for segment in segments(trim_slashes(template)) {
        match segment {
            Segment::Literal(text) => {
                pattern.push_str(&regex::escape(text));
                after_literal = true;
            }
            Segment::Placeholder {
                name,
                optional,
                raw,
            } => match constraints.iter().find(|(n, _)| n == name) {
                Some((_, capture)) if optional => {
                    if after_literal {
                        pattern.push('?');
                    }
                    pattern.push_str(capture);
                    pattern.push('?');
                    after_literal = false;
                }
                Some((_, capture)) => {
                    pattern.push_str(capture);
                    after_literal = false;
                }
                None => {
                    pattern.push_str(&regex::escape(raw));
                    after_literal = true;
                }
            },
        }
    }

    pattern.push('$');
    pattern
}

/// Compile a generated pattern, case-insensitive.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(MAX_PATTERN_SIZE)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(name: &str, regex: &str) -> (String, String) {
        (name.to_string(), wrap_constraint(name, regex))
    }

    #[test]
    fn test_segments() {
        assert_eq!(
            segments("user/{id}/posts/{slug?}"),
            vec![
                Segment::Literal("user/"),
                Segment::Placeholder { name: "id", optional: false, raw: "{id}" },
                Segment::Literal("/posts/"),
                Segment::Placeholder { name: "slug", optional: true, raw: "{slug?}" },
            ]
        );
    }

    #[test]
    fn test_malformed_braces_stay_literal() {
        assert_eq!(
            segments("a/{id/b"),
            vec![Segment::Literal("a/{"), Segment::Literal("id/b")]
        );
        assert_eq!(placeholder_names("a/{}/{?}/{x{y}"), vec!["y"]);
    }

    #[test]
    fn test_duplicate_placeholder() {
        assert_eq!(duplicate_placeholder("a/{id}/b/{id}"), Some("id"));
        assert_eq!(duplicate_placeholder("a/{id}/b/{slug}"), None);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(resolve_url("/user/42/?tab=posts&x=1"), "user/42");
        assert_eq!(resolve_url("//"), "");
        assert_eq!(resolve_url("\\admin\\"), "admin");
    }

    #[test]
    fn test_non_capturing() {
        assert_eq!(non_capturing("(foo|bar)"), "(?:foo|bar)");
        assert_eq!(non_capturing("(?:a)(b)"), "(?:a)(?:b)");
        assert_eq!(non_capturing(r"\(x\)"), r"\(x\)");
        assert_eq!(non_capturing("[(]+"), "[(]+");
    }

    #[test]
    fn test_check_constraint() {
        assert!(check_constraint("id", "[0-9]+").unwrap().is_match("42"));
        assert!(check_constraint("id", "[0-9").is_err());
        assert!(check_constraint("user-id", "[0-9]+").is_err());
    }

    #[test]
    fn test_pattern_without_constraints() {
        assert_eq!(generate_pattern("/about/", &[]), "^about$");
        assert_eq!(generate_pattern("/", &[]), "^$");
    }

    #[test]
    fn test_pattern_with_constraints() {
        let constraints = vec![constraint("id", "[0-9]+")];
        assert_eq!(
            generate_pattern("/user/{id}", &constraints),
            "^user/(?P<id>[0-9]+)$"
        );
        assert_eq!(
            generate_pattern("/user/{id?}", &constraints),
            "^user/?(?P<id>[0-9]+)?$"
        );
    }

    #[test]
    fn test_unconstrained_placeholder_is_literal() {
        let re = compile(&generate_pattern("search/{term}", &[])).unwrap();
        assert!(re.is_match("search/{term}"));
        assert!(!re.is_match("search/rust"));
    }

    #[test]
    fn test_optional_placeholder_matching() {
        let constraints = vec![constraint("page", r"\d+")];
        let re = compile(&generate_pattern("posts/{page?}", &constraints)).unwrap();
        assert!(re.is_match("posts"));
        assert!(re.is_match("posts/3"));
        assert!(!re.is_match("posts/abc"));
    }

    #[test]
    fn test_case_insensitive() {
        let re = compile(&generate_pattern("About/Us", &[])).unwrap();
        assert!(re.is_match("about/us"));
        assert!(re.is_match("ABOUT/US"));
    }

    #[test]
    fn test_nested_groups_do_not_capture() {
        let constraints = vec![constraint("lang", "(en|fr)(-[a-z]{2})?")];
        let re = compile(&generate_pattern("{lang}/home", &constraints)).unwrap();
        let caps = re.captures("fr-ca/home").unwrap();
        assert_eq!(&caps["lang"], "fr-ca");
        assert_eq!(re.captures_len(), 2);
    }
}
