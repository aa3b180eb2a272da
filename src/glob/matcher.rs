//! Single-component wildcard matching.
//!
//! Patterns never span separators: `?` consumes one character, `*` any run
//! of characters, and `[...]` one character from (or, with a leading `!`,
//! outside) the bracketed set. An unterminated bracket never matches.

use crate::path::CaseSensitivity;

/// Return `true` when `pattern` matches all of `name`.
///
/// # Examples
///
/// ```
/// use depglob::glob::glob_match;
/// use depglob::path::CaseSensitivity;
///
/// assert!(glob_match("main.c", "*.c", CaseSensitivity::Sensitive));
/// assert!(glob_match("az", "a[!xy]", CaseSensitivity::Sensitive));
/// assert!(!glob_match("a", "a[", CaseSensitivity::Sensitive));
/// ```
#[must_use]
pub fn glob_match(name: &str, pattern: &str, case: CaseSensitivity) -> bool {
    let name: Vec<char> = name.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    match_from(&name, &pattern, case)
}

/// Return `true` when a component needs a directory listing to expand.
#[must_use]
pub fn is_glob_pattern(component: &str) -> bool {
    component.contains(['?', '*', '['])
}

/// Return `true` for the recursive `**` component.
#[must_use]
pub fn is_recursive_glob(component: &str) -> bool {
    component == "**"
}

fn match_from(name: &[char], pattern: &[char], case: CaseSensitivity) -> bool {
    match pattern {
        [] => name.is_empty(),
        ['?', rest @ ..] => name
            .split_first()
            .is_some_and(|(_, tail)| match_from(tail, rest, case)),
        ['*'] => true,
        ['*', rest @ ..] => (0..=name.len())
            .filter_map(|skip| name.get(skip..))
            .any(|tail| match_from(tail, rest, case)),
        ['[', class @ ..] => match_class(name, class, case),
        [literal, rest @ ..] => match name {
            [ch, tail @ ..] if case.chars_eq(*ch, *literal) => match_from(tail, rest, case),
            _ => false,
        },
    }
}

/// Match one character against the bracket expression starting just after
/// the opening `[`, then continue with whatever follows the closing `]`.
fn match_class(name: &[char], class: &[char], case: CaseSensitivity) -> bool {
    let Some((ch, tail)) = name.split_first() else {
        return false;
    };
    let (invert, body) = match class {
        ['!', body @ ..] => (true, body),
        body => (false, body),
    };
    let Some(close) = body.iter().position(|c| *c == ']') else {
        return false;
    };
    let (members, after) = body.split_at(close);
    let is_member = members.iter().any(|member| case.chars_eq(*ch, *member));
    if is_member == invert {
        return false;
    }
    let rest = after.get(1..).unwrap_or_default();
    match_from(tail, rest, case)
}
