//! Multi-message variant algebra.
//!
//! A pin name may stand for a family of messages by embedding a bracketed,
//! comma-separated token list:
//!
//! ```text
//! motor[left,right].speed  ──►  motor.left.speed, motor.right.speed
//! set-[on,off]             ──►  set-on, set-off
//! ```
//!
//! All functions here are pure. Malformed brackets (no close, or a close
//! before the open) make a name plain rather than producing an error.

/// Characters that already separate a prefix/suffix from the token.
const SEPARATORS: &[char] = &['.', '-', '_'];

/// Separator inserted between prefix, token and suffix when none is present.
pub const VARIANT_SEPARATOR: char = '.';

/// One concrete message of a (possibly multi) pin name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// The expanded message name.
    pub name: String,
    /// The bracket token this variant was expanded from (`None` for plain names).
    pub token: Option<String>,
}

/// The three parts of a multi name: prefix, bracket interior, suffix.
fn split_multi(name: &str) -> Option<(&str, &str, &str)> {
    let open = name.find('[')?;
    let close = name.find(']')?;
    if close <= open {
        return None;
    }
    Some((&name[..open], &name[open + 1..close], &name[close + 1..]))
}

fn tokens_of(interior: &str) -> Vec<&str> {
    interior
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn join(pre: &str, token: &str, post: &str) -> String {
    let mut name = String::with_capacity(pre.len() + token.len() + post.len() + 2);
    name.push_str(pre);
    if !pre.is_empty() && !pre.ends_with(SEPARATORS) {
        name.push(VARIANT_SEPARATOR);
    }
    name.push_str(token);
    if !post.is_empty() && !post.starts_with(SEPARATORS) {
        name.push(VARIANT_SEPARATOR);
    }
    name.push_str(post);
    name
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// True iff `name` contains a `[`...`]` span with the close after the open.
pub fn is_multi(name: &str) -> bool {
    split_multi(name).is_some()
}

/// The raw bracket tokens of a multi name (empty for plain names).
pub fn variant_tokens(name: &str) -> Vec<&str> {
    split_multi(name)
        .map(|(_, interior, _)| tokens_of(interior))
        .unwrap_or_default()
}

/// Expand a name into its concrete variants, keeping the originating token.
///
/// A multi name whose bracket holds no tokens expands to itself.
pub fn variants(name: &str) -> Vec<Variant> {
    if let Some((pre, interior, post)) = split_multi(name) {
        let tokens = tokens_of(interior);
        if !tokens.is_empty() {
            return tokens
                .into_iter()
                .map(|token| Variant {
                    name: join(pre, token, post),
                    token: Some(token.to_string()),
                })
                .collect();
        }
    }
    vec![Variant {
        name: name.to_string(),
        token: None,
    }]
}

/// Expand a name into its concrete message names.
pub fn expand_variants(name: &str) -> Vec<String> {
    variants(name).into_iter().map(|v| v.name).collect()
}

/// True iff the two (possibly multi) names denote at least one common message.
///
/// Comparison is case-insensitive. Two multi names overlap as soon as their
/// bracket token lists share one token, regardless of prefix and suffix.
pub fn overlap(a: &str, b: &str) -> bool {
    match (split_multi(a), split_multi(b)) {
        (None, None) => same(a, b),
        (Some(_), None) => expand_variants(a).iter().any(|v| same(v, b)),
        (None, Some(_)) => expand_variants(b).iter().any(|v| same(v, a)),
        (Some((_, ia, _)), Some((_, ib, _))) => {
            let tb = tokens_of(ib);
            tokens_of(ia)
                .iter()
                .any(|ta| tb.iter().any(|t| same(ta, t)))
        }
    }
}

/// The variant of `multi` whose token occurs inside `external`.
///
/// When several tokens occur the longest one wins; equal lengths resolve to
/// the first token in bracket order.
pub fn get_match(multi: &str, external: &str) -> Option<String> {
    let (pre, interior, post) = split_multi(multi)?;
    let haystack = external.to_lowercase();

    let mut best: Option<&str> = None;
    for token in tokens_of(interior) {
        if !haystack.contains(&token.to_lowercase()) {
            continue;
        }
        if best.map_or(true, |b| token.len() > b.len()) {
            best = Some(token);
        }
    }
    best.map(|token| join(pre, token, post))
}
