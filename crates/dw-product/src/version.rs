//! Version name ordering.
//!
//! Names that look like versions (`v1.2.0`, `1.2`, `2.0.0-rc.1`) are compared
//! semantically and sort above every other name (branches, arbitrary tags),
//! which compare lexicographically among themselves.

use std::cmp::Ordering;

/// Parse a version name, tolerating a `v` prefix and missing components.
///
/// ```
/// use dw_product::parse_version;
///
/// assert_eq!(parse_version("v1.2").unwrap().to_string(), "1.2.0");
/// assert!(parse_version("master").is_none());
/// ```
#[must_use]
pub fn parse_version(name: &str) -> Option<semver::Version> {
    let bare = name
        .strip_prefix('v')
        .or_else(|| name.strip_prefix('V'))
        .unwrap_or(name);

    // Split off pre-release/build suffix before padding the core.
    let split = bare.find(['-', '+']).unwrap_or(bare.len());
    let (core, suffix) = bare.split_at(split);
    if core.is_empty() || !core.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let components = core.split('.').count();
    let padded = match components {
        1 => format!("{core}.0.0{suffix}"),
        2 => format!("{core}.0{suffix}"),
        _ => bare.to_owned(),
    };
    semver::Version::parse(&padded).ok()
}

/// Total order on version names; greater means newer.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Sort names oldest first. Stable: equal names keep their relative order.
pub fn sort_versions<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare_versions(a.as_ref(), b.as_ref()));
}

/// Newest name; the first one seen wins among equals.
pub fn latest_version<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().fold(None, |best, name| match best {
        Some(current) if compare_versions(name, current) != Ordering::Greater => Some(current),
        _ => Some(name),
    })
}
