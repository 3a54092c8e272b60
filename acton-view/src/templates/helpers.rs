//! Template helper functions.
//!
//! Plain Rust implementations behind the functions registered in every
//! template environment (see [`functions`](super::functions)). They can also
//! be called directly from handlers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};

/// Truncate to the first `max_chars` characters, appending `...` when cut.
///
/// # Example
///
/// ```rust
/// use acton_view::templates::truncate;
///
/// assert_eq!(truncate("Hello, World!", 5), "Hello...");
/// assert_eq!(truncate("Hi", 10), "Hi");
/// ```
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Pluralize a word based on count.
///
/// # Example
///
/// ```rust
/// use acton_view::templates::pluralize;
///
/// assert_eq!(pluralize(1, "item", "items"), "item");
/// assert_eq!(pluralize(2, "item", "items"), "items");
/// assert_eq!(pluralize(0, "item", "items"), "items");
/// ```
#[must_use]
pub fn pluralize<'a>(count: i64, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// `"Yes"` or `"No"`
#[must_use]
pub fn yesno(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Turn an identifier into words: `first_name` and `firstName` both become `First name`.
#[must_use]
pub fn humanize(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        match c {
            _ if i == 0 => out.extend(c.to_uppercase()),
            '_' | '-' => out.push(' '),
            _ if c.is_uppercase() => {
                out.push(' ');
                out.extend(c.to_lowercase());
            }
            _ => out.push(c),
        }
    }
    out
}

/// Lowercase ASCII slug; whitespace becomes `-`, everything else non-alphanumeric is dropped
/// except `_` and `-`.
#[must_use]
pub fn slugify(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii)
        .filter_map(|c| match c {
            c if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
            c if c.is_ascii_digit() || c == '_' || c == '-' => Some(c),
            c if c.is_ascii_whitespace() => Some('-'),
            _ => None,
        })
        .collect()
}

/// Whether the string is empty after trimming whitespace
#[must_use]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Inverse of [`is_blank`]
#[must_use]
pub fn not_blank(s: &str) -> bool {
    !is_blank(s)
}

/// Whether `n` is even
#[must_use]
pub fn is_even(n: i64) -> bool {
    n % 2 == 0
}

/// Whether `n` is odd
#[must_use]
pub fn is_odd(n: i64) -> bool {
    !is_even(n)
}

/// Parse a decimal integer
pub fn to_int(s: &str) -> Result<i64> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("unable to convert {s:?} to int")))
}

/// Build a `srcset` value from an image path and a list of widths or densities.
///
/// Bare numbers are treated as widths (`100` becomes `100w`).
///
/// ```rust
/// use acton_view::templates::srcset;
///
/// assert_eq!(
///     srcset("/img/cat.webp", &["100", "2x"]),
///     "/img/cat-100w.webp, /img/cat-2x.webp"
/// );
/// ```
#[must_use]
pub fn srcset<S: AsRef<str>>(src: &str, sizes: &[S]) -> String {
    if src.trim().is_empty() {
        return String::new();
    }

    let (stem, ext) = match src.rfind('.') {
        Some(idx) if !src[idx..].contains('/') => src.split_at(idx),
        _ => (src, ""),
    };

    sizes
        .iter()
        .map(|size| {
            let size = size.as_ref();
            if size.ends_with('w') || size.ends_with('x') {
                format!("{stem}-{size}{ext}")
            } else {
                format!("{stem}-{size}w{ext}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Join the class names whose condition is true.
///
/// ```rust
/// use acton_view::templates::class_map;
///
/// assert_eq!(class_map([("btn", true), ("active", false), ("big", true)]), "btn big");
/// ```
#[must_use]
pub fn class_map<S: AsRef<str>>(pairs: impl IntoIterator<Item = (S, bool)>) -> String {
    pairs
        .into_iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| name.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Attributes of a form input, as consumed by form partials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputAttrs {
    pub name_id: String,
    pub error: String,
    pub hint: String,
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: String,
    pub class: String,
    pub hyperscript: String,
    /// Every other attribute, rendered verbatim on the element
    pub attributes: BTreeMap<String, String>,
}

/// Sort key/value pairs into the well-known input fields and free attributes.
///
/// `error`, `hint`, `label`, `type` and `class` fill the fields of the same
/// name; `_` and `hyperscript` fill `hyperscript`. Type defaults to `text`.
///
/// ```rust
/// use acton_view::templates::input_attrs;
///
/// let attrs = input_attrs("email", [("type", "email"), ("required", "required")]);
/// assert_eq!(attrs.input_type, "email");
/// assert_eq!(attrs.attributes["required"], "required");
/// ```
#[must_use]
pub fn input_attrs<K, V>(name_id: &str, pairs: impl IntoIterator<Item = (K, V)>) -> InputAttrs
where
    K: AsRef<str>,
    V: Into<String>,
{
    let mut attrs = InputAttrs {
        name_id: name_id.to_string(),
        error: String::new(),
        hint: String::new(),
        label: String::new(),
        input_type: "text".to_string(),
        class: String::new(),
        hyperscript: String::new(),
        attributes: BTreeMap::new(),
    };

    for (key, value) in pairs {
        let value = value.into();
        match key.as_ref() {
            "error" => attrs.error = value,
            "hint" => attrs.hint = value,
            "label" => attrs.label = value,
            "type" => attrs.input_type = value,
            "class" => attrs.class = value,
            "_" | "hyperscript" => attrs.hyperscript = value,
            other => {
                attrs.attributes.insert(other.to_string(), value);
            }
        }
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello, World!", 5), "Hello...");
        assert_eq!(truncate("Hi", 10), "Hi");
        assert_eq!(truncate("", 5), "");
        assert_eq!(truncate("Test", 4), "Test");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(0, "item", "items"), "items");
        assert_eq!(pluralize(1, "item", "items"), "item");
        assert_eq!(pluralize(2, "item", "items"), "items");
        assert_eq!(pluralize(-1, "item", "items"), "items");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("first_name"), "First name");
        assert_eq!(humanize("firstName"), "First name");
        assert_eq!(humanize("zip-code"), "Zip code");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Déjà vu!"), "dj-vu");
        assert_eq!(slugify("snake_case-2"), "snake_case-2");
    }

    #[test]
    fn test_blank_and_parity() {
        assert!(is_blank("  \t"));
        assert!(not_blank(" a "));
        assert!(is_even(4));
        assert!(is_odd(-3));
        assert_eq!(yesno(true), "Yes");
        assert_eq!(yesno(false), "No");
    }

    #[test]
    fn test_to_int() {
        assert_eq!(to_int(" 42 ").unwrap(), 42);
        assert!(matches!(to_int("4x"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_srcset() {
        let cases: [(&str, &[&str], &str); 6] = [
            (
                "/foo/example.webp",
                &["100", "200", "300"],
                "/foo/example-100w.webp, /foo/example-200w.webp, /foo/example-300w.webp",
            ),
            (
                "/foo/example.webp",
                &["100w", "200w"],
                "/foo/example-100w.webp, /foo/example-200w.webp",
            ),
            ("/example.jpg", &["1x", "2x"], "/example-1x.jpg, /example-2x.jpg"),
            (
                "https://cdn.example.com/image-54.png",
                &["1000", "1500"],
                "https://cdn.example.com/image-54-1000w.png, https://cdn.example.com/image-54-1500w.png",
            ),
            ("example.tiff", &[], ""),
            ("", &["100", "200"], ""),
        ];

        for (src, sizes, want) in cases {
            assert_eq!(srcset(src, sizes), want, "srcset({src:?}, {sizes:?})");
        }
    }

    #[test]
    fn test_srcset_without_extension() {
        assert_eq!(srcset("/img.d/photo", &["2x"]), "/img.d/photo-2x");
    }

    #[test]
    fn test_class_map() {
        assert_eq!(class_map([("a", true), ("b", true)]), "a b");
        assert_eq!(class_map(Vec::<(String, bool)>::new()), "");
    }

    #[test]
    fn test_input_attrs() {
        let attrs = input_attrs(
            "email",
            [
                ("label", "Email"),
                ("hint", "We never share it"),
                ("class", "wide"),
                ("_", "on click log me"),
                ("placeholder", "you@example.com"),
            ],
        );
        assert_eq!(attrs.name_id, "email");
        assert_eq!(attrs.label, "Email");
        assert_eq!(attrs.hint, "We never share it");
        assert_eq!(attrs.input_type, "text");
        assert_eq!(attrs.class, "wide");
        assert_eq!(attrs.hyperscript, "on click log me");
        assert_eq!(attrs.attributes.len(), 1);
        assert_eq!(attrs.attributes["placeholder"], "you@example.com");
    }
}
