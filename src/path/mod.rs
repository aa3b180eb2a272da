//! Platform-aware path algebra over borrowed UTF-8 strings.
//!
//! A [`Path`] never owns its text: it is a view tagged with the
//! [`PathStyle`] whose separator and case rules apply to it. Operations that
//! produce new text either return an owned [`String`] or append to a buffer
//! supplied by the caller, so splitting and root detection never allocate.
//!
//! # Examples
//!
//! ```
//! use depglob::path::{Path, PathStyle};
//!
//! let path = Path::with_style("src/../lib/./mod.rs", PathStyle::Posix);
//! assert_eq!(path.normalize(), "lib/mod.rs");
//!
//! let split = Path::with_style(r"C:\foo\bar.txt", PathStyle::Windows).split();
//! assert_eq!(split.head.as_str(), r"C:\foo");
//! assert_eq!(split.tail.as_str(), "bar.txt");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

mod root;

/// Separator and case conventions shared by a family of paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStyle {
    /// `/`-separated paths compared byte for byte.
    Posix,
    /// Paths separated by `\` or `/`, compared without regard to ASCII case.
    Windows,
}

impl PathStyle {
    /// Style of the host platform.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Return `true` when `byte` separates path components.
    #[must_use]
    pub const fn is_sep(self, byte: u8) -> bool {
        match self {
            Self::Posix => byte == b'/',
            Self::Windows => byte == b'/' || byte == b'\\',
        }
    }

    /// Separator inserted by joins and written by normalisation.
    #[must_use]
    pub const fn separator(self) -> char {
        match self {
            Self::Posix => '/',
            Self::Windows => '\\',
        }
    }

    /// Case policy used when comparing and matching names.
    #[must_use]
    pub const fn case_sensitivity(self) -> CaseSensitivity {
        match self {
            Self::Posix => CaseSensitivity::Sensitive,
            Self::Windows => CaseSensitivity::Insensitive,
        }
    }

    const fn fold(self, byte: u8) -> u8 {
        match self {
            Self::Posix => byte,
            Self::Windows if byte == b'\\' => b'/',
            Self::Windows => byte.to_ascii_lowercase(),
        }
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::native()
    }
}

/// Whether character comparisons fold ASCII case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaseSensitivity {
    /// Characters must be identical.
    Sensitive,
    /// ASCII letters compare equal regardless of case.
    Insensitive,
}

impl CaseSensitivity {
    /// Compare two characters under this policy.
    #[must_use]
    pub fn chars_eq(self, lhs: char, rhs: char) -> bool {
        match self {
            Self::Sensitive => lhs == rhs,
            Self::Insensitive => lhs.eq_ignore_ascii_case(&rhs),
        }
    }
}

/// Borrowed view of a path string.
///
/// A `Path` is only valid while the string it slices is alive; the borrow
/// checker enforces this through the `'a` lifetime.
#[derive(Clone, Copy, Debug)]
pub struct Path<'a> {
    text: &'a str,
    style: PathStyle,
}

/// A path divided into a leading `head` and a trailing `tail`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Split<'a> {
    /// Everything before the split point.
    pub head: Path<'a>,
    /// Everything after the split point.
    pub tail: Path<'a>,
}

impl<'a> Path<'a> {
    /// View `text` using the host platform's conventions.
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self::with_style(text, PathStyle::native())
    }

    /// View `text` using an explicit style.
    #[must_use]
    pub const fn with_style(text: &'a str, style: PathStyle) -> Self {
        Self { text, style }
    }

    /// Borrow the underlying text.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.text
    }

    /// Conventions applied to this path.
    #[must_use]
    pub const fn style(&self) -> PathStyle {
        self.style
    }

    /// Length of the path in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.text.len()
    }

    /// Return `true` for the empty path.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            text: self.text.get(start..end).unwrap_or_default(),
            style: self.style,
        }
    }

    /// Number of leading bytes that make up the root of the path.
    ///
    /// POSIX roots are a single leading `/`. Windows roots cover drive
    /// letters, UNC shares, device names and `\\?\` verbatim prefixes.
    #[must_use]
    pub fn root_length(&self) -> usize {
        root::root_length(self.style, self.text.as_bytes())
    }

    /// Return `true` when the path has a root.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.root_length() > 0
    }

    /// Return `true` when the path is non-empty and consists only of a root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        !self.is_empty() && self.root_length() == self.len()
    }

    /// Split into the root and the remainder; their concatenation is the
    /// original path.
    #[must_use]
    pub fn split_root(&self) -> Split<'a> {
        let root = self.root_length();
        Split {
            head: self.slice(0, root),
            tail: self.slice(root, self.len()),
        }
    }

    /// The root portion of the path, empty for relative paths.
    #[must_use]
    pub fn root(&self) -> Self {
        self.split_root().head
    }

    /// Split at the last separator outside the root.
    ///
    /// The head excludes trailing separators but never shrinks below the
    /// root; the tail is the final component and is empty when the path ends
    /// in a separator.
    #[must_use]
    pub fn split(&self) -> Split<'a> {
        let style = self.style;
        let is_sep = move |byte: &u8| style.is_sep(*byte);
        let bytes = self.text.as_bytes();
        let root_end = self.root_length();

        let tail_start = bytes
            .get(root_end..)
            .unwrap_or_default()
            .iter()
            .rposition(is_sep)
            .map_or(root_end, |pos| root_end + pos + 1);
        let head_end = bytes
            .get(root_end..tail_start)
            .unwrap_or_default()
            .iter()
            .rposition(|byte| !is_sep(byte))
            .map_or(root_end, |pos| root_end + pos + 1);

        Split {
            head: self.slice(0, head_end),
            tail: self.slice(tail_start, bytes.len()),
        }
    }

    /// Parent directory, as produced by [`Self::split`].
    #[must_use]
    pub fn dirname(&self) -> Self {
        self.split().head
    }

    /// Final component, as produced by [`Self::split`].
    #[must_use]
    pub fn basename(&self) -> Self {
        self.split().tail
    }

    /// Split off the extension of the final component.
    ///
    /// Leading dots are skipped so `.bashrc` has no extension; the extension
    /// then starts at the first remaining dot, so `a.tar.gz` splits into
    /// `a` and `.tar.gz`.
    #[must_use]
    pub fn split_extension(&self) -> Split<'a> {
        let bytes = self.text.as_bytes();
        let base = bytes
            .iter()
            .rposition(|byte| self.style.is_sep(*byte))
            .map_or(0, |pos| pos + 1);
        let name = bytes.get(base..).unwrap_or_default();
        let dots = name.iter().take_while(|byte| **byte == b'.').count();
        let stem = name
            .iter()
            .skip(dots)
            .position(|byte| *byte == b'.')
            .map_or(name.len(), |pos| dots + pos);
        let cut = base + stem;
        Split {
            head: self.slice(0, cut),
            tail: self.slice(cut, bytes.len()),
        }
    }

    /// Extension of the final component including its leading dot.
    #[must_use]
    pub fn extension(&self) -> Self {
        self.split_extension().tail
    }

    /// Replace the extension with `ext`, which should include its dot.
    #[must_use]
    pub fn with_extension(&self, ext: &str) -> String {
        let head = self.split_extension().head;
        let mut out = String::with_capacity(head.len() + ext.len());
        out.push_str(head.as_str());
        out.push_str(ext);
        out
    }

    /// Return `true` when the path is exactly `.`.
    #[must_use]
    pub fn is_dot(&self) -> bool {
        self.text == "."
    }

    /// Return `true` when the path is exactly `..`.
    #[must_use]
    pub fn is_dot_dot(&self) -> bool {
        self.text == ".."
    }

    /// Components from left to right. A root forms its own component and
    /// redundant separators are dropped.
    #[must_use]
    pub fn components(&self) -> Vec<Self> {
        let mut out = Vec::new();
        self.components_into(&mut out);
        out
    }

    /// Append the components of this path to `out`.
    pub fn components_into(&self, out: &mut Vec<Self>) {
        let Split { head, tail } = self.split();
        if head.is_root() && tail.is_empty() {
            out.push(head);
            return;
        }
        if !head.is_empty() {
            head.components_into(out);
        }
        if !tail.is_empty() {
            out.push(tail);
        }
    }

    /// Resolve `.` and `..` components and canonicalise separators.
    ///
    /// A `..` removes the preceding component unless that component is
    /// itself `..` or a root; otherwise it is kept. An empty result becomes
    /// `.`.
    #[must_use]
    pub fn normalize(&self) -> String {
        let mut buf = String::with_capacity(self.len());
        self.normalize_into(&mut buf);
        buf
    }

    /// Append the normalised form of this path to `buf`.
    pub fn normalize_into(&self, buf: &mut String) {
        let mut stack: Vec<Self> = Vec::new();
        for component in self.components() {
            if component.is_dot() {
                continue;
            }
            let collapses = component.is_dot_dot()
                && stack
                    .last()
                    .is_some_and(|top| !top.is_dot_dot() && !top.is_absolute());
            if collapses {
                stack.pop();
            } else {
                stack.push(component);
            }
        }

        if stack.is_empty() {
            Self::with_style(".", self.style).join_onto(buf);
        } else {
            for component in &stack {
                component.join_onto(buf);
            }
        }

        if self.style == PathStyle::Windows && buf.contains('/') {
            let canonical = buf.replace('/', "\\");
            *buf = canonical;
        }
    }

    /// Append this path to `buf`.
    ///
    /// An absolute path replaces the buffer contents; a relative path is
    /// appended after a separator when the buffer does not already end in
    /// one.
    pub fn join_onto(&self, buf: &mut String) {
        if self.is_absolute() {
            buf.clear();
        } else if buf
            .as_bytes()
            .last()
            .is_some_and(|byte| !self.style.is_sep(*byte))
        {
            buf.push(self.style.separator());
        }
        buf.push_str(self.text);
    }

    /// Match the whole path against a single-component glob pattern using
    /// this path's case policy.
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        crate::glob::glob_match(self.text, pattern, self.style.case_sensitivity())
    }

    fn folded(&self) -> impl Iterator<Item = u8> + 'a {
        let style = self.style;
        self.text.bytes().map(move |byte| style.fold(byte))
    }
}

/// Join `parts` left to right into a new string.
///
/// Absolute parts discard everything accumulated before them.
///
/// # Examples
///
/// ```
/// use depglob::path::{PathStyle, join};
///
/// assert_eq!(join(PathStyle::Posix, ["a", "b", "c.txt"]), "a/b/c.txt");
/// assert_eq!(join(PathStyle::Posix, ["a", "/etc", "hosts"]), "/etc/hosts");
/// ```
#[must_use]
pub fn join<'p>(style: PathStyle, parts: impl IntoIterator<Item = &'p str>) -> String {
    let mut buf = String::new();
    for part in parts {
        Path::with_style(part, style).join_onto(&mut buf);
    }
    buf
}

impl PartialEq for Path<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Path<'_> {}

impl PartialOrd for Path<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded()
            .cmp(other.folded())
            .then_with(|| self.style.cmp(&other.style))
    }
}

impl Hash for Path<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.folded() {
            state.write_u8(byte);
        }
        self.style.hash(state);
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

impl<'a> From<&'a str> for Path<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Path<'_> {
    fn as_ref(&self) -> &str {
        self.text
    }
}
