//! actions taken against a [`RequestTemplate`]'s body that swap in the current candidate
//!
//! [`RequestTemplate`]: crate::requests::RequestTemplate
mod code_field;

pub use self::code_field::{CodeFieldMutator, DEFAULT_FIELD};

/// A trait to produce a per-candidate body from a body template
pub trait Mutator: Send + Sync {
    /// return a copy of `body` with every placeholder replaced by `candidate`
    ///
    /// a body without any placeholder is returned unchanged; that's not an error
    fn mutate(&self, body: &str, candidate: &str) -> String;

    /// whether or not `body` contains at least one placeholder that [`Mutator::mutate`]
    /// would replace
    ///
    /// a `false` here means every mutated body is identical, which silently invalidates
    /// a whole search
    fn matches(&self, body: &str) -> bool;

    /// name of the form field whose value gets replaced
    fn target(&self) -> &str;
}

/// convenience wrapper around [`CodeFieldMutator::mutate`] for the default `code` field
///
/// # Examples
///
/// ```
/// # use codesweep::mutators::mutate;
/// assert_eq!(mutate("x=1&code=9999&y=2", "0042"), "x=1&code=0042&y=2");
/// ```
#[must_use]
pub fn mutate(body: &str, candidate: &str) -> String {
    CodeFieldMutator::default().mutate(body, candidate)
}
