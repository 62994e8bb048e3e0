//! Replace the digits of a `<field>=<digits>` form field with a candidate code
use super::Mutator;

use tracing::instrument;

/// default name of the form field holding the code
pub const DEFAULT_FIELD: &str = "code";

/// Field-based mutator. Examines a body for every `<field>=` immediately followed
/// by one or more ascii digits and replaces those digits with the candidate.
///
/// Occurrences of `<field>=` that aren't followed by a digit are left alone.
///
/// # Examples
///
/// ```
/// # use codesweep::mutators::{CodeFieldMutator, Mutator};
/// let mutator = CodeFieldMutator::new("otp");
///
/// assert_eq!(mutator.mutate("otp=000000&remember=1", "123456"), "otp=123456&remember=1");
/// assert!(!mutator.matches("otp=&remember=1"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CodeFieldMutator {
    // `<field>=`, precomputed since it's searched for on every attempt
    needle: String,
}

impl CodeFieldMutator {
    /// create a new `CodeFieldMutator` targeting the form field named `field`
    pub fn new(field: impl AsRef<str>) -> Self {
        Self {
            needle: format!("{}=", field.as_ref()),
        }
    }

    /// name of the targeted form field
    #[must_use]
    pub fn field(&self) -> &str {
        self.needle.trim_end_matches('=')
    }

    /// yield `(start, end)` byte offsets of each run of digits following the needle
    fn digit_spans<'a>(&'a self, body: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        let mut offset = 0;

        std::iter::from_fn(move || {
            while let Some(found) = body.get(offset..)?.find(&self.needle) {
                let start = offset + found + self.needle.len();

                let digits = body.as_bytes()[start..]
                    .iter()
                    .take_while(|byte| byte.is_ascii_digit())
                    .count();

                offset = start + digits;

                if digits > 0 {
                    return Some((start, offset));
                }
            }

            None
        })
    }
}

impl Default for CodeFieldMutator {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD)
    }
}

impl Mutator for CodeFieldMutator {
    #[instrument(skip_all, level = "trace")]
    fn mutate(&self, body: &str, candidate: &str) -> String {
        let mut mutated = String::with_capacity(body.len() + candidate.len());
        let mut copied_until = 0;

        for (start, end) in self.digit_spans(body) {
            mutated.push_str(&body[copied_until..start]);
            mutated.push_str(candidate);
            copied_until = end;
        }

        mutated.push_str(&body[copied_until..]);
        mutated
    }

    fn matches(&self, body: &str) -> bool {
        self.digit_spans(body).next().is_some()
    }

    fn target(&self) -> &str {
        self.field()
    }
}
