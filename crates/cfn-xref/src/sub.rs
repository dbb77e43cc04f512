//! Scanner for `${...}` placeholders inside `!Sub` template strings.

use winnow::{
    Parser as _,
    combinator::{alt, delimited, repeat},
    error::ModalResult,
    stream::{LocatingSlice, Location},
    token::{any, take_till},
};

type Input<'a> = LocatingSlice<&'a str>;

/// A `${name}` occurrence in a template string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placeholder<'a> {
    /// The text between the braces.
    pub name: &'a str,
    /// Byte offset of the `$` within the template string.
    pub index: usize,
}

impl Placeholder<'_> {
    /// `${!Name}` is the escape for a literal `${Name}`.
    pub fn is_literal(&self) -> bool {
        self.name.starts_with('!')
    }
}

fn placeholder<'a>(input: &mut Input<'a>) -> ModalResult<Placeholder<'a>> {
    let index = input.current_token_start();
    delimited("${", take_till(0.., '}'), '}')
        .map(|name| Placeholder { name, index })
        .parse_next(input)
}

fn placeholders_or_text<'a>(input: &mut Input<'a>) -> ModalResult<Vec<Placeholder<'a>>> {
    repeat(0.., alt((placeholder.map(Some), any.value(None))))
        .fold(Vec::new, |mut found: Vec<_>, item| {
            found.extend(item);
            found
        })
        .parse_next(input)
}

/// Every `${...}` placeholder of `template`, in order of appearance.
///
/// An unterminated `${` is plain text.
pub(crate) fn placeholders(template: &str) -> Vec<Placeholder<'_>> {
    let mut input = LocatingSlice::new(template);
    placeholders_or_text(&mut input).unwrap_or_default()
}
