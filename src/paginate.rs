//! Splits ordered lists into fixed-size [`Page`]s and names the output file
//! for each page.

use std::num::NonZeroUsize;

/// One page of a larger ordered list.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// The items on this page.
    pub items: &'a [T],

    /// The 1-based page number.
    pub number: usize,

    /// The total number of pages in the list. Always at least 1.
    pub total: usize,
}

impl<T> Page<'_, T> {
    /// The file name of this page, given the file stem of the first page
    /// (see [`page_file_name`]).
    pub fn file_name(&self, stem: &str) -> String {
        page_file_name(stem, self.number)
    }

    /// The file name of the previous page, if any.
    pub fn prev(&self, stem: &str) -> Option<String> {
        match self.number > 1 {
            true => Some(page_file_name(stem, self.number - 1)),
            false => None,
        }
    }

    /// The file name of the next page, if any.
    pub fn next(&self, stem: &str) -> Option<String> {
        match self.number < self.total {
            true => Some(page_file_name(stem, self.number + 1)),
            false => None,
        }
    }
}

/// Returns the number of pages needed for `len` items, `ceil(len /
/// page_size)`, but never less than 1.
pub fn page_count(len: usize, page_size: NonZeroUsize) -> usize {
    let page_size = page_size.get();
    match len % page_size {
        0 => len / page_size,
        _ => len / page_size + 1,
    }
    .max(1)
}

/// Splits `items` into pages of `page_size`. Every page but the last is full.
/// An empty list yields a single empty page so that a listing is always
/// rendered.
pub fn paginate<T>(items: &[T], page_size: NonZeroUsize) -> Vec<Page<'_, T>> {
    let total = page_count(items.len(), page_size);
    if items.is_empty() {
        return vec![Page {
            items,
            number: 1,
            total,
        }];
    }

    items
        .chunks(page_size.get())
        .enumerate()
        .map(|(i, chunk)| Page {
            items: chunk,
            number: i + 1,
            total,
        })
        .collect()
}

/// Names the output file for page `number` of a page family: `{stem}.html`
/// for the first page and `{stem}_page{number}.html` for the rest.
pub fn page_file_name(stem: &str, number: usize) -> String {
    match number > 1 {
        false => format!("{}.html", stem),
        true => format!("{}_page{}.html", stem, number),
    }
}
