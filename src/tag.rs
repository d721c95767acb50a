//! Defines tag derivation ([`derive_tags`], [`TagPolicy`]) and the
//! [`TagIndex`], which maps each tag to the images that carry it.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// A normalized set of tags. A [`BTreeSet`] keeps iteration order stable so
/// that identical input always produces identical output.
pub type Tags = BTreeSet<String>;

/// Tokens that are too common to be useful as search pages.
const COMMON_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "the", "to", "with", "img", "image", "dsc", "photo",
];

/// Derives a normalized set of tags from free text. The text is lowercased
/// and split on whitespace, `_`, `-` and `.`. Tokens containing any other
/// non-alphanumeric character are dropped, as are [`COMMON_WORDS`].
///
/// ```
/// use albumen::tag::derive_tags;
///
/// let tags = derive_tags("Summer_at the-Beach.2021");
/// assert_eq!(
///     tags.into_iter().collect::<Vec<_>>(),
///     vec!["2021", "beach", "summer"],
/// );
/// ```
pub fn derive_tags(text: &str) -> Tags {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-' || c == '.')
        .filter(|token| !token.is_empty())
        .filter(|token| token.chars().all(char::is_alphanumeric))
        .filter(|token| !COMMON_WORDS.contains(token))
        .map(str::to_owned)
        .collect()
}

/// Selects how an image's tags are computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagPolicy {
    /// Union of the tags of the album name, the file stem and the dimension
    /// string.
    Text,

    /// Tags of the file extension alone. Every image of the same type ends up
    /// with the same tags.
    Extension,
}

impl Default for TagPolicy {
    fn default() -> Self {
        TagPolicy::Text
    }
}

impl TagPolicy {
    /// Computes the tags for the file `file_name` in album `album` whose
    /// pixel dimensions format as `size`.
    pub fn tags(&self, album: &str, file_name: &str, size: &str) -> Tags {
        let (stem, extension) = split_extension(file_name);
        match self {
            TagPolicy::Text => {
                let mut tags = derive_tags(album);
                tags.extend(derive_tags(stem));
                tags.extend(derive_tags(size));
                tags
            }
            TagPolicy::Extension => derive_tags(extension),
        }
    }
}

// Splits `file_name` at its last `.`; the extension is empty when there is
// none.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(i) if i > 0 => (&file_name[..i], &file_name[i + 1..]),
        _ => (file_name, ""),
    }
}

/// Identifies an image by its position in the gallery: the index of its
/// album and its index within that album.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub album: usize,
    pub image: usize,
}

/// Maps tags to the images that carry them. Tags iterate in the order in
/// which they were first inserted, and each tag's images keep their
/// insertion order.
#[derive(Clone, Debug, Default)]
pub struct TagIndex {
    order: Vec<String>,
    entries: HashMap<String, Vec<ImageRef>>,
}

impl TagIndex {
    pub fn new() -> TagIndex {
        TagIndex::default()
    }

    /// Appends `image` to the list for `tag`, creating the entry if needed.
    pub fn insert(&mut self, tag: &str, image: ImageRef) {
        match self.entries.get_mut(tag) {
            Some(images) => images.push(image),
            None => {
                self.order.push(tag.to_owned());
                self.entries.insert(tag.to_owned(), vec![image]);
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<&[ImageRef]> {
        self.entries.get(tag).map(Vec::as_slice)
    }

    /// Iterates over `(tag, images)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ImageRef])> {
        self.order
            .iter()
            .map(move |tag| (tag.as_str(), self.entries[tag].as_slice()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
