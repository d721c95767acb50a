//! Conversions from gallery types into template [`Value`]s.

use crate::gallery::{Album, Image};
use crate::paginate::{page_file_name, Page};
use gtmpl_value::Value;
use std::collections::HashMap;

impl From<&Image> for Value {
    fn from(image: &Image) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("filename".to_owned(), (&image.filename).into());
        m.insert("thumbnail".to_owned(), (&image.thumbnail_path).into());
        m.insert("full_image".to_owned(), (&image.full_image_path).into());
        m.insert("size".to_owned(), image.dimensions.to_string().into());
        m.insert("width".to_owned(), Value::from(u64::from(image.dimensions.width)));
        m.insert("height".to_owned(), Value::from(u64::from(image.dimensions.height)));
        m.insert(
            "tags".to_owned(),
            Value::Array(image.tags.iter().map(|tag| tag.into()).collect()),
        );
        Value::Object(m)
    }
}

impl From<&Album> for Value {
    fn from(album: &Album) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), (&album.name).into());
        m.insert("thumbnail".to_owned(), (&album.thumbnail).into());
        m.insert("url".to_owned(), page_file_name(&album.name, 1).into());
        m.insert("image_count".to_owned(), Value::from(album.images.len() as u64));
        m.insert(
            "images".to_owned(),
            Value::Array(album.images.iter().map(Value::from).collect()),
        );
        Value::Object(m)
    }
}

/// The value for a tag link: the tag, the URL of its first search page, and
/// the number of images carrying it.
pub fn tag_value(tag: &str, count: usize) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("tag".to_owned(), tag.into());
    m.insert("url".to_owned(), page_file_name(&search_stem(tag), 1).into());
    m.insert("count".to_owned(), Value::from(count as u64));
    Value::Object(m)
}

/// The file stem of a tag's search pages.
pub fn search_stem(tag: &str) -> String {
    format!("search_{}", tag)
}

/// The pagination values shared by every listing page: `current_page`,
/// `total_pages`, `prev_page`, `next_page` (file names or nil) and `pages`,
/// a list of `{number, url, current}` objects for page navigation.
pub fn pagination_values<T>(page: &Page<T>, stem: &str) -> HashMap<String, Value> {
    let option_to_value = |opt: Option<String>| match opt {
        Some(url) => url.into(),
        None => Value::Nil,
    };

    let pages = (1..=page.total)
        .map(|number| {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("number".to_owned(), Value::from(number as u64));
            m.insert("url".to_owned(), page_file_name(stem, number).into());
            m.insert("current".to_owned(), Value::Bool(number == page.number));
            Value::Object(m)
        })
        .collect();

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("current_page".to_owned(), Value::from(page.number as u64));
    m.insert("total_pages".to_owned(), Value::from(page.total as u64));
    m.insert("prev_page".to_owned(), option_to_value(page.prev(stem)));
    m.insert("next_page".to_owned(), option_to_value(page.next(stem)));
    m.insert("pages".to_owned(), Value::Array(pages));
    m
}

/// Converts a YAML document into a template value. Mapping entries whose
/// keys aren't strings are dropped since templates can't address them.
pub fn from_yaml(yaml: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match yaml {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => Value::from(u),
            (None, Some(i), _) => Value::from(i),
            (None, None, Some(f)) => Value::from(f),
            (None, None, None) => Value::Nil,
        },
        Yaml::String(s) => s.into(),
        Yaml::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .filter_map(|(k, v)| k.as_str().map(|k| (k.to_owned(), from_yaml(v))))
                .collect(),
        ),
    }
}
