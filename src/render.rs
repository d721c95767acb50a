//! Loads page templates ([`Templates`]) and renders them with the context
//! every page shares ([`Renderer`]).

use crate::config::Config;
use crate::value::from_yaml;
use gtmpl::{Context, Template, Value};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const ALBUM_TEMPLATE: &str = "album.html";
pub const INDEX_TEMPLATE: &str = "index.html";
pub const SEARCH_TEMPLATE: &str = "search.html";
pub const ABOUT_TEMPLATE: &str = "about.html";
pub const CONTACT_TEMPLATE: &str = "contact.html";

/// Every template a build renders.
pub const TEMPLATES: &[&str] = &[
    ALBUM_TEMPLATE,
    INDEX_TEMPLATE,
    SEARCH_TEMPLATE,
    ABOUT_TEMPLATE,
    CONTACT_TEMPLATE,
];

/// The format of `current_date`, e.g. `March 07, 2024`.
const DATE_FORMAT: &str = "%B %d, %Y";

/// A set of parsed templates, addressed by file name.
pub struct Templates {
    templates: HashMap<String, Template>,
    available: Vec<String>,
}

impl Templates {
    /// Parses each of `names` from `directory`. Fails with
    /// [`Error::TemplateNotFound`] if any of them is missing so that a
    /// missing template is reported before anything is rendered.
    pub fn load(directory: &Path, names: &[&str]) -> Result<Templates> {
        let available = available_templates(directory);
        let mut templates = HashMap::new();
        for name in names {
            let path = directory.join(name);
            if !path.is_file() {
                return Err(Error::TemplateNotFound {
                    name: name.to_string(),
                    available,
                });
            }
            templates.insert(name.to_string(), parse_template(&path)?);
        }
        Ok(Templates {
            templates,
            available,
        })
    }

    /// Parses templates from in-memory `(name, source)` pairs.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Templates> {
        let mut templates = HashMap::new();
        for (name, source) in sources {
            let mut template = Template::default();
            template.parse(source).map_err(|err| Error::Parse {
                path: PathBuf::from(name),
                err,
            })?;
            templates.insert(name.to_owned(), template);
        }
        let mut available: Vec<String> = templates.keys().cloned().collect();
        available.sort();
        Ok(Templates {
            templates,
            available,
        })
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| Error::TemplateNotFound {
                name: name.to_owned(),
                available: self.available.clone(),
            })
    }
}

// Lists the file names in `directory`, sorted, for error messages. An
// unreadable directory just has no templates.
fn available_templates(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(directory) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

fn parse_template(path: &Path) -> Result<Template> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?;

    let mut template = Template::default();
    template.parse(&contents).map_err(|err| Error::Parse {
        path: path.to_owned(),
        err,
    })?;
    Ok(template)
}

/// Renders templates. Every render sees the shared values `config` (the whole
/// configuration document), `site_title`, `current_date`, and `random_quote`,
/// which is drawn from the configured quotes anew for each call.
pub struct Renderer<R> {
    templates: Templates,
    shared: HashMap<String, Value>,
    quotes: Vec<String>,
    rng: R,
}

impl<R: Rng> Renderer<R> {
    /// Constructs a renderer. `current_date` is captured now, in local time.
    pub fn new(templates: Templates, config: &Config, rng: R) -> Renderer<R> {
        let mut shared: HashMap<String, Value> = HashMap::new();
        shared.insert("config".to_owned(), from_yaml(&config.raw));
        shared.insert("site_title".to_owned(), (&config.site_title).into());
        shared.insert(
            "current_date".to_owned(),
            chrono::Local::now().format(DATE_FORMAT).to_string().into(),
        );
        Renderer {
            templates,
            shared,
            quotes: config.quotes.clone(),
            rng,
        }
    }

    /// Replaces the `current_date` value, e.g. to get stable output in tests.
    pub fn with_current_date(mut self, current_date: &str) -> Renderer<R> {
        self.shared
            .insert("current_date".to_owned(), current_date.into());
        self
    }

    /// Renders the template `name` with the page-specific values in `data`
    /// layered over the shared values.
    pub fn render(&mut self, name: &str, data: HashMap<String, Value>) -> Result<String> {
        let template = self.templates.get(name)?;

        let mut values = self.shared.clone();
        values.extend(data);
        let quote = self
            .quotes
            .choose(&mut self.rng)
            .map(String::as_str)
            .unwrap_or_default();
        values.insert("random_quote".to_owned(), quote.into());

        let render_error = |err| Error::Render {
            name: name.to_owned(),
            err,
        };
        let context = Context::from(Value::Object(values)).map_err(render_error)?;
        let mut output: Vec<u8> = Vec::new();
        template.execute(&mut output, &context).map_err(render_error)?;
        String::from_utf8(output).map_err(|err| Error::Render {
            name: name.to_owned(),
            err: err.to_string(),
        })
    }
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a template error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested template doesn't exist.
    #[error("template `{name}` not found; available templates: [{}]", .available.join(", "))]
    TemplateNotFound { name: String, available: Vec<String> },

    /// A template file exists but couldn't be read.
    #[error("opening template file `{}`: {err}", .path.display())]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// A template has a syntax error.
    #[error("parsing template `{}`: {err}", .path.display())]
    Parse { path: PathBuf, err: String },

    /// Executing a template failed.
    #[error("rendering template `{name}`: {err}")]
    Render { name: String, err: String },
}
