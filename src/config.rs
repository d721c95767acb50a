//! Loads the build [`Config`] from a YAML file.

use crate::tag::TagPolicy;
use serde::Deserialize;
use std::fs::File;
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::{Path, PathBuf};

/// The default name of the configuration file, looked up in the working
/// directory.
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Deserialize)]
struct SiteTitle(String);
impl Default for SiteTitle {
    fn default() -> Self {
        SiteTitle(String::from("Gallery"))
    }
}

// The on-disk shape of the configuration file.
#[derive(Deserialize)]
struct Project {
    source_dir: PathBuf,
    output_dir: PathBuf,
    thumbnail_size: (NonZeroU32, NonZeroU32),
    items_per_page: NonZeroUsize,
    templates_dir: PathBuf,
    static_dir: PathBuf,
    quotes: Vec<String>,

    #[serde(default)]
    site_title: SiteTitle,

    #[serde(default)]
    tag_policy: TagPolicy,

    #[serde(default)]
    seed: Option<u64>,
}

/// Everything a build needs, resolved once and then shared read-only.
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory whose subdirectories are the albums.
    pub source_directory: PathBuf,

    /// The root of the generated site.
    pub output_directory: PathBuf,

    /// The maximum thumbnail width in pixels.
    pub thumbnail_width: u32,

    /// The maximum thumbnail height in pixels.
    pub thumbnail_height: u32,

    /// The number of items (images or albums) per listing page.
    pub items_per_page: NonZeroUsize,

    /// The directory holding the page templates.
    pub templates_directory: PathBuf,

    /// The directory of static assets mirrored into `{output}/static`.
    pub static_directory: PathBuf,

    /// Quotes, one of which is picked at random for each rendered page.
    pub quotes: Vec<String>,

    pub site_title: String,
    pub tag_policy: TagPolicy,

    /// Seeds every random choice when set, making builds reproducible.
    pub seed: Option<u64>,

    /// The whole configuration document, exposed to templates as `config`.
    pub raw: serde_yaml::Value,
}

impl Config {
    /// Loads the configuration from the YAML file at `path`. Relative paths
    /// in the file are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let raw: serde_yaml::Value = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new(""));
        Config::from_value(raw, root).map_err(|err| match err {
            Error::Parse { err, .. } => Error::Parse {
                path: path.to_owned(),
                err,
            },
            err => err,
        })
    }

    /// Builds a configuration from an already-parsed YAML document, resolving
    /// relative paths against `root`.
    pub fn from_value(raw: serde_yaml::Value, root: &Path) -> Result<Config> {
        let project: Project =
            serde_yaml::from_value(raw.clone()).map_err(|err| Error::Parse {
                path: PathBuf::new(),
                err,
            })?;
        if project.quotes.is_empty() {
            return Err(Error::NoQuotes);
        }

        let (width, height) = project.thumbnail_size;
        Ok(Config {
            source_directory: root.join(project.source_dir),
            output_directory: root.join(project.output_dir),
            thumbnail_width: width.get(),
            thumbnail_height: height.get(),
            items_per_page: project.items_per_page,
            templates_directory: root.join(project.templates_dir),
            static_directory: root.join(project.static_dir),
            quotes: project.quotes,
            site_title: project.site_title.0,
            tag_policy: project.tag_policy,
            seed: project.seed,
            raw,
        })
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a configuration error. All of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration file could not be opened.
    #[error("opening config file `{}`: {err}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// The configuration file isn't valid YAML or is missing required keys.
    #[error("parsing config file `{}`: {err}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// `quotes` is empty.
    #[error("`quotes` must contain at least one quote")]
    NoQuotes,
}

#[cfg(test)]
mod test {
    use super::*;

    const VALID: &str = "
source_dir: albums
output_dir: /tmp/site
thumbnail_size: [200, 150]
items_per_page: 12
templates_dir: templates
static_dir: static
quotes:
  - Hello
  - World
footer: made with love
";

    fn parse(yaml: &str) -> Result<Config> {
        Config::from_value(serde_yaml::from_str(yaml).unwrap(), Path::new("/project"))
    }

    #[test]
    fn test_valid_config() -> Result<()> {
        let config = parse(VALID)?;
        assert_eq!(config.source_directory, PathBuf::from("/project/albums"));
        assert_eq!(config.output_directory, PathBuf::from("/tmp/site"));
        assert_eq!((config.thumbnail_width, config.thumbnail_height), (200, 150));
        assert_eq!(config.items_per_page.get(), 12);
        assert_eq!(config.templates_directory, PathBuf::from("/project/templates"));
        assert_eq!(config.quotes, vec!["Hello", "World"]);
        assert_eq!(config.site_title, "Gallery");
        assert_eq!(config.tag_policy, TagPolicy::Text);
        assert_eq!(config.seed, None);
        assert_eq!(config.raw["footer"].as_str(), Some("made with love"));
        Ok(())
    }

    #[test]
    fn test_optional_keys() -> Result<()> {
        let yaml = format!("{}site_title: Holidays\ntag_policy: extension\nseed: 42\n", VALID);
        let config = parse(&yaml)?;
        assert_eq!(config.site_title, "Holidays");
        assert_eq!(config.tag_policy, TagPolicy::Extension);
        assert_eq!(config.seed, Some(42));
        Ok(())
    }

    #[test]
    fn test_missing_key() {
        let yaml = VALID.replace("items_per_page: 12\n", "");
        assert!(matches!(parse(&yaml), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_zero_page_size() {
        let yaml = VALID.replace("items_per_page: 12", "items_per_page: 0");
        assert!(matches!(parse(&yaml), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_zero_thumbnail_size() {
        let yaml = VALID.replace("[200, 150]", "[0, 150]");
        assert!(matches!(parse(&yaml), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_empty_quotes() {
        let yaml = VALID.replace("  - Hello\n  - World\n", "").replace("quotes:", "quotes: []");
        assert!(matches!(parse(&yaml), Err(Error::NoQuotes)));
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/definitely/not/here/config.yaml");
        match Config::from_file(path) {
            Err(Error::Open { path: p, .. }) => assert_eq!(p, path),
            other => panic!("wanted an open error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_resolves_relative_paths() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, VALID).unwrap();
        let config = Config::from_file(&path)?;
        assert_eq!(config.source_directory, dir.path().join("albums"));
        assert_eq!(config.static_directory, dir.path().join("static"));
        Ok(())
    }
}
