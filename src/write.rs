//! Writes the output tree: the paginated album, index and tag-search pages,
//! the about and contact pages, the `gallery.json` manifest, the copied
//! originals, and the mirrored static assets.

use crate::gallery::{Album, Gallery, Image};
use crate::paginate::paginate;
use crate::render::{self, Renderer, ALBUM_TEMPLATE, INDEX_TEMPLATE, SEARCH_TEMPLATE};
use crate::tag::ImageRef;
use crate::value::{pagination_values, search_stem, tag_value};
use gtmpl::Value;
use rand::Rng;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// The name of the manifest file in the output root.
pub const MANIFEST_FILE: &str = "gallery.json";

// File stems of the pages that aren't album pages.
const INDEX_STEM: &str = "index";
const SINGLE_PAGE_STEMS: &[&str] = &["about", "contact"];

/// Returns whether album pages named after `album_name` would share file
/// names with the index, about, contact or tag-search pages, which are
/// written later and would replace them.
pub fn is_reserved_stem(album_name: &str) -> bool {
    album_name == INDEX_STEM
        || SINGLE_PAGE_STEMS.contains(&album_name)
        || album_name.starts_with(&search_stem(""))
}

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a, R> {
    /// The root of the output tree. All pages are written directly into it.
    pub output_directory: &'a Path,

    /// The number of items on each listing page.
    pub page_size: NonZeroUsize,

    pub renderer: &'a mut Renderer<R>,
}

impl<R: Rng> Writer<'_, R> {
    /// Writes `{album}.html`, `{album}_page2.html`, ... listing the album's
    /// images. Returns the number of pages written.
    pub fn write_album_pages(&mut self, album: &Album) -> Result<usize> {
        if is_reserved_stem(&album.name) {
            warn!(
                "album `{}` shares its page names with other pages and will be overwritten",
                album.name
            );
        }
        let album_value = Value::from(album);
        self.write_listing(ALBUM_TEMPLATE, &album.name, &album.images, |images| {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("album_name".to_owned(), (&album.name).into());
            m.insert("album".to_owned(), album_value.clone());
            m.insert(
                "images".to_owned(),
                Value::Array(images.iter().map(Value::from).collect()),
            );
            m
        })
    }

    /// Writes `index.html`, `index_page2.html`, ... listing every album. Each
    /// index page also gets the full tag list as `tags`.
    pub fn write_index_pages(&mut self, gallery: &Gallery) -> Result<usize> {
        let tags = Value::Array(
            gallery
                .tag_index
                .iter()
                .map(|(tag, images)| tag_value(tag, images.len()))
                .collect(),
        );
        self.write_listing(INDEX_TEMPLATE, INDEX_STEM, &gallery.albums, |albums| {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert(
                "albums".to_owned(),
                Value::Array(albums.iter().map(Value::from).collect()),
            );
            m.insert("tags".to_owned(), tags.clone());
            m
        })
    }

    /// Writes `search_{tag}.html`, `search_{tag}_page2.html`, ... listing the
    /// images carrying `tag`.
    pub fn write_search_pages(
        &mut self,
        gallery: &Gallery,
        tag: &str,
        images: &[ImageRef],
    ) -> Result<usize> {
        let images: Vec<&Image> = gallery.images(images).collect();
        self.write_listing(SEARCH_TEMPLATE, &search_stem(tag), &images, |images| {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("tag".to_owned(), tag.into());
            m.insert(
                "images".to_owned(),
                Value::Array(images.iter().map(|image| Value::from(*image)).collect()),
            );
            m
        })
    }

    /// Writes a single, unpaginated page that only sees the shared values.
    pub fn write_static_page(&mut self, template: &str, file_name: &str) -> Result<()> {
        let html = self.renderer.render(template, HashMap::new())?;
        self.write_file(file_name, &html)
    }

    // Paginates `items` and writes one page per chunk. `data` produces the
    // page-specific values for a chunk; the pagination values are added on
    // top.
    fn write_listing<T>(
        &mut self,
        template: &str,
        stem: &str,
        items: &[T],
        data: impl Fn(&[T]) -> HashMap<String, Value>,
    ) -> Result<usize> {
        let pages = paginate(items, self.page_size);
        for page in pages.iter() {
            let mut values = data(page.items);
            values.extend(pagination_values(page, stem));
            let html = self.renderer.render(template, values)?;
            self.write_file(&page.file_name(stem), &html)?;
        }
        Ok(pages.len())
    }

    fn write_file(&self, file_name: &str, contents: &str) -> Result<()> {
        let path = self.output_directory.join(file_name);
        debug!("writing `{}`", path.display());
        std::fs::write(&path, contents).map_err(|err| Error::Io { path, err })
    }
}

/// Serializes `albums`, with their images nested, to
/// `{output_directory}/gallery.json`.
pub fn write_manifest(output_directory: &Path, albums: &[Album]) -> Result<()> {
    let path = output_directory.join(MANIFEST_FILE);
    let file = File::create(&path).map_err(|err| Error::Io {
        path: path.clone(),
        err,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, albums).map_err(|err| Error::Manifest {
        path: path.clone(),
        err,
    })?;
    writer.flush().map_err(|err| Error::Io { path, err })
}

/// Copies the originals of `album`'s images from `album_directory` into
/// `{output_directory}/images/{album}/`.
pub fn copy_album_images(
    album_directory: &Path,
    output_directory: &Path,
    album: &Album,
) -> Result<()> {
    let target_directory = output_directory.join("images").join(&album.name);
    create_dir_all(&target_directory)?;
    for image in album.images.iter() {
        let source = album_directory.join(&image.filename);
        std::fs::copy(&source, target_directory.join(&image.filename))
            .map_err(|err| Error::Io { path: source, err })?;
    }
    Ok(())
}

/// Recursively copies `src` into `dst`, overwriting files that exist in both
/// and leaving files only present in `dst` alone. Returns the number of files
/// copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for result in WalkDir::new(src).follow_links(true) {
        let entry = result?;
        // strip_prefix() can't fail since every entry is under `src`
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|err| Error::Io {
                path: target.clone(),
                err,
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Like [`std::fs::create_dir_all`] but annotates errors with the path.
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible write operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing the output tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error during templating.
    #[error(transparent)]
    Template(#[from] render::Error),

    /// An error writing or copying a file.
    #[error("writing `{}`: {err}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// An error serializing the manifest.
    #[error("writing manifest `{}`: {err}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        err: serde_json::Error,
    },

    /// An error walking the static directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::render::{Templates, ABOUT_TEMPLATE};
    use crate::tag::Tags;
    use crate::thumbnail::Dimensions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn config(items_per_page: usize) -> Config {
        let yaml = format!(
            "source_dir: src\noutput_dir: out\nthumbnail_size: [10, 10]\n\
             items_per_page: {}\ntemplates_dir: t\nstatic_dir: s\nquotes: [q]\n",
            items_per_page
        );
        Config::from_value(serde_yaml::from_str(&yaml).unwrap(), Path::new("")).unwrap()
    }

    fn renderer(config: &Config) -> Renderer<StdRng> {
        let templates = Templates::from_sources(vec![
            (
                ALBUM_TEMPLATE,
                "{{.album_name}} {{.current_page}}/{{.total_pages}}:\
                 {{range .images}} {{.filename}}{{end}}",
            ),
            (
                INDEX_TEMPLATE,
                "{{.current_page}}:{{range .albums}} {{.name}}{{end}} |\
                 {{range .tags}} {{.tag}}{{end}}",
            ),
            (SEARCH_TEMPLATE, "{{.tag}}:{{range .images}} {{.filename}}{{end}}"),
            (ABOUT_TEMPLATE, "about {{.random_quote}}"),
        ])
        .unwrap();
        Renderer::new(templates, config, StdRng::seed_from_u64(0))
    }

    fn image(album: &str, name: &str) -> Image {
        Image {
            filename: name.to_owned(),
            thumbnail_path: format!("thumbnails/{}/{}", album, name),
            full_image_path: format!("images/{}/{}", album, name),
            dimensions: Dimensions {
                width: 2,
                height: 2,
            },
            tags: Tags::new(),
        }
    }

    fn album(name: &str, count: usize) -> Album {
        Album {
            name: name.to_owned(),
            images: (1..=count).map(|i| image(name, &format!("{}.jpg", i))).collect(),
            thumbnail: String::new(),
        }
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    fn html_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(".html"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_reserved_stems() {
        for name in ["index", "about", "contact", "search_sky", "search_"].iter() {
            assert!(is_reserved_stem(name), "{}", name);
        }
        for name in ["Trips", "indexes", "About", "search", "research_sky"].iter() {
            assert!(!is_reserved_stem(name), "{}", name);
        }
    }

    #[test]
    fn test_album_pages() -> Result<()> {
        let out = tempdir().unwrap();
        let config = config(2);
        let mut renderer = renderer(&config);
        let mut writer = Writer {
            output_directory: out.path(),
            page_size: config.items_per_page,
            renderer: &mut renderer,
        };

        assert_eq!(writer.write_album_pages(&album("Trips", 5))?, 3);
        assert_eq!(
            html_files(out.path()),
            vec!["Trips.html", "Trips_page2.html", "Trips_page3.html"]
        );
        assert_eq!(read(out.path(), "Trips.html"), "Trips 1/3: 1.jpg 2.jpg");
        assert_eq!(read(out.path(), "Trips_page2.html"), "Trips 2/3: 3.jpg 4.jpg");
        assert_eq!(read(out.path(), "Trips_page3.html"), "Trips 3/3: 5.jpg");
        Ok(())
    }

    #[test]
    fn test_empty_album_gets_one_page() -> Result<()> {
        let out = tempdir().unwrap();
        let config = config(2);
        let mut renderer = renderer(&config);
        let mut writer = Writer {
            output_directory: out.path(),
            page_size: config.items_per_page,
            renderer: &mut renderer,
        };

        assert_eq!(writer.write_album_pages(&album("Empty", 0))?, 1);
        assert_eq!(read(out.path(), "Empty.html"), "Empty 1/1:");
        Ok(())
    }

    #[test]
    fn test_index_and_search_pages() -> Result<()> {
        let out = tempdir().unwrap();
        let config = config(2);
        let mut renderer = renderer(&config);
        let mut writer = Writer {
            output_directory: out.path(),
            page_size: config.items_per_page,
            renderer: &mut renderer,
        };

        let mut gallery = Gallery::default();
        let mut rng = StdRng::seed_from_u64(0);
        for name in ["a", "b", "c"].iter() {
            let mut album = album(name, 1);
            album.images[0].tags = vec!["sky".to_owned()].into_iter().collect();
            gallery.push_album(Album::new(album.name, album.images, &mut rng));
        }

        assert_eq!(writer.write_index_pages(&gallery)?, 2);
        assert_eq!(read(out.path(), "index.html"), "1: a b | sky");
        assert_eq!(read(out.path(), "index_page2.html"), "2: c | sky");

        let refs = gallery.tag_index.get("sky").unwrap().to_vec();
        assert_eq!(writer.write_search_pages(&gallery, "sky", &refs)?, 2);
        assert_eq!(read(out.path(), "search_sky.html"), "sky: 1.jpg 1.jpg");
        assert_eq!(read(out.path(), "search_sky_page2.html"), "sky: 1.jpg");
        Ok(())
    }

    #[test]
    fn test_static_page_and_missing_template() -> Result<()> {
        let out = tempdir().unwrap();
        let config = config(2);
        let mut renderer = renderer(&config);
        let mut writer = Writer {
            output_directory: out.path(),
            page_size: config.items_per_page,
            renderer: &mut renderer,
        };

        writer.write_static_page(ABOUT_TEMPLATE, "about.html")?;
        assert_eq!(read(out.path(), "about.html"), "about q");

        match writer.write_static_page("contact.html", "contact.html") {
            Err(Error::Template(render::Error::TemplateNotFound { name, .. })) => {
                assert_eq!(name, "contact.html")
            }
            other => panic!("wanted template-not-found, got {:?}", other),
        }
        assert!(!out.path().join("contact.html").exists());
        Ok(())
    }

    #[test]
    fn test_manifest_round_trip() -> Result<()> {
        let out = tempdir().unwrap();
        let mut albums = vec![album("one", 2), album("two", 0)];
        albums[0].images[1].tags = vec!["b".to_owned(), "a".to_owned()]
            .into_iter()
            .collect();
        write_manifest(out.path(), &albums)?;

        let parsed: Vec<Album> =
            serde_json::from_str(&read(out.path(), MANIFEST_FILE)).unwrap();
        assert_eq!(parsed, albums);

        let raw: serde_json::Value =
            serde_json::from_str(&read(out.path(), MANIFEST_FILE)).unwrap();
        assert_eq!(raw[0]["images"][0]["size"], "2x2");
        assert_eq!(raw[0]["images"][0]["full_image"], "images/one/1.jpg");
        assert_eq!(raw[0]["images"][1]["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(raw[1]["thumbnail"], "");
        Ok(())
    }

    #[test]
    fn test_copy_dir_overwrites_and_preserves() -> Result<()> {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("css")).unwrap();
        std::fs::write(src.path().join("css/site.css"), "new").unwrap();
        std::fs::write(src.path().join("app.js"), "js").unwrap();
        std::fs::create_dir_all(dst.path().join("css")).unwrap();
        std::fs::write(dst.path().join("css/site.css"), "old").unwrap();
        std::fs::write(dst.path().join("keep.txt"), "keep").unwrap();

        assert_eq!(copy_dir(src.path(), dst.path())?, 2);
        assert_eq!(read(dst.path(), "css/site.css"), "new");
        assert_eq!(read(dst.path(), "app.js"), "js");
        assert_eq!(read(dst.path(), "keep.txt"), "keep");
        Ok(())
    }

    #[test]
    fn test_copy_album_images() -> Result<()> {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        std::fs::write(src.path().join("1.jpg"), "one").unwrap();
        std::fs::write(src.path().join("skipped.jpg"), "not listed").unwrap();

        copy_album_images(src.path(), out.path(), &album("one", 1))?;
        assert_eq!(read(out.path(), "images/one/1.jpg"), "one");
        assert!(!out.path().join("images/one/skipped.jpg").exists());
        Ok(())
    }
}
