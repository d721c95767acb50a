//! Exports the [`build_gallery`] function which stitches together the
//! high-level steps of building the output site: scanning the albums
//! ([`crate::gallery`]), rendering album, index, about, contact and tag-search
//! pages ([`crate::write`]), writing the manifest, and copying the originals
//! and the static assets.

use crate::config::Config;
use crate::gallery::{self, Builder, Built};
use crate::render::{self, Renderer, Templates, ABOUT_TEMPLATE, CONTACT_TEMPLATE, TEMPLATES};
use crate::scan::{Scanner, Skipped};
use crate::thumbnail::Thumbnailer;
use crate::write::{self, copy_album_images, copy_dir, create_dir_all, write_manifest, Writer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// The number of albums in the gallery.
    pub albums: usize,

    /// The number of images across all albums.
    pub images: usize,

    /// The number of distinct tags.
    pub tags: usize,

    /// The number of HTML pages written.
    pub pages: usize,

    /// The number of static asset files copied.
    pub static_files: usize,

    /// Files and albums that were left out because they couldn't be read.
    pub skipped: Vec<Skipped>,
}

/// Returns the random source for a build: seeded from `seed` when given,
/// otherwise from the operating system.
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Builds the site described by `config`. `rng` drives every random choice
/// (album thumbnails and page quotes).
///
/// All templates are loaded before anything is written, so a missing
/// template aborts the build without producing partial output. Unreadable
/// images and albums are skipped and listed in the summary; any other error
/// aborts the build.
pub fn build_gallery<R: Rng>(config: &Config, mut rng: R) -> Result<BuildSummary> {
    let templates = Templates::load(&config.templates_directory, TEMPLATES)?;
    let output = config.output_directory.as_path();
    create_dir_all(output)?;

    // scan every album
    let transform = Thumbnailer::new(config.thumbnail_width, config.thumbnail_height);
    let builder = Builder {
        scanner: Scanner {
            output_directory: output,
            transform: &transform,
            tag_policy: config.tag_policy,
        },
    };
    let Built { gallery, skipped } = builder.build(&config.source_directory, &mut rng)?;

    let mut summary = BuildSummary {
        albums: gallery.albums.len(),
        images: gallery.image_count(),
        tags: gallery.tag_index.len(),
        skipped,
        ..BuildSummary::default()
    };

    let mut renderer = Renderer::new(templates, config, rng);
    let mut writer = Writer {
        output_directory: output,
        page_size: config.items_per_page,
        renderer: &mut renderer,
    };

    // album pages and originals
    for album in gallery.albums.iter() {
        summary.pages += writer.write_album_pages(album)?;
        copy_album_images(&config.source_directory.join(&album.name), output, album)?;
    }

    summary.pages += writer.write_index_pages(&gallery)?;

    writer.write_static_page(ABOUT_TEMPLATE, "about.html")?;
    writer.write_static_page(CONTACT_TEMPLATE, "contact.html")?;
    summary.pages += 2;

    write_manifest(output, &gallery.albums)?;

    for (tag, images) in gallery.tag_index.iter() {
        summary.pages += writer.write_search_pages(&gallery, tag, images)?;
    }

    if config.static_directory.is_dir() {
        summary.static_files = copy_dir(&config.static_directory, &output.join("static"))?;
    } else {
        warn!(
            "static directory `{}` not found; no static assets copied",
            config.static_directory.display()
        );
    }

    info!(
        "wrote {} pages for {} albums ({} images, {} tags); skipped {}",
        summary.pages,
        summary.albums,
        summary.images,
        summary.tags,
        summary.skipped.len()
    );
    Ok(summary)
}

/// The result of a fallible build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A template was missing or malformed.
    #[error(transparent)]
    Template(#[from] render::Error),

    /// The source directory couldn't be read or the thumbnails couldn't be
    /// written.
    #[error(transparent)]
    Gallery(#[from] gallery::Error),

    /// Rendering or writing output failed.
    #[error(transparent)]
    Write(#[from] write::Error),
}
