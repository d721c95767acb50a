//! Defines the gallery model ([`Image`], [`Album`], [`Gallery`]) and the
//! [`Builder`] which assembles it from a source directory tree.

use crate::scan::{self, Scanner, Skipped};
use crate::tag::{ImageRef, TagIndex, Tags};
use crate::thumbnail::Dimensions;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::read_dir;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A single image within an [`Album`]. The field names on the wire follow the
/// `gallery.json` manifest format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// The file name, unique within its album.
    pub filename: String,

    /// The thumbnail's path relative to the output root.
    #[serde(rename = "thumbnail")]
    pub thumbnail_path: String,

    /// The copied original's path relative to the output root.
    #[serde(rename = "full_image")]
    pub full_image_path: String,

    /// The original pixel dimensions, serialized as `WxH`.
    #[serde(rename = "size")]
    pub dimensions: Dimensions,

    pub tags: Tags,
}

/// A named collection of images, one per source subdirectory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub images: Vec<Image>,

    /// The thumbnail path of one image picked at random, or empty when the
    /// album has no images.
    pub thumbnail: String,
}

impl Album {
    /// Constructs an album and picks its representative thumbnail with `rng`.
    pub fn new<R: Rng + ?Sized>(name: String, images: Vec<Image>, rng: &mut R) -> Album {
        let thumbnail = images
            .choose(rng)
            .map(|image| image.thumbnail_path.clone())
            .unwrap_or_default();
        Album {
            name,
            images,
            thumbnail,
        }
    }
}

/// The full gallery: every album in source order plus the tag index.
#[derive(Debug, Default)]
pub struct Gallery {
    pub albums: Vec<Album>,
    pub tag_index: TagIndex,
}

impl Gallery {
    /// Appends `album` and indexes each of its images under each of its tags.
    pub fn push_album(&mut self, album: Album) {
        let album_index = self.albums.len();
        for (image_index, image) in album.images.iter().enumerate() {
            for tag in image.tags.iter() {
                self.tag_index.insert(
                    tag,
                    ImageRef {
                        album: album_index,
                        image: image_index,
                    },
                );
            }
        }
        self.albums.push(album);
    }

    /// Resolves a [`TagIndex`] reference.
    pub fn image(&self, image: ImageRef) -> &Image {
        &self.albums[image.album].images[image.image]
    }

    /// Resolves every reference in `images`.
    pub fn images<'a>(&'a self, images: &'a [ImageRef]) -> impl Iterator<Item = &'a Image> + 'a {
        images.iter().map(move |r| self.image(*r))
    }

    pub fn image_count(&self) -> usize {
        self.albums.iter().map(|album| album.images.len()).sum()
    }
}

/// A [`Gallery`] and everything that was left out of it.
#[derive(Debug)]
pub struct Built {
    pub gallery: Gallery,
    pub skipped: Vec<Skipped>,
}

/// Builds a [`Gallery`] from a source root whose subdirectories are albums.
pub struct Builder<'a> {
    pub scanner: Scanner<'a>,
}

impl Builder<'_> {
    /// Scans every direct subdirectory of `source_directory`, in name order,
    /// as an album. Regular files in the root are ignored. An album that
    /// can't be read is logged and recorded as skipped; a root that can't be
    /// read is an error.
    pub fn build<R: Rng + ?Sized>(&self, source_directory: &Path, rng: &mut R) -> Result<Built> {
        let mut built = Built {
            gallery: Gallery::default(),
            skipped: Vec::new(),
        };

        for (name, path) in album_directories(source_directory)? {
            self.add_album(&mut built, name, path, rng)?;
        }
        Ok(built)
    }

    // Scans one album into `built`. Only a failure to read the album itself
    // is skipped; anything else aborts the build.
    fn add_album<R: Rng + ?Sized>(
        &self,
        built: &mut Built,
        name: String,
        path: PathBuf,
        rng: &mut R,
    ) -> Result<()> {
        info!("Processing album: {}", name);
        match self.scanner.scan_album(&name, &path) {
            Ok(scanned) => {
                built.skipped.extend(scanned.skipped);
                built.gallery.push_album(Album::new(name, scanned.images, rng));
                Ok(())
            }
            Err(err @ scan::Error::ReadAlbum { .. }) => {
                warn!("skipping album `{}`: {}", name, err);
                built.skipped.push(Skipped {
                    path,
                    reason: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(Error::Scan(err)),
        }
    }
}

fn album_directories(source_directory: &Path) -> Result<Vec<(String, PathBuf)>> {
    let source_error = |err| Error::Source {
        path: source_directory.to_owned(),
        err,
    };

    let mut albums = Vec::new();
    for result in read_dir(source_directory).map_err(source_error)? {
        let entry = result.map_err(source_error)?;
        // follow symlinks so linked album directories count
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => albums.push((name, entry.path())),
            Err(name) => warn!("skipping album with non UTF-8 name {:?}", name),
        }
    }
    albums.sort();
    Ok(albums)
}

/// The result of a fallible gallery build.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error that prevents the gallery from being built.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source root is missing or unreadable.
    #[error("reading source directory `{}`: {err}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Scanning an album failed in a way that isn't specific to the album,
    /// e.g. the output tree isn't writable.
    #[error(transparent)]
    Scan(#[from] scan::Error),
}
