//! Defines the [`Scanner`], which turns one album directory into an ordered
//! list of [`Image`]s, writing a thumbnail for each.

use crate::gallery::Image;
use crate::tag::TagPolicy;
use crate::thumbnail::{self, ImageTransform};
use std::fs::read_dir;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions (lowercase, without the dot) recognized as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Returns whether `file_name` has one of the [`IMAGE_EXTENSIONS`],
/// compared case-insensitively.
pub fn is_image_file(file_name: &str) -> bool {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(extension) => IMAGE_EXTENSIONS
            .iter()
            .any(|candidate| extension.eq_ignore_ascii_case(candidate)),
        None => false,
    }
}

/// Something that was left out of the gallery, and why.
#[derive(Debug)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// The images of one album plus any files that could not be processed.
#[derive(Debug, Default)]
pub struct ScannedAlbum {
    pub images: Vec<Image>,
    pub skipped: Vec<Skipped>,
}

/// Scans album directories.
pub struct Scanner<'a> {
    /// Root of the output tree. Thumbnails go to
    /// `{output_directory}/thumbnails/{album}/{file_name}`.
    pub output_directory: &'a Path,

    /// Produces the thumbnails and reads the pixel dimensions.
    pub transform: &'a dyn ImageTransform,

    /// How tags are computed for each image.
    pub tag_policy: TagPolicy,
}

impl Scanner<'_> {
    /// Scans the album at `album_path`. Entries are visited in file-name
    /// order; subdirectories and files without an image extension are
    /// ignored. A file that cannot be decoded is recorded in
    /// [`ScannedAlbum::skipped`] and does not abort the scan, but a thumbnail
    /// that cannot be written does.
    pub fn scan_album(&self, album_name: &str, album_path: &Path) -> Result<ScannedAlbum> {
        let entries = image_entries(album_path)?;
        let thumbnail_directory = self.output_directory.join("thumbnails").join(album_name);
        std::fs::create_dir_all(&thumbnail_directory).map_err(|err| Error::Write {
            path: thumbnail_directory.clone(),
            err,
        })?;

        let mut scanned = ScannedAlbum::default();
        for (file_name, path) in entries {
            debug!("scanning `{}`", path.display());
            match self.scan_image(album_name, &file_name, &path, &thumbnail_directory) {
                Ok(image) => scanned.images.push(image),
                Err(err @ thumbnail::Error::Decode { .. }) => {
                    warn!("skipping `{}`: {}", path.display(), err);
                    scanned.skipped.push(Skipped {
                        path,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(Error::Thumbnail(err)),
            }
        }
        Ok(scanned)
    }

    fn scan_image(
        &self,
        album_name: &str,
        file_name: &str,
        path: &Path,
        thumbnail_directory: &Path,
    ) -> thumbnail::Result<Image> {
        let dimensions = self
            .transform
            .thumbnail(path, &thumbnail_directory.join(file_name))?;
        let size = dimensions.to_string();
        Ok(Image {
            filename: file_name.to_owned(),
            thumbnail_path: format!("thumbnails/{}/{}", album_name, file_name),
            full_image_path: format!("images/{}/{}", album_name, file_name),
            tags: self.tag_policy.tags(album_name, file_name, &size),
            dimensions,
        })
    }
}

// Lists the image files directly inside `dir`, sorted by file name. Names
// that aren't valid UTF-8 are logged and left out since they can't be
// represented in page URLs.
fn image_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let read_error = |err| Error::ReadAlbum {
        path: dir.to_owned(),
        err,
    };

    let mut entries = Vec::new();
    for result in read_dir(dir).map_err(read_error)? {
        let entry = result.map_err(read_error)?;
        if !entry.file_type().map_err(read_error)?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(file_name) if is_image_file(&file_name) => entries.push((file_name, entry.path())),
            Ok(_) => {}
            Err(name) => warn!("skipping file with non UTF-8 name {:?}", name),
        }
    }
    entries.sort();
    Ok(entries)
}

/// The result of a fallible album scan.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error that prevents a whole album from being scanned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The album directory could not be listed.
    #[error("reading album directory `{}`: {err}", .path.display())]
    ReadAlbum {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// The thumbnail directory could not be created.
    #[error("creating directory `{}`: {err}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// A thumbnail could not be written into the output tree.
    #[error(transparent)]
    Thumbnail(thumbnail::Error),
}
