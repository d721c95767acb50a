//! The image transform collaborator: decodes a source image, reports its
//! pixel [`Dimensions`], and writes a bounded-size thumbnail.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Pixel dimensions of an image. Displays, parses and serializes as `WxH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || format!("invalid dimensions `{}`: expected `WxH`", s);
        let (width, height) = s.split_once('x').ok_or_else(invalid)?;
        Ok(Dimensions {
            width: width.parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for Dimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dimensions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Dimensions, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse::<Dimensions>()
            .map_err(D::Error::custom)
    }
}

/// Produces thumbnails. The scanner only depends on this trait so that the
/// image codec can be swapped out.
pub trait ImageTransform {
    /// Writes a thumbnail of `source` to `target` and returns the pixel
    /// dimensions of `source`.
    fn thumbnail(&self, source: &Path, target: &Path) -> Result<Dimensions>;
}

/// The default [`ImageTransform`], backed by the `image` crate. Thumbnails
/// fit within `max_width` x `max_height`, keep their aspect ratio, and are
/// never upscaled.
#[derive(Clone, Copy, Debug)]
pub struct Thumbnailer {
    pub max_width: u32,
    pub max_height: u32,
}

impl Thumbnailer {
    pub fn new(max_width: u32, max_height: u32) -> Thumbnailer {
        Thumbnailer {
            max_width,
            max_height,
        }
    }
}

impl ImageTransform for Thumbnailer {
    fn thumbnail(&self, source: &Path, target: &Path) -> Result<Dimensions> {
        let img = image::open(source).map_err(|err| Error::Decode {
            path: source.to_owned(),
            err,
        })?;
        let dimensions = Dimensions {
            width: img.width(),
            height: img.height(),
        };

        let thumb = if dimensions.width <= self.max_width && dimensions.height <= self.max_height {
            img
        } else {
            img.thumbnail(self.max_width, self.max_height)
        };
        thumb.save(target).map_err(|err| Error::Encode {
            path: target.to_owned(),
            err,
        })?;
        Ok(dimensions)
    }
}

/// The result of a fallible thumbnail operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to produce a thumbnail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source file could not be opened or decoded as an image.
    #[error("decoding image `{}`: {err}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        err: image::ImageError,
    },

    /// The thumbnail could not be encoded or written.
    #[error("writing thumbnail `{}`: {err}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        err: image::ImageError,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use image::{GenericImageView, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_dimensions_display_and_parse() {
        let d = Dimensions {
            width: 100,
            height: 50,
        };
        assert_eq!(d.to_string(), "100x50");
        assert_eq!("100x50".parse::<Dimensions>(), Ok(d));
        assert!("100by50".parse::<Dimensions>().is_err());
        assert!("x50".parse::<Dimensions>().is_err());
    }

    #[test]
    fn test_thumbnail_downscales_preserving_aspect() -> Result<()> {
        let dir = tempdir().unwrap();
        let source = dir.path().join("wide.png");
        let target = dir.path().join("wide_thumb.png");
        RgbImage::new(400, 200).save(&source).unwrap();

        let dimensions = Thumbnailer::new(100, 100).thumbnail(&source, &target)?;
        assert_eq!(dimensions.to_string(), "400x200");

        let thumb = image::open(&target).unwrap();
        assert_eq!(thumb.dimensions(), (100, 50));
        Ok(())
    }

    #[test]
    fn test_thumbnail_never_upscales() -> Result<()> {
        let dir = tempdir().unwrap();
        let source = dir.path().join("small.jpg");
        let target = dir.path().join("small_thumb.jpg");
        RgbImage::new(30, 20).save(&source).unwrap();

        let dimensions = Thumbnailer::new(100, 100).thumbnail(&source, &target)?;
        assert_eq!(dimensions.to_string(), "30x20");
        assert_eq!(image::open(&target).unwrap().dimensions(), (30, 20));
        Ok(())
    }

    #[test]
    fn test_thumbnail_undecodable() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not a jpeg").unwrap();

        match Thumbnailer::new(10, 10).thumbnail(&source, &dir.path().join("out.jpg")) {
            Err(Error::Decode { path, .. }) => assert_eq!(path, source),
            other => panic!("wanted a decode error, got {:?}", other),
        }
    }
}
