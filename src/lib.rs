//! The library code for the `albumen` static gallery generator. The
//! architecture can be generally broken down into two distinct steps:
//!
//! 1. Building the gallery model from the album directories on disk
//!    ([`crate::gallery`], [`crate::scan`])
//! 2. Converting the model into output files on disk ([`crate::write`])
//!
//! The first step walks the source directory. Every subdirectory is an album,
//! and every image in an album gets a thumbnail, its pixel dimensions, and a
//! set of tags derived from the album name, the file name and the dimensions
//! ([`crate::tag`]). While albums are added, each image is indexed under each
//! of its tags.
//!
//! The second step renders several families of pages. Album pages, index
//! pages and tag-search pages are lists, so each is paginated
//! ([`crate::paginate`]) into a configurable number of items per page; the
//! about and contact pages are single pages. Every page is rendered from a
//! template ([`crate::render`]) which also sees the configuration, the date,
//! and a randomly chosen quote. Finally the gallery is written out as a JSON
//! manifest and the originals and static assets are copied alongside.
//!
//! [`crate::build::build_gallery`] runs both steps in order.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod gallery;
pub mod paginate;
pub mod render;
pub mod scan;
pub mod tag;
pub mod thumbnail;
pub mod value;
pub mod write;
