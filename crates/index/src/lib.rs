#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Debian repository index handling for nbs
//!
//! Decodes `Packages.gz` bodies, scans them for a package record and keeps
//! decoded indexes in a process-wide cache so each
//! `(mirror, release, arch, component)` index is fetched at most once per run.

mod cache;
mod decode;
mod parser;

pub use cache::MetadataCache;
pub use decode::decode_index;
pub use parser::find_package;
