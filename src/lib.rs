//! # thumbgen
//!
//! Resize, crop and compress one image into any number of sized variants,
//! then write them to disk or publish them to S3.
//!
//! # Pipeline
//!
//! ```text
//! 1. Fetch     path | URL  →  bytes + base name
//! 2. Decode    bytes       →  PixelBuffer
//! 3. Process   per size:   [compress] → resize → encode → name
//! 4. Deliver   artifacts   →  directory | object store
//! ```
//!
//! Each step is a plain function over owned values. Steps run sequentially;
//! the first error aborts the job.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetch`] | Reads a source image from disk or over HTTP |
//! | [`imaging`] | Codec, resize/crop geometry, compression round-trip, per-size pipeline |
//! | [`naming`] | Artifact name prefixes and filename sanitizing |
//! | [`job`] | Ties fetch, imaging and delivery together for one source |
//! | [`storage`] | S3 uploads and presigned URLs |
//! | [`config`] | `thumbgen.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Naming
//!
//! Output names record how they were produced, so a directory of variants
//! explains itself:
//!
//! ```text
//! cat.jpg                 original size, no compression
//! 2.0-cat.jpg             scaled by 2
//! 100,200-cat.jpg         covered and center-cropped to 100x200
//! 50-cmp-640,0-cat.jpg    re-encoded at quality 50, then fit to width 640
//! 50-cmpcat.jpg           re-encoded at quality 50, original size
//! ```
//!
//! See [`naming`] for the full table.
//!
//! # Quality 100
//!
//! [`imaging::compress`] always round-trips through the encoder, but
//! [`imaging::process`] leaves that stage out when quality is 100. A
//! full-quality request is therefore a pure resize followed by one encode.

pub mod config;
pub mod fetch;
pub mod imaging;
pub mod job;
pub mod naming;
pub mod output;
pub mod storage;
