//! # ssif-rs
//!
//! `ssif-rs` is a pure Rust reader for SSIF files: single-file 5D microscopy stacks
//! (width × height × Z × T × C) in which every 2D plane is zlib compressed on its own.
//!
//! ## Features
//! - Parse the header, channel name table and plane directory without decompressing any plane
//! - Fetch any subset of (z, t, c) planes, selecting channels by index or by name
//! - Handle all six plane packing orders (ZTC, ZCT, TZC, TCZ, CZT, CTZ)
//! - Optional float conversion with full-range or min/max normalisation
//! - Optional export to grayscale images (`image` feature)
//!
//! ## Usage
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! ssif-rs = "0.1"
//! ```
//!
//! ### Example: Reading Planes
//! ```no_run
//! use ssif_rs::{Normalisation, SsifReader};
//!
//! let mut reader = SsifReader::open("path/to/stack.ssif").unwrap();
//!
//! for (c, name) in reader.channel_names().iter().enumerate() {
//!     println!("channel {c}: {name}");
//! }
//!
//! // Every Z slice of the first timepoint, channels "dapi" and "gfp".
//! let z: Vec<usize> = (0..reader.depth()).collect();
//! let planes = reader.read_planes(z, 0usize, vec!["dapi", "gfp"]).unwrap();
//! println!("{:?}", planes.shape());
//!
//! let normalised = planes.to_float(Normalisation::MinMax01);
//! ```

mod error;
mod ext;
#[cfg(feature = "image")]
mod image_export;
pub mod packing_order;
pub mod plane_directory;
pub mod plane_stack;
pub mod selection;
pub mod ssif_header;
pub mod ssif_reader;

pub use error::SsifError;
pub use packing_order::{PackingOrder, StackShape};
pub use plane_directory::{PlaneDirectory, PlaneEntry};
pub use plane_stack::{Normalisation, OutputKind, Pixel, PlaneStack};
pub use selection::{ChannelSelection, Selection};
pub use ssif_header::SsifHeader;
pub use ssif_reader::{Image, SsifReader};
