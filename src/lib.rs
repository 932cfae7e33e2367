//! # mapped-region: map any byte range of an open file
//!
//! Operating systems only map files in whole pages that start on a page
//! boundary. This crate maps an arbitrary `[offset, offset + len)` range of an
//! already-open file, hides the alignment arithmetic, and hands back exactly
//! the bytes that were asked for.
//!
//! ## Features
//!
//! - **Arbitrary ranges**: any offset and any non-zero length inside the file
//! - **Exclusive ownership**: one owner per mapping, released exactly once on drop
//! - **Borrowed handles**: the file is never closed or duplicated
//! - **Cross-platform**: `mmap` on Unix, file-mapping views on Windows
//! - **Access hints**: optional `madvise`-backed advice on the physical mapping
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::File;
//! use mapped_region::{MappedRegion, MapAdvice};
//!
//! let file = File::open("data.bin")?;
//!
//! // Map 50 bytes starting 4 bytes into the second page
//! let mut region = MappedRegion::new();
//! region.create(Some("data.bin"), &file, 4100, 50, true)?;
//! region.advise(MapAdvice::Sequential)?;
//!
//! let bytes = region.data()?;
//! assert_eq!(bytes.len(), 50);
//! # Ok::<(), mapped_region::MapError>(())
//! ```
//!
//! ## Modules
//!
//! - [`errors`]: Error types for all mapping operations
//! - [`utils`]: Page size discovery and alignment arithmetic
//! - [`region`]: Core `MappedRegion` implementation
//! - [`advise`]: Access-pattern hints
//! - [`options`]: Builder-style mapping configuration
//!
//! ## Feature Flags
//!
//! - `advise` (default): Enables [`MappedRegion::advise`]

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]

pub mod errors;
pub mod utils;
pub mod region;
pub mod advise;
pub mod options;
mod sys;

pub use advise::MapAdvice;
pub use errors::{MapError, Result};
pub use options::MapOptions;
pub use region::MappedRegion;
pub use sys::{AsMapHandle, RawMapHandle};
pub use utils::{page_size, page_span, PageSpan};
