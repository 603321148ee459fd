//! webmd core: pure run configuration and naming policies, free of IO.
mod config;
mod image_name;
mod slug;
mod srcset;
mod toc;

pub use config::{
    default_images_dir, InvalidTransport, RunConfig, TransportMode, DEFAULT_OUT, IMAGES_ROOT,
};
pub use image_name::{
    extension_from_content_type, has_image_extension, BaseName, ImageNamer, FALLBACK_EXTENSION,
    IMAGE_EXTENSIONS,
};
pub use slug::slugify;
pub use srcset::{parse_srcset, pick_best_from_srcset, SrcsetCandidate};
pub use toc::{build_toc, extract_headings, Heading, TOC_HEADER};
