//! URL and filename helpers for the on-disk layout.

mod path;
mod sanitize;

pub use path::extension_from_url;
pub use sanitize::sanitize_filename;
