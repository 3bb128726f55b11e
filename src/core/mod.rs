pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frontmatter;
pub mod index;
pub mod matcher;
pub mod persona;
pub mod record;
pub mod relations;
pub mod scan;
