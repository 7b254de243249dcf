//! Output generation for collected articles.
//!
//! # Submodules
//!
//! - [`json`]: Writes accepted articles to a JSON file per run
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── www_163_com-2026-10-16_081500.json
//! └── www_163_com-2026-10-16_201500.json
//! ```

pub mod json;
