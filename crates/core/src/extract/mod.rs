//! Source to plain text.
//!
//! Both variants are pure transformations: raw input in, normalized text
//! out, or a typed failure. Nothing is retried.

pub mod html;
pub mod pdf;

pub use html::{BOILERPLATE_TAGS, extract_html_text, strip_boilerplate, visible_text};
pub use pdf::{extract_pdf_text, is_pdf, join_pages};
