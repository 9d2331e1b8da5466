//! Rendering: element-tree descriptions and their HTML form.

pub mod element;
pub mod html;

pub use element::Element;
pub use html::{render_element, render_page};
