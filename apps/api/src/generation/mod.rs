//! Resume generation: tailoring candidate content to a job description and
//! producing the rendered document.

pub mod analysis;
pub mod cover_letter;
pub mod generator;
pub mod handlers;
