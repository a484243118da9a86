pub mod backgrounds;
pub mod templates;
