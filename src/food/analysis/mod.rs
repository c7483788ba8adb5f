pub mod dietary;

pub use dietary::{classify_food_name, classify_label_tags};
