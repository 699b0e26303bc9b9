pub mod condense;
pub mod parse;

pub use condense::{
    condense_if_needed, condense_post, needs_condensing, post_length_without_link,
    CONDENSE_THRESHOLD_CHARS,
};
pub use parse::parse_generation;
