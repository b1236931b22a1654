pub mod composer;
pub mod form;
pub mod formatter;
pub mod styles;

pub use composer::compose;
pub use form::{FormInput, FormLayout};
pub use formatter::{format_prompt, format_prompt_default, split_sentences};
