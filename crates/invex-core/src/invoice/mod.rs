//! Invoice field extraction module.

mod extractor;
mod processor;
pub mod prompt;
pub mod response;
#[cfg(test)]
pub(crate) mod testing;

pub use extractor::InvoiceDataExtractor;
pub use processor::InvoiceProcessor;
pub use prompt::build_prompt;
pub use response::{find_balanced_object, parse_response, strip_code_fence};
