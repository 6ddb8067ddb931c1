//! Decoders for the header section of a request.
//!
//! [`HeaderFieldDecoder`] handles a single `name: value` line and is driven by
//! [`HeaderFieldsDecoder`] until the empty line ending the section.

mod header_field_decoder;
mod header_fields_decoder;

pub use header_field_decoder::HeaderFieldDecoder;
pub use header_fields_decoder::HeaderFieldsDecoder;
