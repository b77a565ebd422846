mod document;

pub use document::{output_path, read_document, write_document, LandmarkDocument, OutputError};
