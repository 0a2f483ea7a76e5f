/// Vocabulary file loading
///
/// Reads the binary vocabulary format into an immutable `VocabularyTable`
/// and writes tables back out in the same layout.
pub mod error;
pub mod io;
pub mod table;
pub mod vocab_loader;

pub use error::ParseError;
pub use table::VocabularyTable;
pub use vocab_loader::{encode_vocabulary, parse_vocabulary, read_vocabulary, write_vocabulary};
