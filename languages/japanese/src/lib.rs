pub mod candidates;
pub mod dictionary;
pub mod jisho;
pub mod loader;
pub mod particles;
pub mod resolver;
pub mod script;
pub mod sqlite;
pub mod tiered;

pub use candidates::{CandidateGenerator, candidates_from};
pub use dictionary::{JMdict, JMdictEntry, LoadError};
pub use jisho::JishoClient;
pub use loader::JMdictLoader;
pub use particles::{PARTICLES, strip_trailing_particle};
pub use resolver::DefinitionResolver;
pub use script::{is_all_japanese, is_japanese_character};
pub use sqlite::SqliteDictionary;
pub use tiered::TieredLookup;
