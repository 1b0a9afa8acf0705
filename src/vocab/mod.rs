pub mod parser;
pub mod prompt;

pub use parser::{Entry, parse_vocab};
pub use prompt::{MAX_SENTENCES, QuestionType, build_prompts, parse_sentence_count};
