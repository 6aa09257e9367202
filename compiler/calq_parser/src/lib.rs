pub mod parser;

pub use parser::{
    Correction, CorrectionKind, ErrorKind, ParseReport, Parser, ParserConfig, SyntaxError,
};


// Integration tests are in the tests/ directory
