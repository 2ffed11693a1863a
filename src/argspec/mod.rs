//! The argument specification language.
//!
//! One record per line, `<literal> => <type>`:
//!
//! ```text
//! 5 => int
//! [1, 3, 5] => []int
//! {1: 2, 3: 4} => {}int,int
//! {"foo": false, "bar": true} => {}string,bool
//! (3.4, 5.6) => ()float
//! ```

pub mod error;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::{parse, parse_record};
