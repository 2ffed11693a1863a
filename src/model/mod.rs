pub mod argument;
pub mod language;
pub mod result;

pub use argument::{CollectionKind, TypeTag, TypedArgument, Value};
pub use language::Language;
pub use result::{CodeResult, ExecutionRequest, RunStatus};
