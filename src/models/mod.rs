pub mod record;
pub mod source;

pub use record::{DataRow, DataValue, HeaderKeys};
pub use source::{Parameter, Region, SourceFile};
