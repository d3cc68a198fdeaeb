pub mod error;
pub mod sample;

pub use error::{GraphError, Result};
pub use sample::{CategoryIndex, SampleTable, SelectionState, StackIndex, StackTable, Thread};
