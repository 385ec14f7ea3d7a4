pub mod materialize;
mod options;
pub mod selection;
mod stats;
pub mod transform;
mod types;

pub use materialize::{
    OutputDocument, SourceDocument, SplitMarkers, load_source, materialize, materialize_sync,
    save_outputs,
};
pub use options::*;
pub use selection::{SelectionOperator, SelectionPreview, resolve, resolve_with_diagnostics};
pub use stats::calculate_statistics;
pub use transform::{TransformMode, rearrange, transform};
pub use types::*;
