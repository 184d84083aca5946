pub mod index;
pub mod window;

pub use index::DegreeGraph;
pub use window::{Admission, AdmitReport, WindowError, WindowedEdgeStore};
