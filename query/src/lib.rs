pub mod median;

pub use median::{degree_median, histogram_median, median_of, MedianError};
