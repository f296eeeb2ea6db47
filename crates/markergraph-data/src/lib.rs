pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, LoadedData, generate_report, load_data_dir};
