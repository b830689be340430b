mod store;

pub use store::{AnalysisRecord, Database, NewAnalysis};
