pub mod engine;
pub mod extract;
pub mod pipeline;

pub use crate::domain::model::{
    BookRecord, FetchedPage, ItemReference, PipelineRun, RunSummary, TaskOutcome,
};
pub use crate::domain::ports::{ConfigProvider, Discoverer, PageFetcher, Storage};
pub use crate::utils::error::Result;
