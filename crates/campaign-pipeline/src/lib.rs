//! Campaign content-generation and scheduling pipeline.
//!
//! Given a case study and campaign parameters, a run obtains a multi-channel
//! text plan, renders one image per post under a shared rate limit, assigns
//! each post a publication slot that follows the campaign cadence, and writes
//! the finished batch in a single bulk insert. Per-post image failures only
//! remove that post's image; they never abort the run.

pub mod adapters;
pub mod aggregate;
pub mod error;
pub mod image;
pub mod orchestrator;
pub mod prompt;
pub mod rate_limit;
pub mod schedule;
pub mod services;

mod call;

pub use adapters::PgPostStore;
pub use aggregate::{AggregatedBatch, BatchAggregator, PostWorkItem};
pub use error::{PersistenceError, PipelineError, StageError};
pub use image::ImageProducer;
pub use orchestrator::{CampaignPipeline, PipelineSettings, RunOutcome, RunReport, RunState};
pub use prompt::ImagePromptPipeline;
pub use rate_limit::RateLimiter;
pub use schedule::{DateScheduler, ScheduledSlot, PUBLISH_HOURS};
pub use services::{
    BlobStore, Collaborators, ImageService, PostStore, PromptService, ReferenceAnalyzer,
    TextPlanService,
};
