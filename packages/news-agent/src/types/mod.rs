//! Domain types for the extraction agent.

pub mod article;
pub mod decision;
pub mod intent;
pub mod plan;
pub mod summary;

pub use article::{ArticleContent, DateConfidence, DateMethod, SeedLink};
pub use decision::{LinkCandidate, PageAction, PageDecision, PageType};
pub use intent::{FocusArea, Intent, OutputFormat};
pub use plan::{Plan, Reflection};
pub use summary::{Citation, SummaryResult};
