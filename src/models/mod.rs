//! Serialized data model.
//!
//! - `commit`: CommitRecord, AuthorInfo, ChangeStats, SkippedCommit
//! - `survey`: SourceFileSurvey, SourceFile
//! - `violation`: ViolationRecord, AnalysisResult
//! - `analysis`: CommitAnalysis, DerivedStats (the per-commit artifact)
//! - `summary`: RepositorySummary and the persisted SummaryReport

pub mod analysis;
pub mod commit;
pub mod summary;
pub mod survey;
pub mod violation;

pub use analysis::*;
pub use commit::*;
pub use summary::*;
pub use survey::*;
pub use violation::*;
