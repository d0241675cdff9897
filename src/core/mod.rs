pub mod candidates;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod resolver;

pub use candidates::{CandidateExtractor, CandidateSet, EmbedCandidate, PageCandidateExtractor};
pub use dispatch::{Dispatcher, FailedAttempt, Resolution};
pub use error::{ResolveResult, ResolverError};
pub use registry::{Registry, RegistryBuilder};
pub use resolver::{MediaUrl, Resolver};
