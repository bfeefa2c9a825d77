pub mod activation_ctx;
pub mod generation_flow;

pub use activation_ctx::ActivationCtx;
pub use generation_flow::{CacheLookup, GenerationOrchestrator, Resolution, ResolutionOrigin};
