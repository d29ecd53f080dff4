//! Pure rule checks: numeric limits, background color and text policy.

pub mod background;
pub mod size;
pub mod text_policy;

pub use background::{BackgroundRules, BorderSampling, Color, ForbiddenColor};
pub use size::check_size;
pub use text_policy::{AdvisoryTrigger, RewardCurrency, TextPolicy};
