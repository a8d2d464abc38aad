pub mod extract_loop;
pub mod query_ctx;
pub mod query_flow;

pub use extract_loop::{click_and_extract, ClickBudget, PaaWidget, Pacing};
pub use query_ctx::QueryCtx;
pub use query_flow::{QueryFlow, QueryOutcome};
