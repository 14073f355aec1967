pub mod intent;
pub mod models;
pub mod normalize;
pub mod policy;
pub mod templates;

pub use intent::{primary_intent, select_relevant_intents, RELEVANCE_THRESHOLD, MAX_RELEVANT_INTENTS};
pub use models::*;
pub use normalize::{normalize_email, token_count};
pub use policy::{FilterVerdict, KeywordFilter};
pub use templates::{compose_template_reply, template_for, template_for_label, unproductive_reply};
