//! HTMX header names, re-exported from `axum-htmx`.
//!
//! See <https://htmx.org/reference/#headers>.

// Request headers
pub use axum_htmx::{
    HX_BOOSTED, HX_CURRENT_URL, HX_HISTORY_RESTORE_REQUEST, HX_PROMPT, HX_REQUEST, HX_TARGET,
    HX_TRIGGER_NAME,
};

// Response headers
pub use axum_htmx::{
    HX_LOCATION, HX_PUSH_URL, HX_REDIRECT, HX_REFRESH, HX_REPLACE_URL, HX_RESELECT, HX_RESWAP,
    HX_RETARGET, HX_TRIGGER, HX_TRIGGER_AFTER_SETTLE, HX_TRIGGER_AFTER_SWAP,
};
