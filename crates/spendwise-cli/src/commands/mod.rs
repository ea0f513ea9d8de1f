//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - init and shared utilities (open_db, resolve_user, load_config)
//! - `users` - User commands (add, list)
//! - `transactions` - Transaction commands (add, list, import)
//! - `budgets` - Budget commands (set, list)
//! - `insights` - Insight commands (run, list, approve, reject)
//! - `badges` - Badge and streak commands

pub mod badges;
pub mod budgets;
pub mod core;
pub mod insights;
pub mod transactions;
pub mod users;

// Re-export command functions for main.rs
pub use badges::*;
pub use budgets::*;
pub use core::*;
pub use insights::*;
pub use transactions::*;
pub use users::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
