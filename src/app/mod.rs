//! Demo screens.
//!
//! - **index**: welcome page with a bounded input field
//! - **detail**: counts its visits, takes a free-form comment, asks yes/no
//! - **menu**: multiple-choice navigation, typed or single-key
//!
//! Typing `DETAIL` or `MENU` on the index page switches screens; SOMMAIRE
//! always comes back to the index.

pub mod detail;
pub mod index;
pub mod menu;

use crate::router::Router;

/// Store key holding the last text typed on the index page
pub const USER_INPUT: &str = "user_input";

/// Router with every demo screen registered
pub fn router() -> Router {
    Router::new()
        .register(index::Index)
        .register(detail::Detail)
        .register(menu::Menu)
}
