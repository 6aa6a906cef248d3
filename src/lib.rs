//! Interactive git branch explorer and switcher.
//!
//! Lists branches sorted by their latest commit, previews the selected
//! branch's last commit and diff, and optionally switches to it.

pub mod app;
pub mod branch;
pub mod error;
pub mod repo;
pub mod ui;
