// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod ids;
pub mod jump;
pub mod model;
pub mod overview;
pub mod prefs;
pub mod query;
pub mod selection;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

pub use ids::*;
pub use jump::*;
pub use model::*;
pub use overview::*;
pub use prefs::*;
pub use query::*;
pub use selection::*;
pub use state::*;
