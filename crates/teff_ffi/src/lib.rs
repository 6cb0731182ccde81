//! Flutter-facing bindings for teff core.

pub mod api;
