/// Application wiring and landing flow - Gateway

mod entry;

pub use entry::{react_to_expiry, route_for_role, run, AppContext};
