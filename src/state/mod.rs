// Mall state model and client-side state store

mod model;
mod store;

pub use model::{
    Distribution, MallAnalytics, MallState, OrderedMap, ParkingMap, SlotStatus,
};
pub use store::{RenderRequest, StateStore};
