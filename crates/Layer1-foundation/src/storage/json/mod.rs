mod store;

pub use store::JsonStore;
pub(crate) use store::read_json;
