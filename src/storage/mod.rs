mod example_store;
mod persistence;

pub use example_store::ExampleStore;
pub use persistence::{
    ExamplePersistence, JsonFilePersistence, NullPersistence, STORE_FORMAT_VERSION, StoredExample,
};
