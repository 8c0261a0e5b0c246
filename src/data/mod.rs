//! Data module - CSV loading, typed records and row transformations

mod loader;
mod processor;
mod records;

pub use loader::{orders_from_frame, reviews_from_frame, DataLoader, LoaderError};
pub use processor::{
    DataProcessor, ProcessorError, DELIVERED_STATUS, DELIVERY_TIME_BOUNDARIES,
    DELIVERY_TIME_LABELS,
};
pub use records::{
    parse_timestamp, DeliveredOrder, DeliveryBucket, DeliveryStatus, RawOrder, Review,
    ReviewOrder, NO_MESSAGE, NO_TITLE,
};
