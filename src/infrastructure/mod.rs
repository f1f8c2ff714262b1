//! Adapters behind the domain ports: stores, the geocoding client and the
//! metrics-hooks delivery.

pub mod in_memory;
pub mod metrics;
pub mod nominatim;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
