//! Background and file-system services

pub mod backup;
pub mod exchange_rate;
pub mod invoice;
