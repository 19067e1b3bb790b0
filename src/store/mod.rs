pub mod delivery;
pub mod notification;
pub mod persist;
pub mod session;
pub mod shipment;
pub mod wallet;
