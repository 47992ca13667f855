//! Bus addresses.
//!
//! A Maple address is a single opaque byte identifying a destination on a bus
//! port. Only a few values are reserved by the protocol itself; everything
//! else is assigned by bus enumeration and treated as opaque by this crate.

/// A single-byte Maple bus address.
pub type Address = u8;

/// Host address, used as the `sender` field on every host-originated frame.
pub const ADDRESS_HOST: Address = 0x00;

/// Controller: main peripheral, port A.
pub const ADDRESS_CONTROLLER: Address = 0x20;

/// First sub-peripheral on port A (e.g. a VMU plugged into the controller).
pub const ADDRESS_SUB_PERIPHERAL_1: Address = 0x01;
