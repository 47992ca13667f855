//! Maple bus frame codec.
//!
//! Pure, allocation-light encode/decode of Maple bus frames: addresses,
//! command bytes, function-code bitmasks, the word-swap transform, the XOR
//! checksum, and parsers for the handful of response payloads the rest of
//! this workspace cares about. Nothing in this crate touches I/O.

mod address;
mod command;
mod errors;
mod frame;
mod function_code;
mod payloads;

pub use address::{Address, ADDRESS_CONTROLLER, ADDRESS_HOST, ADDRESS_SUB_PERIPHERAL_1};
pub use command::Command;
pub use errors::{ProtocolError, Result};
pub use frame::{checksum, decode_header, encode_request, word_swap, FrameHeader, MAX_PAYLOAD_LEN};
pub use function_code::{
    decode_func_codes, FN_AR_GUN, FN_CLOCK, FN_CODE_NAMES, FN_CONTROLLER, FN_KEYBOARD, FN_LCD,
    FN_LIGHT_GUN, FN_MEMORY_CARD, FN_MICROPHONE, FN_MOUSE, FN_PURU_PURU,
};
pub use payloads::{
    held_buttons, parse_controller_cond, parse_device_info, parse_mem_info, ControllerCondition,
    DeviceInfo, MemInfo, BUTTON_NAMES,
};
