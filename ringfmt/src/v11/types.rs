//! V11 ring-item type tags. Numeric values below `FIRST_USER_ITEM_CODE`
//! match the event-builder wire format this dialect descends from.
//!
//! `EVB_FRAGMENT`/`EVB_UNKNOWN_PAYLOAD` are not attested anywhere in the
//! retrieved reference material; the values here are this crate's own
//! consistent assumption (see DESIGN.md).

pub const VOID: u32 = 0;
pub const BEGIN_RUN: u32 = 0x0001;
pub const END_RUN: u32 = 0x0002;
pub const PAUSE_RUN: u32 = 0x0003;
pub const RESUME_RUN: u32 = 0x0004;
pub const ABNORMAL_ENDRUN: u32 = 0x0005;
pub const EVB_FRAGMENT: u32 = 0x0010;
pub const EVB_UNKNOWN_PAYLOAD: u32 = 0x0011;
pub const PACKET_TYPES: u32 = 0x000a;
pub const MONITORED_VARIABLES: u32 = 0x000b;
pub const RING_FORMAT: u32 = 0x000c;
pub const PERIODIC_SCALERS: u32 = 0x0014;
pub const PHYSICS_EVENT: u32 = 0x001e;
pub const PHYSICS_EVENT_COUNT: u32 = 0x001f;
pub const EVB_GLOM_INFO: u32 = 0x002a;
pub const FIRST_USER_ITEM_CODE: u32 = 0x4000;

pub fn is_state_change(t: u32) -> bool {
    matches!(t, BEGIN_RUN | END_RUN | PAUSE_RUN | RESUME_RUN | ABNORMAL_ENDRUN)
}
