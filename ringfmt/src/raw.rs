//! The raw item: a uniform, type-tagged, size-prefixed byte container
//! used as the vehicle between the byte codec and the per-dialect record
//! types. Every dialect's `from_raw`/`to_raw` pair converts through this.

/// A parsed-but-not-yet-typed record, common across V8/V10/V11.
#[derive(Debug, Clone)]
pub struct RawItem {
    /// On-wire type tag (dialect-specific numeric space).
    pub item_type: u32,
    /// Total on-wire size in bytes, as declared by the dialect's header.
    pub size: u32,
    /// Event timestamp, when the dialect carries one (V11 body header,
    /// V10 timestamped scalers/fragments). `None` when absent.
    pub event_timestamp: Option<u64>,
    /// Event-builder source id, when present (V11 body header, V10 fragments).
    pub source_id: Option<u32>,
    /// Event-builder barrier type, when present.
    pub barrier_type: Option<u32>,
    /// Body bytes, exactly as they appeared on the wire (not byte-swapped;
    /// swapping happens when a dialect record reads typed fields out of
    /// this body via a [`crate::byteio::ByteReader`]).
    pub body: Vec<u8>,
    /// Whether multi-byte fields in `body` are in non-native order.
    pub swap: bool,
}

impl RawItem {
    pub fn new(item_type: u32, body: Vec<u8>, swap: bool) -> Self {
        Self {
            item_type,
            size: body.len() as u32,
            event_timestamp: None,
            source_id: None,
            barrier_type: None,
            body,
            swap,
        }
    }
}
