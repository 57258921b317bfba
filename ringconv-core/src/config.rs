use ringfmt::v8::SizePolicy;

/// Configuration threaded explicitly through transform and mediator
/// constructors, in place of the process-wide globals the conversion
/// rules were originally specified against.
#[derive(Debug, Clone, Copy)]
pub struct ConvertConfig {
    /// Serialized size of every emitted V8 buffer, in bytes.
    pub v8_buffer_size: usize,
    /// Convention delimiting events inside a V8 DATABF body. Effective
    /// only when V8 is the input dialect; V8 cannot self-describe this.
    pub v8_size_policy: SizePolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            v8_buffer_size: ringfmt::v8::DEFAULT_BUFFER_SIZE,
            v8_size_policy: SizePolicy::default(),
        }
    }
}
