//! Constants tuning the byte tap and binary codec.

/// Initial capacity reserved for a growable encode buffer, in bytes.
/// `Schema::to_buffer` starts with this much room and doubles on overflow.
pub const INITIAL_BUFFER_RESERVE: usize = 1024;

/// Maximum number of bytes a zig-zag varint may occupy before decoding is
/// treated as malformed. Ten groups of 7 bits cover all 64-bit values.
pub const MAX_VARINT_BYTES: usize = 10;
