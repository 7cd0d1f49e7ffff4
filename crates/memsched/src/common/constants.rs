//! Global Simulator Constants.

/// Number of buckets in a per-process streak-length histogram.
///
/// Buckets `1..=15` count streaks of exactly that length; bucket 16 counts
/// every streak of length 16 or more. Bucket 0 is never written.
pub const STREAK_BUCKETS: usize = 17;

/// Index of the saturating "16 or more" streak bucket.
pub const STREAK_OVERFLOW_BUCKET: usize = STREAK_BUCKETS - 1;

/// Maximum total width of the channel, rank, bank, and column fields.
///
/// At least one bit must remain for the row field.
pub const MAX_FIELD_BITS: u32 = 63;

/// Maximum combined width of the channel, rank, and bank fields.
///
/// Bounds the bank arena at 65536 banks across all channels.
pub const MAX_TOPOLOGY_BITS: u32 = 16;
