//! Pipeline defaults and sanity bounds.

/// Default encode-direction block size (32 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 32 * 1024 * 1024;

/// Max block size sanity bound (256 MiB).
pub const MAX_BLOCK_SIZE: usize = 256 * 1024 * 1024;

/// Default decode-direction row group, in thousands of records.
pub const DEFAULT_ROWS_THOUSANDS: usize = 1;

/// Records per "thousand" unit of the decode-direction chunk size.
pub const ROWS_PER_THOUSAND: usize = 1_000;

/// Read-ahead buffer in front of the source stream (32 MiB).
pub const DEFAULT_READ_BUFFER: usize = 32 * 1024 * 1024;

/// Upper bound on the worker pool.
pub const MAX_WORKERS: usize = 256;

/// Suffix appended to the source path when no destination is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".scoutput";

/// Suffix of the in-progress destination file before it is finalized.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Name of the reference transform.
pub const DEFAULT_TRANSFORM: &str = "base64";

/// Line terminator closing every encoded block.
pub const LINE_TERMINATOR: u8 = b'\n';
