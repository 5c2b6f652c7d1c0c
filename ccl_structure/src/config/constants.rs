pub mod compile_time {
    pub mod file_processing {
        /// Maximum source file size accepted for scanning (10MB)
        /// SECURITY: Prevents DoS via enormous source files
        pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

        /// Threshold for considering a file "large" (1MB)
        pub const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024;

        /// Maximum line count of a scanned source file
        /// SECURITY: Bounds the line coalescer's work
        pub const MAX_LINE_COUNT: usize = 100_000;

        /// Extensions recognized as CCL source
        pub const CCL_EXTENSIONS: &[&str] = &["prg", "inc", "sub", "ccl"];
    }

    pub mod declaration {
        /// Maximum length of one coalesced declaration (bytes)
        /// SECURITY: Prevents unbalanced-paren scans from swallowing a whole file
        pub const MAX_DECLARATION_LENGTH: usize = 1_048_576;

        /// Maximum number of physical lines a declaration may span
        pub const MAX_DECLARATION_LINES: usize = 10_000;

        /// Deepest level number accepted on an item
        /// RESOURCE: Bounds recursion when walking structures and records
        pub const MAX_NESTING_LEVEL: u32 = 64;

        /// Maximum member name length
        pub const MAX_MEMBER_NAME_LENGTH: usize = 255;

        /// Maximum include path length
        pub const MAX_INCLUDE_PATH_LENGTH: usize = 1024;

        /// Include path expanded in place instead of being left unresolved
        pub const STATUS_BLOCK_INCLUDE: &str = "cclsource:status_block.inc";

        /// Largest fixed-length list count
        pub const MAX_FIXED_LIST_COUNT: u32 = 1_000_000;
    }

    pub mod record {
        /// Longest line CCL accepts in a command
        pub const CCL_LINE_LENGTH: usize = 132;

        /// Length of a continuation chunk when a string value is split
        pub const CCL_CONTINUATION_CHUNK: usize = 129;

        /// Upper bound on dynamic list growth from a single reply
        /// RESOURCE: Prevents memory exhaustion from hostile replies
        pub const MAX_DYNAMIC_LIST_ITEMS: usize = 1_000_000;

        /// Upper bound on nested records a schema creates up front, counting
        /// every item of every fixed-length list at every depth
        /// RESOURCE: Prevents nested occurs counts from multiplying into
        /// unbounded allocations
        pub const MAX_PREALLOCATED_RECORDS: usize = 100_000;
    }

    pub mod logging {
        /// Log buffer size for batch operations
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;

        /// Maximum log events per file before truncation
        pub const MAX_LOG_EVENTS_PER_FILE: usize = 1_000;
    }
}
