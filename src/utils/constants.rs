/// Met Office archive of UK regional climate series
pub const BASE_URL: &str = "https://www.metoffice.gov.uk/pub/data/weather/uk/climate/datasets/";

/// Path segment selecting the year-ordered layout of each series
pub const ORDER_SEGMENT: &str = "/date/";

/// Local paths
pub const CACHE_DIR: &str = "data";
pub const OUTPUT_PATH: &str = "output/out.csv";
pub const SOURCE_FILE_EXTENSION: &str = "txt";

/// Source file layout
pub const METADATA_LINES: usize = 7;
pub const HEADER_LINE_INDEX: usize = METADATA_LINES;

/// Maximum whitespace run treated as a single separator
pub const HEADER_MAX_SEPARATOR_RUN: usize = 5;
pub const DATA_MAX_SEPARATOR_RUN: usize = 6;

/// Missing value handling
pub const MISSING_MARKER: &str = "---";
pub const NOT_AVAILABLE: &str = "N/A";

/// I/O defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
