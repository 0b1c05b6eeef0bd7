pub mod config;
pub mod discovery;
pub mod duplicate;
pub mod hash;
pub mod image;
pub mod output;
pub mod quality;
pub mod report;
pub mod scanner;
pub mod similarity;

pub use self::config::{ConfigError, ScanConfig, Tolerance, MAX_TOLERANCE};
pub use self::discovery::discover_files;
pub use self::duplicate::{Decision, DuplicateDetector, Representative};
pub use self::hash::{encode, Fingerprint, HashError, DEFAULT_HASH_SIZE};
pub use self::image::{ImageLoadError, ImageRecord};
pub use self::output::{OutputDir, OutputError};
pub use self::quality::{evaluate, is_better, QualityScore, QualityStrategy};
pub use self::report::{read_report, ReportEntry, ReportError, ReportWriter};
pub use self::scanner::{dedupe_directory, ScanError, ScanProgress, ScanReport, ScanState, Scanner};
pub use self::similarity::{are_duplicates, hamming_distance, LengthMismatchError};
