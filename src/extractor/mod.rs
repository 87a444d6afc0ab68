pub mod batch;
pub mod nomina;
pub mod record;
pub mod report;
pub mod totals;

pub use batch::{BatchExtractor, BatchProgress, FileFailure};
pub use nomina::{parse_document, parse_file, NOMINA12_NAMESPACE};
pub use record::CfdiRecord;
pub use report::{ConfigSnapshot, RunReport};
pub use totals::{aggregate, AggregateSummary, NominaTotals, PaymentPeriod};
