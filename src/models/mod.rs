mod record;
mod sheet;

pub use record::{FieldValue, Record, FORM_TYPE_KEY, UNKNOWN_FORM_TYPE};
pub use sheet::{HeaderFormat, LogDocument, Sheet};
