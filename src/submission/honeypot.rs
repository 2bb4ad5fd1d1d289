use crate::models::Record;

/// Remove the honeypot field from the record. Returns true if it was filled.
pub fn strip_trap(record: &mut Record, honeypot_field: Option<&str>) -> bool {
    let Some(field) = honeypot_field else {
        return false;
    };

    if field.is_empty() {
        return false;
    }

    record.remove(field).is_some_and(|value| !value.is_empty())
}
