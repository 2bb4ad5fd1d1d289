//! Client side of the intake flow: turn a form's controls into a record and
//! post it to the intake endpoint without reading the reply.

pub mod submitter;

use crate::models::{FieldValue, Record};

pub use submitter::{
    Banner, BannerKind, ControlState, ConversionEvent, ConversionTracker, FormSubmitter,
    SubmitControl, SubmitOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    Input,
    Checkbox { checked: bool },
    Select,
    TextArea,
}

/// One named form control and its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub kind: ControlKind,
    pub name: Option<String>,
    pub value: String,
}

impl FormControl {
    pub fn input(name: &str, value: &str) -> Self {
        Self::named(ControlKind::Input, name, value)
    }

    pub fn checkbox(name: &str, value: &str, checked: bool) -> Self {
        Self::named(ControlKind::Checkbox { checked }, name, value)
    }

    pub fn select(name: &str, value: &str) -> Self {
        Self::named(ControlKind::Select, name, value)
    }

    pub fn textarea(name: &str, value: &str) -> Self {
        Self::named(ControlKind::TextArea, name, value)
    }

    fn named(kind: ControlKind, name: &str, value: &str) -> Self {
        Self {
            kind,
            name: Some(name.to_string()),
            value: value.to_string(),
        }
    }
}

/// Serialize controls the way the site's forms submit them: checked boxes
/// sharing a name accumulate into a list, everything else with a name and a
/// value overwrites by name.
pub fn collect(form_type: &str, controls: &[FormControl]) -> Record {
    let mut record = Record::new(form_type);

    for control in controls {
        let Some(name) = control.name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };

        match control.kind {
            ControlKind::Checkbox { checked: false } => {}
            ControlKind::Checkbox { checked: true } => match record.get_mut(name) {
                Some(FieldValue::List(items)) => items.push(control.value.clone()),
                _ => record.insert(name, FieldValue::List(vec![control.value.clone()])),
            },
            _ if control.value.is_empty() => {}
            _ => record.insert(name, FieldValue::Text(control.value.clone())),
        }
    }

    record
}
