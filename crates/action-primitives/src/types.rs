//! Core data types for action primitives

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use inpage_dom::{FileValue, NodeId};
use perceiver_structural::MIN_FRAME_GAP;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::ActionError;

/// Closed set of terminal tags an action settles with
macro_rules! outcome_tags {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $tag:tt,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }

            /// Tags of the `error:` family
            pub fn is_error(&self) -> bool {
                self.as_str().starts_with("error:")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

outcome_tags! {
    /// Result of `fill`
    FillOutcome {
        NotElement => "error:notelement",
        NotConnected => "error:notconnected",
        NotFillableInputType => "error:notfillableinputtype",
        NotFillableNumberInput => "error:notfillablenumberinput",
        NotValidDate => "error:notvaliddate",
        NotFillableElement => "error:notfillableelement",
        /// Text is selected and focused; the caller types the value
        NeedsInput => "needsinput",
        /// The value was assigned directly (date-like inputs)
        Done => "done",
    }
}

outcome_tags! {
    /// Result of `select_text`
    SelectTextOutcome {
        NotConnected => "error:notconnected",
        Done => "done",
    }
}

outcome_tags! {
    /// Result of the node readiness waits
    NodeStateOutcome {
        NotConnected => "error:notconnected",
        Done => "done",
    }
}

outcome_tags! {
    /// Result of `focus_node`
    FocusOutcome {
        NotConnected => "error:notconnected",
        NotElement => "error:notelement",
        Done => "done",
    }
}

outcome_tags! {
    /// Result of `set_input_files`
    SetInputFilesOutcome {
        NotElement => "error:notelement",
        NotInput => "error:notinput",
        NotFileInput => "error:notfileinput",
        NotConnected => "error:notconnected",
        Done => "done",
    }
}

/// Result of `select_options`: either an error tag or the selected values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOptionsOutcome {
    NotSelect,
    NotConnected,
    /// Values of the selected options, in option order
    Selected(Vec<String>),
}

impl SelectOptionsOutcome {
    /// Error tag, `None` for a successful selection
    pub fn error_tag(&self) -> Option<&'static str> {
        match self {
            SelectOptionsOutcome::NotSelect => Some("error:notselect"),
            SelectOptionsOutcome::NotConnected => Some("error:notconnected"),
            SelectOptionsOutcome::Selected(_) => None,
        }
    }

    pub fn selected(&self) -> Option<&[String]> {
        match self {
            SelectOptionsOutcome::Selected(values) => Some(values),
            _ => None,
        }
    }
}

impl Serialize for SelectOptionsOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SelectOptionsOutcome::Selected(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            other => serializer.serialize_str(other.error_tag().unwrap_or_default()),
        }
    }
}

/// Field criteria for matching an `<option>`; absent fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// One entry of a `select_options` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionSelector {
    /// This exact `<option>` node
    Node(NodeId),
    Criteria(OptionCriteria),
}

impl OptionSelector {
    pub fn value(value: impl Into<String>) -> Self {
        OptionSelector::Criteria(OptionCriteria {
            value: Some(value.into()),
            ..OptionCriteria::default()
        })
    }

    pub fn label(label: impl Into<String>) -> Self {
        OptionSelector::Criteria(OptionCriteria {
            label: Some(label.into()),
            ..OptionCriteria::default()
        })
    }

    pub fn index(index: usize) -> Self {
        OptionSelector::Criteria(OptionCriteria {
            index: Some(index),
            ..OptionCriteria::default()
        })
    }
}

/// File handed over by the driver, contents base64-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    pub name: String,
    pub mime_type: String,
    pub buffer: String,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            buffer: STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> Result<FileValue, ActionError> {
        let bytes = STANDARD
            .decode(self.buffer.as_bytes())
            .map_err(|err| ActionError::InvalidFilePayload {
                name: self.name.clone(),
                reason: err.to_string(),
            })?;
        Ok(FileValue {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            bytes,
        })
    }
}

/// Pacing knobs of the readiness waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveOptions {
    /// Tick interval of the stable-position wait when one frame suffices
    pub stable_poll_interval: Duration,
    /// Ticks closer than this are skipped when waiting for several frames
    pub min_frame_gap: Duration,
}

impl Default for PrimitiveOptions {
    fn default() -> Self {
        Self {
            stable_poll_interval: Duration::from_millis(16),
            min_frame_gap: MIN_FRAME_GAP,
        }
    }
}
