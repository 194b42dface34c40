//! Synthetic events recorded by the document

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::NodeId;

/// Event interface an event type is dispatched with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Mouse,
    Keyboard,
    Touch,
    Pointer,
    Focus,
    Drag,
    Generic,
}

impl EventKind {
    /// Classify an event type name. Unknown names dispatch as plain events.
    pub fn classify(event_type: &str) -> Self {
        match event_type {
            "auxclick" | "click" | "dblclick" | "mousedown" | "mouseenter" | "mouseleave"
            | "mousemove" | "mouseout" | "mouseover" | "mouseup" | "mousewheel" => Self::Mouse,
            "keydown" | "keyup" | "keypress" | "textInput" => Self::Keyboard,
            "touchstart" | "touchmove" | "touchend" | "touchcancel" => Self::Touch,
            "pointerover" | "pointerout" | "pointerenter" | "pointerleave" | "pointerdown"
            | "pointerup" | "pointermove" | "pointercancel" | "gotpointercapture"
            | "lostpointercapture" => Self::Pointer,
            "focus" | "blur" => Self::Focus,
            "drag" | "dragstart" | "dragend" | "dragover" | "dragenter" | "dragleave"
            | "dragexit" | "drop" => Self::Drag,
            _ => Self::Generic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Keyboard => "keyboard",
            Self::Touch => "touch",
            Self::Pointer => "pointer",
            Self::Focus => "focus",
            Self::Drag => "drag",
            Self::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomEvent {
    pub target: NodeId,
    pub event_type: String,
    pub kind: EventKind,
    pub init: Map<String, Value>,
}

impl DomEvent {
    pub fn flag(&self, name: &str) -> bool {
        self.init.get(name).and_then(Value::as_bool).unwrap_or(false)
    }
}
