//! Form-control state: values, selections, focus, options and files

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde_json::Map;
use tracing::trace;

use crate::dom::{normalize_whitespace, Dom};
use crate::errors::DomResult;
use crate::node::{FileValue, NodeId};

impl Dom {
    /// Lower-cased `type` attribute of an `<input>`; empty when absent.
    /// `None` for every other node.
    pub fn input_type(&self, id: NodeId) -> Option<String> {
        let element = self.element(id).filter(|el| el.is("input"))?;
        Some(element.attribute("type").unwrap_or_default().to_ascii_lowercase())
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attribute(id, "disabled")
    }

    pub fn is_readonly(&self, id: NodeId) -> bool {
        self.has_attribute(id, "readonly")
    }

    /// `isContentEditable`: the nearest `contenteditable` attribute wins
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut current = self.is_element(id).then_some(id);
        while let Some(node) = current {
            match self.attribute(node, "contenteditable").map(str::to_ascii_lowercase) {
                Some(value) if value.is_empty() || value == "true" || value == "plaintext-only" => {
                    return true
                }
                Some(value) if value == "false" => return false,
                _ => current = self.parent_element(node),
            }
        }
        false
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.value.as_str())
    }

    /// Assign a control value the way the `value` IDL setter does: input
    /// values are sanitized for their type, and the caret moves to the end.
    pub fn set_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let sanitized = match self.input_type(id) {
            Some(input_type) => sanitize_input_value(&input_type, value),
            None => value.to_string(),
        };
        let element = self.try_element_mut(id)?;
        let end = sanitized.chars().count();
        element.value = sanitized;
        if element.is("input") || element.is("textarea") {
            element.selection = Some((end, end));
        }
        Ok(())
    }

    pub fn selection_range(&self, id: NodeId) -> Option<(usize, usize)> {
        self.element(id).and_then(|element| element.selection)
    }

    pub fn set_selection_range(&mut self, id: NodeId, start: usize, end: usize) -> DomResult<()> {
        let element = self.try_element_mut(id)?;
        let len = element.value.chars().count();
        let end = end.min(len);
        element.selection = Some((start.min(end), end));
        Ok(())
    }

    /// `HTMLInputElement.select()`
    pub fn select(&mut self, id: NodeId) -> DomResult<()> {
        let element = self.try_element_mut(id)?;
        element.selection = Some((0, element.value.chars().count()));
        Ok(())
    }

    /// Replace the document selection with a range spanning the node's contents
    pub fn select_node_contents(&mut self, id: NodeId) {
        self.range_selection = Some(id);
    }

    /// Container whose contents the document selection spans, if any
    pub fn range_selection(&self) -> Option<NodeId> {
        self.range_selection
    }

    /// Move focus to a connected element. Returns whether the element holds
    /// focus afterwards.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_element(id) || !self.is_connected(id) {
            return false;
        }
        if self.active_element == Some(id) {
            return true;
        }
        if let Some(previous) = self.active_element.take() {
            self.dispatch_event(previous, "blur", Map::new());
        }
        self.active_element = Some(id);
        trace!(node = %id, "focus");
        self.dispatch_event(id, "focus", Map::new());
        true
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// `<option>` descendants of a `<select>` (optgroups included), in order
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendant_elements(select, false)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|el| el.is("option")))
            .collect()
    }

    pub fn option_value(&self, option: NodeId) -> String {
        match self.attribute(option, "value") {
            Some(value) => value.to_string(),
            None => normalize_whitespace(&self.text_content(option)),
        }
    }

    pub fn option_label(&self, option: NodeId) -> String {
        match self.attribute(option, "label").filter(|label| !label.is_empty()) {
            Some(label) => label.to_string(),
            None => normalize_whitespace(&self.text_content(option)),
        }
    }

    pub fn is_selected(&self, option: NodeId) -> bool {
        self.element(option).is_some_and(|element| element.selected)
    }

    pub fn set_selected(&mut self, option: NodeId, selected: bool) -> DomResult<()> {
        self.try_element_mut(option)?.selected = selected;
        Ok(())
    }

    pub fn is_multiple(&self, select: NodeId) -> bool {
        self.has_attribute(select, "multiple")
    }

    pub fn files(&self, id: NodeId) -> &[FileValue] {
        self.element(id)
            .map(|element| element.files.as_slice())
            .unwrap_or_default()
    }

    /// Replace the file list in one assignment
    pub fn set_files(&mut self, id: NodeId, files: Vec<FileValue>) -> DomResult<()> {
        self.try_element_mut(id)?.files = files;
        Ok(())
    }
}

/// Value sanitization algorithm of the given input type. Invalid date and
/// number values sanitize to the empty string.
pub fn sanitize_input_value(input_type: &str, value: &str) -> String {
    let valid = match input_type {
        "date" => canonical(value, |v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .ok()
                .map(|d| d.format("%Y-%m-%d").to_string())
        }),
        "month" => canonical(value, |v| {
            NaiveDate::parse_from_str(&format!("{v}-01"), "%Y-%m-%d")
                .ok()
                .map(|d| d.format("%Y-%m").to_string())
        }),
        "week" => is_valid_week(value),
        "time" => is_valid_time(value),
        "datetime-local" => match value.split_once('T') {
            Some((date, time)) => {
                sanitize_input_value("date", date) == date && is_valid_time(time)
            }
            None => false,
        },
        "number" => value.parse::<f64>().is_ok_and(f64::is_finite),
        "" | "text" | "search" | "tel" | "url" | "email" | "password" => {
            return value.replace(['\r', '\n'], "")
        }
        _ => true,
    };
    if valid {
        value.to_string()
    } else {
        String::new()
    }
}

fn canonical(value: &str, reformat: impl Fn(&str) -> Option<String>) -> bool {
    reformat(value).is_some_and(|formatted| formatted == value)
}

fn is_valid_time(value: &str) -> bool {
    let formats = [("%H:%M", 5usize), ("%H:%M:%S", 8), ("%H:%M:%S%.f", 12)];
    formats.iter().any(|(format, len)| {
        value.len() == *len && NaiveTime::parse_from_str(value, format).is_ok()
    })
}

fn is_valid_week(value: &str) -> bool {
    let Some((year, week)) = value.split_once("-W") else {
        return false;
    };
    if year.len() != 4 || week.len() != 2 {
        return false;
    }
    match (year.parse::<i32>(), week.parse::<u32>()) {
        (Ok(year), Ok(week)) => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).is_some(),
        _ => false,
    }
}

/// Parse a `datetime-local` value; used by hosts that mirror control state
pub fn parse_datetime_local(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_values_must_be_canonical() {
        assert_eq!(sanitize_input_value("date", "2020-02-29"), "2020-02-29");
        assert_eq!(sanitize_input_value("date", "2021-02-29"), "");
        assert_eq!(sanitize_input_value("date", "2020-2-3"), "");
        assert_eq!(sanitize_input_value("month", "2020-12"), "2020-12");
        assert_eq!(sanitize_input_value("month", "2020-13"), "");
        assert_eq!(sanitize_input_value("week", "2020-W53"), "2020-W53");
        assert_eq!(sanitize_input_value("week", "2021-W53"), "");
    }

    #[test]
    fn time_and_datetime_local() {
        assert_eq!(sanitize_input_value("time", "13:37"), "13:37");
        assert_eq!(sanitize_input_value("time", "13:37:01"), "13:37:01");
        assert_eq!(sanitize_input_value("time", "25:00"), "");
        assert_eq!(
            sanitize_input_value("datetime-local", "2020-01-01T10:00"),
            "2020-01-01T10:00"
        );
        assert_eq!(sanitize_input_value("datetime-local", "2020-01-01 10:00"), "");
        assert!(parse_datetime_local("2020-01-01T10:00").is_some());
    }

    #[test]
    fn text_types_strip_line_breaks() {
        assert_eq!(sanitize_input_value("text", "a\nb\r"), "ab");
        assert_eq!(sanitize_input_value("number", "1e3"), "1e3");
        assert_eq!(sanitize_input_value("number", "abc"), "");
    }

    #[test]
    fn content_editable_is_inherited() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let editor = dom
            .append_element(doc, "div", &[("contenteditable", "")])
            .unwrap();
        let nested = dom.append_element(editor, "p", &[]).unwrap();
        let off = dom
            .append_element(editor, "p", &[("contenteditable", "false")])
            .unwrap();
        assert!(dom.is_content_editable(nested));
        assert!(!dom.is_content_editable(off));
        assert!(!dom.is_content_editable(doc));
    }

    #[test]
    fn focus_moves_between_elements() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let first = dom.append_element(doc, "input", &[]).unwrap();
        let second = dom.append_element(doc, "input", &[]).unwrap();
        let detached = dom.create_element("input");

        assert!(dom.focus(first));
        assert!(dom.focus(second));
        assert!(!dom.focus(detached));
        assert_eq!(dom.active_element(), Some(second));
        assert_eq!(dom.event_types_for(first), vec!["focus", "blur"]);
    }

    #[test]
    fn option_value_falls_back_to_text() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let select = dom.append_element(doc, "select", &[]).unwrap();
        let group = dom.append_element(select, "optgroup", &[]).unwrap();
        let option = dom.append_element(group, "option", &[]).unwrap();
        dom.append_text(option, "  Red   apple ").unwrap();
        assert_eq!(dom.options(select), vec![option]);
        assert_eq!(dom.option_value(option), "Red apple");
        assert_eq!(dom.option_label(option), "Red apple");
    }
}
