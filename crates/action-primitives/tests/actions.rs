use std::sync::Arc;
use std::time::Duration;

use action_locator::{DefaultSelectorResolver, ParsedSelector, SelectorError};
use action_primitives::{
    ActionError, ActionPrimitives, DefaultActionPrimitives, FilePayload, FillOutcome,
    FocusOutcome, HitTargetOutcome, NodeStateOutcome, OptionSelector, SelectOptionsOutcome,
    SelectTextOutcome, SetInputFilesOutcome,
};
use inpage_dom::{Dom, EventKind, NodeId, Point, Rect, SharedDom, Visibility};
use inpage_scheduler::{ManualFrameSource, PollError, Poller};
use query_engines::EngineRegistry;
use serde_json::{json, Map};
use tokio_test::{assert_pending, assert_ready, task};

const NOT_VISIBLE: &str = "    element is not visible - waiting...";
const MOVING: &str = "    element is moving - waiting...";
const DISABLED: &str = "    element is disabled - waiting...";
const READONLY: &str = "    element is readonly - waiting...";

struct Page {
    primitives: DefaultActionPrimitives,
    dom: SharedDom,
    frames: Arc<ManualFrameSource>,
}

fn page(dom: Dom) -> Page {
    let dom = dom.into_shared();
    let frames = Arc::new(ManualFrameSource::new());
    let resolver = Arc::new(DefaultSelectorResolver::new(Arc::new(EngineRegistry::builtin())));
    let primitives =
        DefaultActionPrimitives::new(dom.clone(), resolver, Poller::new(frames.clone()));
    Page {
        primitives,
        dom,
        frames,
    }
}

/// Append an element laid out at the top-left corner
fn shown(dom: &mut Dom, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let id = dom.append_element(parent, tag, attrs).unwrap();
    dom.set_rect(id, Some(Rect::new(0.0, 0.0, 100.0, 20.0))).unwrap();
    id
}

async fn settle_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Let pending polls reach their frame wait, then signal one refresh
async fn refresh(page: &Page) {
    settle_tasks().await;
    page.frames.advance();
}

#[tokio::test]
async fn fill_selects_text_inputs_for_typing() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let input = shown(&mut dom, doc, "input", &[("type", "email")]);
    dom.set_value(input, "old").unwrap();
    let page = page(dom);

    let mut handle = page.primitives.fill(input, "new@example.com");
    assert_eq!(handle.result().await, Ok(FillOutcome::NeedsInput));

    let dom = page.dom.read();
    assert_eq!(dom.selection_range(input), Some((0, 3)));
    assert_eq!(dom.active_element(), Some(input));
    // typing is left to the driver
    assert_eq!(dom.value(input), Some("old"));
}

#[tokio::test]
async fn fill_waits_for_visibility() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let input = dom.append_element(doc, "input", &[]).unwrap();
    let page = page(dom);

    let mut handle = page.primitives.fill(input, "hello");
    assert_eq!(handle.take_next_logs().await, vec![NOT_VISIBLE.to_string()]);

    page.dom
        .write()
        .set_rect(input, Some(Rect::new(0.0, 0.0, 50.0, 10.0)))
        .unwrap();
    refresh(&page).await;
    assert_eq!(handle.result().await, Ok(FillOutcome::NeedsInput));
}

#[tokio::test]
async fn fill_waits_while_readonly() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let area = shown(&mut dom, doc, "textarea", &[("readonly", "")]);
    let page = page(dom);

    let mut handle = page.primitives.fill(area, "notes");
    assert_eq!(handle.take_next_logs().await, vec![READONLY.to_string()]);

    page.dom.write().remove_attribute(area, "readonly").unwrap();
    refresh(&page).await;
    assert_eq!(handle.result().await, Ok(FillOutcome::NeedsInput));
}

#[tokio::test]
async fn fill_rejects_unfillable_targets() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let checkbox = shown(&mut dom, doc, "input", &[("type", "Checkbox")]);
    let number = shown(&mut dom, doc, "input", &[("type", "number")]);
    let plain = shown(&mut dom, doc, "div", &[]);
    let text = dom.append_text(plain, "label").unwrap();
    let detached = dom.create_element("input");
    let page = page(dom);

    let mut handle = page.primitives.fill(checkbox, "on");
    assert_eq!(handle.result().await, Ok(FillOutcome::NotFillableInputType));
    assert_eq!(
        handle.take_last_logs(),
        vec!["    input of type \"checkbox\" cannot be filled".to_string()]
    );

    let mut handle = page.primitives.fill(number, " 12abc ");
    assert_eq!(handle.result().await, Ok(FillOutcome::NotFillableNumberInput));

    let mut handle = page.primitives.fill(plain, "x");
    assert_eq!(handle.result().await, Ok(FillOutcome::NotFillableElement));

    let mut handle = page.primitives.fill(text, "x");
    assert_eq!(handle.result().await, Ok(FillOutcome::NotElement));

    let mut handle = page.primitives.fill(detached, "x");
    assert_eq!(handle.result().await, Ok(FillOutcome::NotConnected));
}

#[tokio::test]
async fn fill_assigns_date_values_directly() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let date = shown(&mut dom, doc, "input", &[("type", "date")]);
    let month = shown(&mut dom, doc, "input", &[("type", "month")]);
    let page = page(dom);

    let mut handle = page.primitives.fill(date, " 2024-02-29 ");
    assert_eq!(handle.result().await, Ok(FillOutcome::Done));
    {
        let dom = page.dom.read();
        assert_eq!(dom.value(date), Some("2024-02-29"));
        assert_eq!(dom.event_types_for(date), vec!["focus", "input", "change"]);
    }

    let mut handle = page.primitives.fill(month, "2024-13");
    assert_eq!(handle.result().await, Ok(FillOutcome::NotValidDate));
}

#[tokio::test]
async fn fill_and_select_text_on_content_editable() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let editor = shown(&mut dom, doc, "div", &[("contenteditable", "true")]);
    let paragraph = dom.append_element(editor, "p", &[]).unwrap();
    let words = dom.append_text(paragraph, "draft").unwrap();
    let page = page(dom);

    let mut handle = page.primitives.fill(editor, "final");
    assert_eq!(handle.result().await, Ok(FillOutcome::NeedsInput));
    assert_eq!(page.dom.read().range_selection(), Some(editor));

    // a text node selects through its parent element
    page.dom
        .write()
        .set_rect(paragraph, Some(Rect::new(0.0, 0.0, 80.0, 10.0)))
        .unwrap();
    let mut handle = page.primitives.select_text(words);
    assert_eq!(handle.result().await, Ok(SelectTextOutcome::Done));
    let dom = page.dom.read();
    assert_eq!(dom.range_selection(), Some(paragraph));
    assert_eq!(dom.active_element(), Some(paragraph));
}

#[tokio::test]
async fn select_text_selects_textarea_contents() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let area = shown(&mut dom, doc, "textarea", &[]);
    dom.set_value(area, "two\nlines").unwrap();
    let detached = dom.create_element("textarea");
    let page = page(dom);

    let mut handle = page.primitives.select_text(area);
    assert_eq!(handle.result().await, Ok(SelectTextOutcome::Done));
    assert_eq!(page.dom.read().selection_range(area), Some((0, 9)));

    let mut handle = page.primitives.select_text(detached);
    assert_eq!(handle.result().await, Ok(SelectTextOutcome::NotConnected));
}

fn select_with_options(dom: &mut Dom, multiple: bool) -> (NodeId, Vec<NodeId>) {
    let doc = dom.document();
    let attrs: &[(&str, &str)] = if multiple { &[("multiple", "")] } else { &[] };
    let select = shown(dom, doc, "select", attrs);
    let options = ["a", "b", "c"]
        .into_iter()
        .map(|value| {
            let option = dom.append_element(select, "option", &[("value", value)]).unwrap();
            dom.append_text(option, &value.to_uppercase()).unwrap();
            option
        })
        .collect();
    (select, options)
}

#[tokio::test]
async fn single_select_takes_only_the_first_match() {
    let mut dom = Dom::new();
    let (select, options) = select_with_options(&mut dom, false);
    dom.set_selected(options[0], true).unwrap();
    let page = page(dom);

    let mut handle = page.primitives.select_options(
        select,
        vec![OptionSelector::value("c"), OptionSelector::label("B")],
    );
    assert_eq!(
        handle.result().await,
        Ok(SelectOptionsOutcome::Selected(vec!["b".to_string()]))
    );
    let dom = page.dom.read();
    assert!(!dom.is_selected(options[0]));
    assert!(dom.is_selected(options[1]));
    assert!(!dom.is_selected(options[2]));
    assert_eq!(dom.event_types_for(select), vec!["input", "change"]);
}

#[tokio::test]
async fn multi_select_takes_every_match() {
    let mut dom = Dom::new();
    let (select, options) = select_with_options(&mut dom, true);
    let page = page(dom);

    let mut handle = page.primitives.select_options(
        select,
        vec![OptionSelector::Node(options[2]), OptionSelector::index(0)],
    );
    assert_eq!(
        handle.result().await,
        Ok(SelectOptionsOutcome::Selected(vec!["a".to_string(), "c".to_string()]))
    );
}

#[tokio::test]
async fn select_options_waits_while_disabled() {
    let mut dom = Dom::new();
    let (select, _) = select_with_options(&mut dom, false);
    dom.set_attribute(select, "disabled", "").unwrap();
    let doc = dom.document();
    let div = shown(&mut dom, doc, "div", &[]);
    let page = page(dom);

    let mut handle = page.primitives.select_options(select, vec![OptionSelector::value("a")]);
    assert_eq!(handle.take_next_logs().await, vec![DISABLED.to_string()]);
    page.dom.write().remove_attribute(select, "disabled").unwrap();
    refresh(&page).await;
    assert_eq!(
        handle.result().await,
        Ok(SelectOptionsOutcome::Selected(vec!["a".to_string()]))
    );

    let mut handle = page.primitives.select_options(div, vec![]);
    assert_eq!(handle.result().await, Ok(SelectOptionsOutcome::NotSelect));
}

#[tokio::test]
async fn wait_for_node_visible_and_cancel() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let banner = shown(&mut dom, doc, "div", &[]);
    dom.set_visibility(banner, Some(Visibility::Hidden)).unwrap();
    let page = page(dom);

    let mut handle = page.primitives.wait_for_node_visible(banner);
    assert_eq!(handle.take_next_logs().await, vec![NOT_VISIBLE.to_string()]);
    page.dom.write().set_visibility(banner, None).unwrap();
    refresh(&page).await;
    assert_eq!(handle.result().await, Ok(NodeStateOutcome::Done));

    page.dom
        .write()
        .set_visibility(banner, Some(Visibility::Hidden))
        .unwrap();
    let mut handle = page.primitives.wait_for_node_visible(banner);
    let mut result = task::spawn(handle.take_result().unwrap());
    settle_tasks().await;
    handle.cancel();
    page.dom.write().set_visibility(banner, None).unwrap();
    for _ in 0..3 {
        refresh(&page).await;
    }
    settle_tasks().await;
    assert_pending!(result.poll());
    assert!(handle.is_aborted());
}

#[tokio::test(start_paused = true)]
async fn stable_wait_reports_disabled_then_moving() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let button = shown(&mut dom, doc, "button", &[("disabled", "")]);
    let page = page(dom);

    let mut handle = page
        .primitives
        .wait_for_displayed_at_stable_position_and_enabled(button, 1);
    assert_eq!(handle.take_next_logs().await, vec![DISABLED.to_string()]);

    {
        let mut dom = page.dom.write();
        dom.remove_attribute(button, "disabled").unwrap();
        dom.set_rect(button, Some(Rect::new(0.0, 40.0, 100.0, 20.0))).unwrap();
    }
    assert_eq!(handle.take_next_logs().await, vec![MOVING.to_string()]);
    assert_eq!(handle.result().await, Ok(NodeStateOutcome::Done));
}

#[tokio::test(start_paused = true)]
async fn stable_wait_with_several_frames_skips_short_frames() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let link = shown(&mut dom, doc, "a", &[]);
    let page = page(dom);

    let mut handle = page
        .primitives
        .wait_for_displayed_at_stable_position_and_enabled(link, 2);
    let mut result = task::spawn(handle.take_result().unwrap());
    settle_tasks().await; // warm-up

    refresh(&page).await;
    settle_tasks().await; // first sample
    refresh(&page).await;
    settle_tasks().await; // same instant: skipped
    assert_pending!(result.poll());

    tokio::time::advance(Duration::from_millis(16)).await;
    refresh(&page).await;
    settle_tasks().await; // one identical sample
    assert_pending!(result.poll());

    tokio::time::advance(Duration::from_millis(16)).await;
    refresh(&page).await;
    settle_tasks().await;
    assert_eq!(assert_ready!(result.poll()), Ok(NodeStateOutcome::Done));
}

#[tokio::test]
async fn stable_wait_on_detached_node() {
    let mut dom = Dom::new();
    let orphan = dom.create_element("div");
    let page = page(dom);

    let mut handle = page
        .primitives
        .wait_for_displayed_at_stable_position_and_enabled(orphan, 2);
    refresh(&page).await;
    assert_eq!(handle.result().await, Ok(NodeStateOutcome::NotConnected));
}

#[tokio::test]
async fn focus_resets_selection_only_when_focus_moves() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let input = shown(&mut dom, doc, "input", &[]);
    dom.set_value(input, "hello").unwrap();
    let text = dom.append_text(doc, "loose").unwrap();
    let page = page(dom);

    let mut handle = page.primitives.focus_node(input, true);
    assert_eq!(handle.result().await, Ok(FocusOutcome::Done));
    assert_eq!(page.dom.read().selection_range(input), Some((0, 0)));

    page.dom.write().set_selection_range(input, 1, 4).unwrap();
    let mut handle = page.primitives.focus_node(input, true);
    assert_eq!(handle.result().await, Ok(FocusOutcome::Done));
    assert_eq!(page.dom.read().selection_range(input), Some((1, 4)));

    let mut handle = page.primitives.focus_node(text, false);
    assert_eq!(handle.result().await, Ok(FocusOutcome::NotElement));
}

#[tokio::test]
async fn set_input_files_replaces_the_list() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let upload = shown(&mut dom, doc, "input", &[("type", "file")]);
    let text_input = shown(&mut dom, doc, "input", &[]);
    let div = shown(&mut dom, doc, "div", &[]);
    let page = page(dom);

    let payloads = vec![
        FilePayload::new("a.txt", "text/plain", b"alpha"),
        FilePayload::new("b.bin", "application/octet-stream", &[0, 1, 2]),
    ];
    let mut handle = page.primitives.set_input_files(upload, payloads);
    assert_eq!(handle.result().await, Ok(SetInputFilesOutcome::Done));
    {
        let dom = page.dom.read();
        let files = dom.files(upload);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].bytes, b"alpha");
        assert_eq!(files[1].name, "b.bin");
        assert_eq!(dom.event_types_for(upload), vec!["input", "change"]);
    }

    let mut handle = page.primitives.set_input_files(text_input, vec![]);
    assert_eq!(handle.result().await, Ok(SetInputFilesOutcome::NotFileInput));
    let mut handle = page.primitives.set_input_files(div, vec![]);
    assert_eq!(handle.result().await, Ok(SetInputFilesOutcome::NotInput));
}

#[tokio::test]
async fn undecodable_payload_rejects_without_touching_files() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let upload = shown(&mut dom, doc, "input", &[("type", "file")]);
    let page = page(dom);

    let payloads = vec![
        FilePayload::new("ok.txt", "text/plain", b"fine"),
        FilePayload {
            name: "bad.txt".into(),
            mime_type: "text/plain".into(),
            buffer: "%%%".into(),
        },
    ];
    let mut handle = page.primitives.set_input_files(upload, payloads);
    match handle.result().await {
        Err(PollError::Predicate(message)) => {
            assert!(message.starts_with("Invalid file payload \"bad.txt\""), "{message}")
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(page.dom.read().files(upload).is_empty());
    assert!(handle.take_last_logs()[0].starts_with("  Invalid file payload"));
}

#[tokio::test]
async fn dispatch_event_classifies_and_applies_defaults() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let button = shown(&mut dom, doc, "button", &[]);
    let page = page(dom);

    let init = json!({ "cancelable": false, "button": 0 });
    let mut handle =
        page.primitives
            .dispatch_event(button, "click", init.as_object().cloned().unwrap());
    assert_eq!(handle.result().await, Ok(EventKind::Mouse));

    let mut handle = page.primitives.dispatch_event(button, "custom", Map::new());
    assert_eq!(handle.result().await, Ok(EventKind::Generic));

    let dom = page.dom.read();
    let click = &dom.events()[0];
    assert_eq!(click.event_type, "click");
    assert!(click.flag("bubbles"));
    assert!(!click.flag("cancelable"));
    assert!(click.flag("composed"));
    assert_eq!(click.init["button"], json!(0));
}

#[tokio::test]
async fn hit_target_and_probes_through_the_surface() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let button = shown(&mut dom, doc, "button", &[("id", "go")]);
    let label = dom.append_element(button, "span", &[]).unwrap();
    dom.set_rect(label, Some(Rect::new(5.0, 5.0, 20.0, 10.0))).unwrap();
    let page = page(dom);

    let mut handle = page.primitives.check_hit_target_at(label, Point::new(10.0, 10.0));
    assert_eq!(handle.result().await, Ok(HitTargetOutcome::Done));
    let mut handle = page.primitives.check_hit_target_at(label, Point::new(300.0, 300.0));
    assert_eq!(handle.result().await, Ok(HitTargetOutcome::NotHitTarget));

    assert_eq!(
        page.primitives.deep_element_from_point(Point::new(10.0, 10.0)),
        Some(label)
    );
    assert!(page.primitives.is_visible(button));
    assert_eq!(page.primitives.preview_node(button), "<button id=\"go\">\u{2026}</button>");
    assert_eq!(page.primitives.element_border_width(button).left, 0.0);
}

#[tokio::test]
async fn queries_go_through_the_resolver() {
    let mut dom = Dom::new();
    let doc = dom.document();
    let main = shown(&mut dom, doc, "div", &[("id", "main")]);
    let first = shown(&mut dom, main, "span", &[("class", "item")]);
    let second = shown(&mut dom, main, "span", &[("class", "item")]);
    let page = page(dom);

    let selector = ParsedSelector::single("css", "#main .item");
    assert_eq!(page.primitives.query_selector(&selector, doc).unwrap(), Some(first));
    assert_eq!(
        page.primitives.query_selector_all(&selector, doc).unwrap(),
        vec![first, second]
    );

    let missing = ParsedSelector::single("css", "#nothing");
    assert_eq!(page.primitives.query_selector(&missing, doc).unwrap(), None);

    let unknown = ParsedSelector::single("nope", "x");
    match page.primitives.query_selector(&unknown, doc) {
        Err(ActionError::Selector(SelectorError::UnknownEngine(name))) => assert_eq!(name, "nope"),
        other => panic!("unexpected result {other:?}"),
    }
}
