use inpage_dom::{Dom, NodeId, Point, Rect};
use perceiver_structural::{check_hit_target_at, deep_element_from_point, HitTargetOutcome};

struct NestedPage {
    dom: Dom,
    outer_host: NodeId,
    inner_host: NodeId,
    button: NodeId,
    icon: NodeId,
}

/// document > outer host ~ shadow > wrapper > inner host ~ shadow > button > icon
fn nested_page() -> NestedPage {
    let mut dom = Dom::new();
    let doc = dom.document();
    let outer_host = dom.append_element(doc, "x-card", &[]).unwrap();
    dom.set_rect(outer_host, Some(Rect::new(0.0, 0.0, 200.0, 200.0))).unwrap();
    let outer_shadow = dom.attach_shadow(outer_host).unwrap();
    let wrapper = dom.append_element(outer_shadow, "div", &[]).unwrap();
    dom.set_rect(wrapper, Some(Rect::new(0.0, 0.0, 200.0, 100.0))).unwrap();
    let inner_host = dom.append_element(wrapper, "x-action", &[]).unwrap();
    dom.set_rect(inner_host, Some(Rect::new(0.0, 0.0, 100.0, 100.0))).unwrap();
    let inner_shadow = dom.attach_shadow(inner_host).unwrap();
    let button = dom.append_element(inner_shadow, "button", &[]).unwrap();
    dom.set_rect(button, Some(Rect::new(10.0, 10.0, 40.0, 40.0))).unwrap();
    let icon = dom.append_element(button, "span", &[]).unwrap();
    dom.set_rect(icon, Some(Rect::new(10.0, 10.0, 20.0, 20.0))).unwrap();
    NestedPage {
        dom,
        outer_host,
        inner_host,
        button,
        icon,
    }
}

#[test]
fn deep_hit_descends_through_both_shadow_roots() {
    let page = nested_page();
    let dom = &page.dom;
    let point = Point::new(15.0, 15.0);

    assert_eq!(dom.element_from_point(dom.document(), point), Some(page.outer_host));
    assert_eq!(deep_element_from_point(dom, point), Some(page.icon));
    assert_eq!(
        deep_element_from_point(dom, Point::new(45.0, 45.0)),
        Some(page.button)
    );
    assert_eq!(
        deep_element_from_point(dom, Point::new(80.0, 80.0)),
        Some(page.inner_host)
    );
}

#[test]
fn inner_icon_hits_its_button() {
    let page = nested_page();
    let point = Point::new(15.0, 15.0);
    assert_eq!(
        check_hit_target_at(&page.dom, page.icon, point),
        HitTargetOutcome::Done
    );
    assert_eq!(
        check_hit_target_at(&page.dom, page.button, point),
        HitTargetOutcome::Done
    );
    // the shadow hosts sit on the composed ancestor chain of the hit
    assert_eq!(
        check_hit_target_at(&page.dom, page.outer_host, point),
        HitTargetOutcome::Done
    );
}

#[test]
fn overlay_inside_the_inner_shadow_blocks_the_button() {
    let mut page = nested_page();
    let inner_shadow = page.dom.shadow_root(page.inner_host).unwrap();
    let overlay = page
        .dom
        .append_element(inner_shadow, "div", &[("class", "overlay")])
        .unwrap();
    page.dom
        .set_rect(overlay, Some(Rect::new(0.0, 0.0, 100.0, 100.0)))
        .unwrap();

    let point = Point::new(15.0, 15.0);
    assert_eq!(deep_element_from_point(&page.dom, point), Some(overlay));
    assert_eq!(
        check_hit_target_at(&page.dom, page.icon, point),
        HitTargetOutcome::NotHitTarget
    );
    assert_eq!(
        check_hit_target_at(&page.dom, page.inner_host, point),
        HitTargetOutcome::Done
    );
}

#[test]
fn detached_target_is_not_connected() {
    let mut page = nested_page();
    page.dom.remove(page.button).unwrap();
    assert_eq!(
        check_hit_target_at(&page.dom, page.icon, Point::new(15.0, 15.0)),
        HitTargetOutcome::NotConnected
    );
}
