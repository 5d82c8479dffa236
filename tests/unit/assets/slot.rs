use super::*;

fn img(w: u32) -> PreparedImage {
    PreparedImage::solid(w, 1, [255, 0, 0, 255]).unwrap()
}

#[test]
fn latest_load_wins() {
    let mut slot = ImageSlot::new();
    let first = slot.begin();
    let second = slot.begin();

    assert_eq!(slot.complete(second, Ok(img(2))), LoadOutcome::Committed);
    assert_eq!(slot.complete(first, Ok(img(1))), LoadOutcome::Stale);
    assert_eq!(slot.image().unwrap().width, 2);
}

#[test]
fn older_completion_before_newer_is_still_stale() {
    let mut slot = ImageSlot::new();
    let first = slot.begin();
    let second = slot.begin();

    assert_eq!(slot.complete(first, Ok(img(1))), LoadOutcome::Stale);
    assert!(matches!(slot.state(), SlotState::Pending));
    assert_eq!(slot.complete(second, Ok(img(2))), LoadOutcome::Committed);
}

#[test]
fn clear_invalidates_in_flight_load() {
    let mut slot = ImageSlot::new();
    let t = slot.begin();
    slot.clear();
    assert_eq!(slot.complete(t, Ok(img(1))), LoadOutcome::Stale);
    assert!(!slot.is_selected());
    assert!(slot.image().is_none());
}

#[test]
fn failure_is_recorded_without_image() {
    let mut slot = ImageSlot::new();
    let t = slot.begin();
    assert_eq!(
        slot.complete(t, Err("bad bytes".to_owned())),
        LoadOutcome::Committed
    );
    assert!(matches!(slot.state(), SlotState::Failed(m) if m == "bad bytes"));
    assert!(slot.image().is_none());
    assert!(slot.is_selected());
}

#[test]
fn double_completion_is_stale() {
    let mut slot = ImageSlot::new();
    let t = slot.begin();
    assert_eq!(slot.complete(t, Ok(img(1))), LoadOutcome::Committed);
    assert_eq!(slot.complete(t, Ok(img(3))), LoadOutcome::Stale);
    assert_eq!(slot.image().unwrap().width, 1);
}

#[test]
fn mark_pending_supersedes_in_flight_load() {
    let mut slot = ImageSlot::new();
    let ticket = slot.begin();
    slot.mark_pending();
    assert!(slot.is_selected());
    assert!(slot.image().is_none());
    let img = PreparedImage::solid(1, 1, [0, 0, 0, 255]).unwrap();
    assert_eq!(slot.complete(ticket, Ok(img)), LoadOutcome::Stale);
    assert!(matches!(slot.state(), SlotState::Pending));
}
