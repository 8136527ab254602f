use super::*;

#[test]
fn pointer_events_fold_into_state() {
    let mut p = PointerState::default();
    assert!(p.is_away());

    assert!(EngineEvent::PointerMove { x: 12.0, y: 7.5 }.apply_to_pointer(&mut p));
    assert_eq!((p.x, p.y, p.pressed), (12.0, 7.5, false));
    assert!(!p.is_away());

    EngineEvent::PointerDown.apply_to_pointer(&mut p);
    assert!(p.pressed);
    EngineEvent::PointerUp.apply_to_pointer(&mut p);
    assert!(!p.pressed);

    EngineEvent::PointerDown.apply_to_pointer(&mut p);
    EngineEvent::PointerLeave.apply_to_pointer(&mut p);
    assert_eq!(p, PointerState::away());
}

#[test]
fn non_finite_moves_are_ignored() {
    let mut p = PointerState::at(3.0, 4.0);
    EngineEvent::PointerMove {
        x: f64::NAN,
        y: 1.0,
    }
    .apply_to_pointer(&mut p);
    assert_eq!((p.x, p.y), (3.0, 4.0));
}

#[test]
fn resize_is_not_a_pointer_event() {
    let mut p = PointerState::default();
    assert!(!EngineEvent::Resize(SurfaceSize::new(1, 1)).apply_to_pointer(&mut p));
    assert_eq!(p, PointerState::away());
}

#[test]
fn posts_are_rejected_after_receiver_drops() {
    let (tx, rx) = event_channel();
    assert!(tx.pointer_move(1.0, 2.0));
    assert!(matches!(
        rx.try_recv(),
        Ok(EngineEvent::PointerMove { x, y }) if x == 1.0 && y == 2.0
    ));
    drop(rx);
    assert!(!tx.pointer_down());
    assert!(!tx.post_blocking(EngineEvent::PointerUp));
}
