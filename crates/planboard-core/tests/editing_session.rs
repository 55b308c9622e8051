//! End-to-end editing sessions driven through pointer and keyboard input.

use kurbo::{Point, Size, Vec2};
use planboard_core::{
    AlignDirection, BoardSnapshot, Canvas, CanvasAction, ElementKind, EngineConfig, FocusTarget,
    KeyEvent, KeyOutcome, Modifiers, ShortcutRouter, ToolKind,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Session {
    canvas: Canvas,
    router: ShortcutRouter,
}

impl Session {
    fn new() -> Self {
        init_logging();
        let config = EngineConfig::default();
        let mut router = ShortcutRouter::new(&config.shortcuts);
        router.subscribe();
        Self {
            canvas: Canvas::with_config(config),
            router,
        }
    }

    /// Press and release a key.
    fn tap(&mut self, event: KeyEvent) -> KeyOutcome {
        let outcome = self.router.handle_key_down(&event, &mut self.canvas);
        self.router.handle_key_up(&event.key);
        outcome
    }

    fn key(&mut self, name: &str) -> KeyOutcome {
        self.tap(KeyEvent::named(name))
    }

    fn ctrl(&mut self, name: &str) -> KeyOutcome {
        self.tap(KeyEvent::named(name).with_modifiers(Modifiers::CTRL))
    }

    fn click(&mut self, x: f64, y: f64) -> Vec<CanvasAction> {
        self.canvas.click(Point::new(x, y), Modifiers::NONE)
    }
}

#[test]
fn sticky_notes_grouped_copied_and_nudged() {
    let mut s = Session::new();

    let outcome = s.key("n");
    assert_eq!(outcome.notice.as_ref().map(|n| n.tool_name), Some("Sticky Note"));
    assert_eq!(s.canvas.active_tool(), ToolKind::StickyNote);

    s.click(0.0, 0.0);
    s.click(200.0, 40.0);
    assert_eq!(s.canvas.store().len(), 2);
    assert_eq!(s.canvas.active_tool(), ToolKind::StickyNote);

    s.key("v");
    s.ctrl("a");
    assert_eq!(s.canvas.selection().len(), 2);

    s.ctrl("g");
    let groups: Vec<_> = s
        .canvas
        .store()
        .ordered()
        .map(|e| e.group_id)
        .collect();
    assert!(groups[0].is_some());
    assert_eq!(groups[0], groups[1]);

    s.ctrl("c");
    s.ctrl("v");
    assert_eq!(s.canvas.store().len(), 4);
    let pasted: Vec<_> = s.canvas.selected_elements().into_iter().cloned().collect();
    assert_eq!(pasted.len(), 2);
    assert_eq!(pasted[0].position, Point::new(20.0, 20.0));
    assert!(pasted[0].group_id.is_some());
    assert_ne!(pasted[0].group_id, groups[0]);

    s.tap(KeyEvent::named("ArrowRight").with_modifiers(Modifiers::SHIFT));
    let moved = s.canvas.store().get(pasted[0].id()).unwrap();
    assert_eq!(moved.position, Point::new(30.0, 20.0));

    s.key("Escape");
    assert!(s.canvas.selection().is_empty());
}

#[test]
fn typing_in_a_text_field_does_not_switch_tools() {
    let mut s = Session::new();
    s.key("t");
    assert_eq!(s.canvas.active_tool(), ToolKind::Text);

    let outcome = s.tap(KeyEvent::named("V").with_target(FocusTarget::TextInput));
    assert!(!outcome.prevent_default);
    assert_eq!(s.canvas.active_tool(), ToolKind::Text);

    let actions = s.click(120.0, 80.0);
    assert!(matches!(actions[0], CanvasAction::ElementCreated(_)));
    let text = s.canvas.selected_elements()[0].clone();
    assert_eq!(text.kind(), ElementKind::Text);
    assert_eq!(text.position, Point::new(120.0, 80.0));
}

#[test]
fn align_then_undo_and_redo() {
    let mut s = Session::new();
    let a = s
        .canvas
        .create_element(ElementKind::Shape, Point::new(0.0, 0.0), Size::new(10.0, 10.0), None)
        .unwrap();
    let b = s
        .canvas
        .create_element(ElementKind::Shape, Point::new(50.0, 30.0), Size::new(10.0, 10.0), None)
        .unwrap();

    s.ctrl("a");
    assert!(s.canvas.align_selected(AlignDirection::Left));
    assert_eq!(s.canvas.store().get(b).unwrap().position, Point::new(0.0, 30.0));

    s.ctrl("z");
    assert_eq!(s.canvas.store().get(b).unwrap().position, Point::new(50.0, 30.0));

    s.tap(KeyEvent::named("z").with_modifiers(Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    }));
    assert_eq!(s.canvas.store().get(b).unwrap().position, Point::new(0.0, 30.0));
    assert_eq!(s.canvas.store().get(a).unwrap().position, Point::ZERO);
}

#[test]
fn viewport_shortcuts_and_snapshot() {
    let mut s = Session::new();
    s.canvas.set_viewport_size(Size::new(1000.0, 500.0));
    s.canvas
        .create_element(ElementKind::Timeline, Point::new(100.0, 100.0), Size::new(400.0, 100.0), None)
        .unwrap();

    s.ctrl("=");
    assert!((s.canvas.viewport().zoom() - 110.0).abs() < 1e-9);
    s.ctrl("-");
    s.ctrl("-");
    assert!((s.canvas.viewport().zoom() - 90.0).abs() < 1e-9);

    s.ctrl("0");
    let vp = s.canvas.viewport();
    assert!((vp.zoom() - 200.0).abs() < 1e-9);
    let center = vp.world_to_screen(Point::new(300.0, 150.0));
    assert!((center - Point::new(500.0, 250.0)).hypot() < 1e-9);

    s.canvas.handle_pointer(planboard_core::PointerEvent::Scroll {
        position: Point::ZERO,
        delta: Vec2::new(20.0, 0.0),
        modifiers: Modifiers::NONE,
    });

    let json = s.canvas.snapshot().to_json().unwrap();
    let restored =
        Canvas::from_snapshot(EngineConfig::default(), BoardSnapshot::from_json(&json).unwrap())
            .unwrap();
    assert_eq!(restored.store().len(), 1);
    assert_eq!(restored.viewport().pan, s.canvas.viewport().pan);
}
