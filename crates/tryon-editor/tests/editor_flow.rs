//! Integration tests: end-to-end editor flows (tryon-editor).
//!
//! Drives the `Editor` facade with normalized input events the way a host
//! would, covering tool toggling, mask gating, drag/resize, text editing,
//! and the generation session.

use pretty_assertions::assert_eq;
use tryon_core::error::{TryOnError, TryOnResult};
use tryon_core::model::*;
use tryon_core::raster::RasterHandle;
use tryon_editor::editor::{Editor, EventOutcome, TextReply};
use tryon_editor::generate::{GenerationKind, GenerationParams, GenerationRequest, GenerationResponse};
use tryon_editor::input::{InputEvent, Modifiers};
use tryon_editor::tools::{Modal, ToolMode};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn solid(width: u32, height: u32, value: u8) -> RasterHandle {
    RasterHandle::from_rgba(width, height, vec![value; (width * height * 4) as usize]).unwrap()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    solid(width, height, 128).to_png().unwrap()
}

fn editor_with_image() -> Editor {
    init_logs();
    let mut ed = Editor::default();
    ed.load_base_image(&png(64, 48)).unwrap();
    ed
}

fn drag(ed: &mut Editor, from: (f32, f32), to: (f32, f32)) {
    ed.handle_event(&InputEvent::pointer_down(from.0, from.1));
    ed.handle_event(&InputEvent::pointer_move(to.0, to.1));
    ed.handle_event(&InputEvent::pointer_up(to.0, to.1));
}

fn paint_mask(ed: &mut Editor, strokes: usize) {
    if ed.tool() != ToolMode::Mask {
        ed.select_tool(ToolMode::Mask);
    }
    for i in 0..strokes {
        let y = 10.0 + i as f32 * 10.0;
        drag(ed, (5.0, y), (25.0, y));
    }
}

// ─── Tool toggling ──────────────────────────────────────────────────────

#[test]
fn selecting_a_tool_twice_is_idempotent() {
    init_logs();
    for tool in [
        ToolMode::Draw,
        ToolMode::Arrow,
        ToolMode::Text,
        ToolMode::Image,
        ToolMode::Mask,
        ToolMode::Prompt,
    ] {
        let mut ed = Editor::default();
        ed.select_tool(tool);
        assert_eq!(ed.select_tool(tool), ToolMode::None, "{tool:?}");
        assert!(ed.store().annotations().is_empty());
        assert_eq!(ed.store().history_len(), 1);
        assert!(ed.pending_modal().is_none());
    }
}

// ─── Mask gating ────────────────────────────────────────────────────────

#[test]
fn mask_generation_gate_all_four_combinations() {
    for (strokes, prompt, enabled) in [
        (0, "", false),
        (2, "", false),
        (0, "silk scarf", false),
        (2, "silk scarf", true),
    ] {
        let mut ed = editor_with_image();
        paint_mask(&mut ed, strokes);
        ed.set_mask_prompt(prompt);
        assert_eq!(ed.can_generate_mask(), enabled, "strokes={strokes} prompt={prompt:?}");

        let req = ed
            .begin_generation(GenerationKind::Mask, GenerationParams::default())
            .unwrap();
        assert_eq!(req.is_some(), enabled);
        assert_eq!(ed.is_generating(), enabled);
    }
}

#[test]
fn mask_scenario_prompt_survives_clear() {
    let mut ed = editor_with_image();
    paint_mask(&mut ed, 3);
    assert!(!ed.can_generate_mask());
    ed.set_mask_prompt("linen shirt");
    assert!(ed.can_generate_mask());
    assert!(ed.clear_mask_strokes());
    assert!(!ed.can_generate_mask());
    assert_eq!(ed.mask_prompt(), "linen shirt");
}

// ─── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn draw_undo_redo_scenario() {
    init_logs();
    let mut ed = Editor::default();
    ed.set_color(ToolMode::Draw, "#000000").unwrap();
    ed.select_tool(ToolMode::Draw);
    ed.handle_event(&InputEvent::pointer_down(0.0, 0.0));
    ed.handle_event(&InputEvent::pointer_move(10.0, 10.0));
    ed.handle_event(&InputEvent::pointer_move(20.0, 5.0));
    ed.handle_event(&InputEvent::pointer_up(20.0, 5.0));

    assert_eq!(ed.store().annotations().len(), 1);
    assert_eq!(ed.store().history_len(), 2);
    let before = ed.store().annotations().to_vec();
    match &before[0] {
        Annotation::Draw(d) => {
            assert_eq!(d.path.len(), 3);
            assert_eq!(d.thickness, 3.0);
        }
        other => panic!("expected draw, got {other:?}"),
    }

    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    assert_eq!(ed.handle_event(&InputEvent::key("z", ctrl)), EventOutcome::Redraw);
    assert_eq!(ed.store().annotations().len(), 0);
    ed.redo();
    assert_eq!(ed.store().annotations(), &before[..]);
}

#[test]
fn single_click_draw_is_dropped() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Draw);
    ed.handle_event(&InputEvent::pointer_down(4.0, 4.0));
    ed.handle_event(&InputEvent::pointer_up(4.0, 4.0));
    assert!(ed.store().annotations().is_empty());
    assert_eq!(ed.store().history_len(), 1);
}

#[test]
fn resize_scenario_through_events() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Image);
    ed.handle_event(&InputEvent::pointer_down(100.0, 100.0));
    let id = ed.resolve_image_modal(Some(&png(200, 100))).unwrap().unwrap();

    // Select first; handles are live only on the selected image.
    ed.handle_event(&InputEvent::pointer_down(200.0, 150.0));
    ed.handle_event(&InputEvent::pointer_up(200.0, 150.0));
    assert_eq!(ed.store().selected(), Some(id));

    drag(&mut ed, (300.0, 200.0), (350.0, 200.0));
    let img = ed.store().get(id).and_then(Annotation::as_image).unwrap();
    assert!((img.width - 250.0).abs() < 1e-3);
    assert!((img.height - 125.0).abs() < 1e-3);
    assert_eq!((img.x, img.y), (100.0, 100.0));
    // image add + one resize
    assert_eq!(ed.store().history_len(), 3);
}

#[test]
fn text_wins_over_overlapping_arrow() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Arrow);
    drag(&mut ed, (0.0, 50.0), (200.0, 50.0));
    ed.select_tool(ToolMode::Text);
    ed.handle_event(&InputEvent::pointer_down(40.0, 60.0));
    assert!(ed.resolve_text_modal(Some(TextReply::new("sleeve"))));
    let text_id = ed.store().annotations()[1].id();

    ed.handle_event(&InputEvent::pointer_down(60.0, 50.0));
    assert_eq!(ed.store().selected(), Some(text_id));
}

#[test]
fn double_click_edits_selected_text() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Text);
    ed.handle_event(&InputEvent::pointer_down(20.0, 50.0));
    ed.resolve_text_modal(Some(TextReply::new("collar")));
    let id = ed.store().annotations()[0].id();

    ed.handle_event(&InputEvent::pointer_down(30.0, 40.0));
    ed.handle_event(&InputEvent::pointer_up(30.0, 40.0));
    let outcome = ed.handle_event(&InputEvent::double_click(30.0, 40.0));
    match outcome {
        EventOutcome::Modal(Modal::TextEdit { id: edit_id, text, font_size, .. }) => {
            assert_eq!(edit_id, id);
            assert_eq!(text, "collar");
            assert_eq!(font_size, 24.0);
        }
        other => panic!("expected text edit modal, got {other:?}"),
    }
    assert!(!ed.is_dragging());

    assert!(ed.resolve_text_modal(Some(TextReply {
        text: "cuff".into(),
        color: Some(Color::RED),
        font_size: None,
    })));
    let t = ed.store().get(id).and_then(Annotation::as_text).unwrap();
    assert_eq!(t.text, "cuff");
    assert_eq!(t.color, Color::RED);
    assert_eq!(t.font_size, 24.0);
}

fn click(ed: &mut Editor, x: f32, y: f32) -> EventOutcome {
    let outcome = ed.handle_event(&InputEvent::pointer_down(x, y));
    ed.handle_event(&InputEvent::pointer_up(x, y));
    outcome
}

#[test]
fn text_dialog_survives_full_click() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Text);
    let outcome = click(&mut ed, 40.0, 60.0);
    assert!(matches!(outcome, EventOutcome::Modal(Modal::TextEntry { .. })));
    assert!(matches!(ed.pending_modal(), Some(Modal::TextEntry { .. })));

    assert!(ed.resolve_text_modal(Some(TextReply::new("waist"))));
    assert_eq!(ed.store().annotations().len(), 1);
    assert_eq!(ed.tool(), ToolMode::None);
}

#[test]
fn image_picker_survives_full_click() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Image);
    click(&mut ed, 10.0, 20.0);
    assert!(matches!(ed.pending_modal(), Some(Modal::ImagePicker { .. })));

    let id = ed.resolve_image_modal(Some(&png(40, 20))).unwrap();
    assert!(id.is_some());
    assert_eq!(ed.tool(), ToolMode::None);
}

#[test]
fn double_click_edit_survives_pointer_up() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Text);
    click(&mut ed, 20.0, 50.0);
    ed.resolve_text_modal(Some(TextReply::new("hood")));
    let id = ed.store().annotations()[0].id();

    click(&mut ed, 25.0, 40.0);
    ed.handle_event(&InputEvent::double_click(25.0, 40.0));
    ed.handle_event(&InputEvent::pointer_up(25.0, 40.0));
    assert!(matches!(ed.pending_modal(), Some(Modal::TextEdit { .. })));

    assert!(ed.resolve_text_modal(Some(TextReply::new("hoodie"))));
    let t = ed.store().get(id).and_then(Annotation::as_text).unwrap();
    assert_eq!(t.text, "hoodie");
}

#[test]
fn prompt_dialog_survives_canvas_click() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Prompt);
    click(&mut ed, 5.0, 5.0);
    assert_eq!(ed.pending_modal(), Some(&Modal::Prompt));
}

#[test]
fn undo_during_drag_keeps_redo_branch() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Text);
    click(&mut ed, 10.0, 40.0);
    ed.resolve_text_modal(Some(TextReply::new("a")));
    ed.select_tool(ToolMode::Text);
    click(&mut ed, 10.0, 200.0);
    ed.resolve_text_modal(Some(TextReply::new("b")));
    assert_eq!(ed.store().history_len(), 3);

    ed.handle_event(&InputEvent::pointer_down(12.0, 35.0));
    assert!(ed.is_dragging());
    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    ed.handle_event(&InputEvent::key("z", ctrl));
    assert!(!ed.is_dragging());
    ed.handle_event(&InputEvent::pointer_move(80.0, 80.0));
    ed.handle_event(&InputEvent::pointer_up(80.0, 80.0));

    assert_eq!(ed.store().annotations().len(), 1);
    assert!(ed.store().can_redo());
    assert!(ed.redo());
    assert_eq!(ed.store().annotations().len(), 2);
}

#[test]
fn blank_edit_deletes_text() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Text);
    ed.handle_event(&InputEvent::pointer_down(20.0, 50.0));
    ed.resolve_text_modal(Some(TextReply::new("pocket")));
    ed.handle_event(&InputEvent::pointer_down(25.0, 40.0));
    ed.handle_event(&InputEvent::pointer_up(25.0, 40.0));
    ed.handle_event(&InputEvent::double_click(25.0, 40.0));
    assert!(ed.resolve_text_modal(Some(TextReply::new("  "))));
    assert!(ed.store().annotations().is_empty());
}

#[test]
fn click_on_empty_canvas_deselects() {
    init_logs();
    let mut ed = Editor::default();
    ed.select_tool(ToolMode::Text);
    ed.handle_event(&InputEvent::pointer_down(20.0, 50.0));
    ed.resolve_text_modal(Some(TextReply::new("zip")));
    ed.handle_event(&InputEvent::pointer_down(22.0, 45.0));
    ed.handle_event(&InputEvent::pointer_up(22.0, 45.0));
    assert!(ed.store().selected().is_some());
    assert_eq!(ed.handle_event(&InputEvent::pointer_down(500.0, 500.0)), EventOutcome::Redraw);
    assert_eq!(ed.store().selected(), None);
}

// ─── Generation ─────────────────────────────────────────────────────────

#[test]
fn successful_generation_replaces_image_and_clears_mask() {
    let mut ed = editor_with_image();
    paint_mask(&mut ed, 2);
    ed.set_mask_prompt("  wool coat ");
    let result_png = solid(32, 32, 9).to_data_url().unwrap();

    let mut seen: Option<GenerationRequest> = None;
    let mut backend = |req: &GenerationRequest| -> TryOnResult<GenerationResponse> {
        seen = Some(req.clone());
        Ok(GenerationResponse::ok(result_png.clone()))
    };
    let params = GenerationParams {
        strength: Some(0.8),
        ..GenerationParams::default()
    };
    assert!(ed.generate_with(&mut backend, GenerationKind::Mask, params).unwrap());

    let req = seen.unwrap();
    assert_eq!(req.prompt.as_deref(), Some("wool coat"));
    // Two 20px strokes with the default 30px brush: the pointer-down dab
    // plus two interpolated dabs each.
    assert_eq!(req.mask_data.as_ref().map(Vec::len), Some(6));
    assert_eq!(req.strength, Some(0.8));

    assert!(!ed.is_generating());
    assert!(ed.store().mask_strokes().is_empty());
    let image = ed.base_image().unwrap();
    assert_eq!((image.width(), image.height()), (32, 32));
}

#[test]
fn failed_generation_leaves_state_untouched() {
    let mut ed = editor_with_image();
    paint_mask(&mut ed, 1);
    ed.set_mask_prompt("denim");
    let image_before = ed.base_image().map(RasterHandle::id);
    let mask_before = ed.store().mask_strokes().to_vec();

    let mut failing = |_: &GenerationRequest| -> TryOnResult<GenerationResponse> {
        Ok(GenerationResponse::failed("model overloaded"))
    };
    let err = ed
        .generate_with(&mut failing, GenerationKind::Mask, GenerationParams::default())
        .unwrap_err();
    assert!(matches!(err, TryOnError::Generation(ref m) if m == "model overloaded"));
    assert!(!ed.is_generating());
    assert_eq!(ed.base_image().map(RasterHandle::id), image_before);
    assert_eq!(ed.store().mask_strokes(), &mask_before[..]);

    let mut throwing = |_: &GenerationRequest| -> TryOnResult<GenerationResponse> {
        Err(TryOnError::generation("network down"))
    };
    assert!(ed
        .generate_with(&mut throwing, GenerationKind::Mask, GenerationParams::default())
        .is_err());
    assert!(!ed.is_generating(), "flag clears on thrown errors too");
}

#[test]
fn undecodable_output_is_a_failure() {
    let mut ed = editor_with_image();
    ed.select_tool(ToolMode::Prompt);
    let req = ed
        .resolve_prompt_modal(Some(GenerationParams {
            prompt: Some("evening gown".into()),
            ..GenerationParams::default()
        }))
        .unwrap()
        .unwrap();
    assert_eq!(req.mask_data, None);
    assert!(ed.is_generating());
    let err = ed
        .finish_generation(Ok(GenerationResponse::ok("bm90IGFuIGltYWdl")))
        .unwrap_err();
    assert!(matches!(err, TryOnError::ImageDecode(_)));
    assert!(!ed.is_generating());
}

#[test]
fn one_request_in_flight_and_destructive_actions_blocked() {
    let mut ed = editor_with_image();
    ed.select_tool(ToolMode::Text);
    ed.handle_event(&InputEvent::pointer_down(20.0, 50.0));
    ed.resolve_text_modal(Some(TextReply::new("belt")));
    let prompt = || GenerationParams {
        prompt: Some("leather".into()),
        ..GenerationParams::default()
    };

    assert!(ed.begin_generation(GenerationKind::Prompt, prompt()).unwrap().is_some());
    assert!(matches!(
        ed.begin_generation(GenerationKind::Prompt, prompt()),
        Err(TryOnError::Busy)
    ));

    assert!(!ed.undo());
    assert!(!ed.clear_all());
    assert!(matches!(ed.new_canvas(), Err(TryOnError::Busy)));
    assert!(matches!(ed.load_base_image(&png(2, 2)), Err(TryOnError::Busy)));
    assert_eq!(ed.store().annotations().len(), 1);

    // Drawing stays available.
    ed.select_tool(ToolMode::Draw);
    drag(&mut ed, (0.0, 0.0), (30.0, 30.0));
    assert_eq!(ed.store().annotations().len(), 2);

    ed.finish_generation(Err(TryOnError::generation("timeout"))).unwrap_err();
    assert!(ed.undo());
}

#[test]
fn late_result_after_failure_is_dropped() {
    let mut ed = editor_with_image();
    paint_mask(&mut ed, 1);
    ed.set_mask_prompt("trench coat");
    let image_before = ed.base_image().map(RasterHandle::id);
    let mask_len = ed.store().mask_strokes().len();

    assert!(ed
        .begin_generation(GenerationKind::Mask, GenerationParams::default())
        .unwrap()
        .is_some());
    ed.finish_generation(Err(TryOnError::generation("timeout"))).unwrap_err();

    let late = solid(16, 16, 3).to_data_url().unwrap();
    let err = ed.finish_generation(Ok(GenerationResponse::ok(late))).unwrap_err();
    assert!(matches!(err, TryOnError::NotGenerating));
    assert_eq!(ed.base_image().map(RasterHandle::id), image_before);
    assert_eq!(ed.store().mask_strokes().len(), mask_len);
}

#[test]
fn prompt_generation_gated_and_validated() {
    let mut ed = editor_with_image();
    let blank = GenerationParams {
        prompt: Some("   ".into()),
        ..GenerationParams::default()
    };
    assert_eq!(ed.begin_generation(GenerationKind::Prompt, blank).unwrap(), None);

    let bad = GenerationParams {
        prompt: Some("pleats".into()),
        guidance: Some(42.0),
        ..GenerationParams::default()
    };
    assert!(matches!(
        ed.begin_generation(GenerationKind::Prompt, bad),
        Err(TryOnError::Validation(_))
    ));
    assert!(!ed.is_generating());

    let mut no_image = Editor::default();
    let ok = GenerationParams {
        prompt: Some("pleats".into()),
        ..GenerationParams::default()
    };
    assert!(matches!(
        no_image.begin_generation(GenerationKind::Prompt, ok),
        Err(TryOnError::NoWorkingImage)
    ));
}

#[test]
fn new_canvas_drops_everything() {
    let mut ed = editor_with_image();
    paint_mask(&mut ed, 1);
    ed.new_canvas().unwrap();
    assert!(ed.base_image().is_none());
    assert!(ed.store().mask_strokes().is_empty());
    assert_eq!(ed.store().history_len(), 1);
    assert_eq!(ed.tool(), ToolMode::None);
}
