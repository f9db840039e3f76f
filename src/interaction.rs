//! Pointer and keyboard interaction state machine.
//!
//! Two independent axes decide what an event does: the persistent [`Mode`]
//! chosen by the user, and the transient [`InteractionState`] of the current
//! pointer gesture. Every gesture ends in `Idle` on pointer release.

use crate::coords::Point;
use crate::error::EditorError;
use crate::input::{Key, MouseButton, PointerInput, WheelInput};
use crate::keybindings::{KeyAction, KeyBindings};
use crate::model::Mode;
use crate::store::KeypointStore;
use crate::viewport::{Viewport, wheel_zoom_factor};

/// Transient state of the pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Panning with the primary button in navigation mode
    Panning,
    /// Panning with modifier+primary in keypoint mode
    CtrlPanning,
    /// Dragging the keypoint at this index
    Dragging(usize),
}

/// Cursor affordance for the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Grab,
    Grabbing,
    Crosshair,
}

impl Cursor {
    /// CSS `cursor` value.
    pub fn css_name(&self) -> &'static str {
        match self {
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::Crosshair => "crosshair",
        }
    }
}

/// What the host needs to refresh after an event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Response {
    /// The canvas must be redrawn
    pub redraw: bool,
    /// Keypoints or selection changed; lists must be refreshed
    pub keypoints_changed: bool,
    /// The mode flag changed
    pub mode_changed: bool,
    /// New cursor, if it should change
    pub cursor: Option<Cursor>,
    /// Pointer position in original-image pixels, when over the image
    pub pointer_original: Option<Point>,
}

impl Response {
    /// Nothing to do.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only the view changed.
    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    /// Keypoints or selection changed.
    pub fn changed() -> Self {
        Self {
            redraw: true,
            keypoints_changed: true,
            ..Self::default()
        }
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    fn with_pointer(mut self, pointer_original: Option<Point>) -> Self {
        self.pointer_original = pointer_original;
        self
    }
}

/// Resolves raw input into view and keypoint mutations.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    mode: Mode,
    last_pan_point: Point,
    keybindings: KeyBindings,
}

impl InteractionController {
    pub fn new(keybindings: KeyBindings) -> Self {
        Self {
            keybindings,
            ..Self::default()
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.keybindings = keybindings;
    }

    /// Resting cursor for the current mode.
    pub fn mode_cursor(&self) -> Cursor {
        match self.mode {
            Mode::Navigation => Cursor::Grab,
            Mode::Keypoint => Cursor::Crosshair,
        }
    }

    /// Abandon any gesture in progress.
    pub fn finish_gesture(&mut self) {
        if self.state != InteractionState::Idle {
            log::debug!("Finishing {:?} gesture", self.state);
        }
        self.state = InteractionState::Idle;
    }

    /// Switch mode, completing any in-flight gesture first.
    pub fn set_mode(&mut self, mode: Mode) -> Response {
        if mode == self.mode {
            return Response::none();
        }
        self.finish_gesture();
        self.mode = mode;
        log::info!("Switched to {}", mode.name());
        Response {
            mode_changed: true,
            ..Response::none().with_cursor(self.mode_cursor())
        }
    }

    pub fn toggle_mode(&mut self) -> Response {
        self.set_mode(self.mode.toggled())
    }

    /// Pointer pressed on the canvas.
    pub fn pointer_down(
        &mut self,
        input: &PointerInput,
        viewport: &Viewport,
        store: &mut KeypointStore,
    ) -> Result<Response, EditorError> {
        let pos = viewport.screen_to_display(input.client, &input.rect);
        let primary = input.button == MouseButton::Primary;

        if input.modifiers.ctrl && primary && self.mode == Mode::Keypoint {
            self.state = InteractionState::CtrlPanning;
            self.last_pan_point = input.client;
            log::debug!("Ctrl-pan started");
            return Ok(Response::none().with_cursor(Cursor::Grabbing));
        }

        if let Some(index) = store.hit_test(pos, viewport.hit_threshold()) {
            store.select(index)?;
            self.state = InteractionState::Dragging(index);
            log::debug!("Dragging keypoint at index {}", index);
            return Ok(Response::changed().with_cursor(Cursor::Grabbing));
        }

        if !primary {
            return Ok(Response::none());
        }

        // A click that misses every keypoint deselects
        let mut response = Response::none();
        if store.selected().is_some() {
            store.clear_selection();
            response = Response::changed();
        }

        match self.mode {
            Mode::Keypoint => {
                if store.contains(pos) {
                    store.add(pos)?;
                    response = Response::changed();
                }
            }
            Mode::Navigation => {
                self.state = InteractionState::Panning;
                self.last_pan_point = input.client;
                response = response.with_cursor(Cursor::Grabbing);
            }
        }
        Ok(response)
    }

    /// Pointer moved over the canvas.
    pub fn pointer_move(
        &mut self,
        input: &PointerInput,
        viewport: &mut Viewport,
        store: &mut KeypointStore,
    ) -> Result<Response, EditorError> {
        let pos = viewport.screen_to_display(input.client, &input.rect);
        let pointer_original = store
            .contains(pos)
            .then(|| store.mapper().to_original(pos));

        let response = match self.state {
            InteractionState::Dragging(index) => {
                if store.move_to(index, pos)? {
                    Response::changed()
                } else {
                    Response::none()
                }
            }
            InteractionState::Panning | InteractionState::CtrlPanning => {
                // Pan is in canvas pixels, so the raw client delta applies unscaled
                let dx = input.client.x - self.last_pan_point.x;
                let dy = input.client.y - self.last_pan_point.y;
                viewport.pan_by(dx, dy);
                self.last_pan_point = input.client;
                Response::redraw()
            }
            InteractionState::Idle => {
                let cursor = if store.hit_test(pos, viewport.hit_threshold()).is_some() {
                    Some(Cursor::Grab)
                } else {
                    match self.mode {
                        Mode::Keypoint if store.contains(pos) => Some(Cursor::Crosshair),
                        Mode::Keypoint => None,
                        Mode::Navigation => Some(Cursor::Grab),
                    }
                };
                Response {
                    cursor,
                    ..Response::none()
                }
            }
        };

        Ok(response.with_pointer(pointer_original))
    }

    /// Pointer released; always ends the gesture.
    pub fn pointer_up(&mut self) -> Response {
        self.finish_gesture();
        Response::none().with_cursor(self.mode_cursor())
    }

    /// Secondary click: delete the keypoint under the pointer, if any.
    pub fn context_menu(
        &mut self,
        input: &PointerInput,
        viewport: &Viewport,
        store: &mut KeypointStore,
    ) -> Result<Response, EditorError> {
        let pos = viewport.screen_to_display(input.client, &input.rect);
        let Some(index) = store.hit_test(pos, viewport.hit_threshold()) else {
            return Ok(Response::none());
        };

        store.remove(index)?;
        self.keypoint_removed(index);
        Ok(Response::changed())
    }

    /// Keep the drag index pointing at the same keypoint after a removal.
    pub fn keypoint_removed(&mut self, index: usize) {
        if let InteractionState::Dragging(dragged) = self.state {
            self.state = if dragged == index {
                InteractionState::Idle
            } else if dragged > index {
                InteractionState::Dragging(dragged - 1)
            } else {
                self.state
            };
        }
    }

    /// Wheel notch: zoom anchored at the pointer.
    pub fn wheel(&mut self, input: &WheelInput, viewport: &mut Viewport) -> Response {
        let anchor = viewport.client_to_canvas(input.client, &input.rect);
        if viewport.zoom_at(anchor, wheel_zoom_factor(input.delta_y)) {
            Response::redraw()
        } else {
            Response::none()
        }
    }

    /// Key pressed.
    pub fn key_down(&mut self, key: &Key, viewport: &mut Viewport) -> Response {
        if *key == Key::Control {
            return self.modifier_cursor(Cursor::Grab);
        }

        match self.keybindings.action_for_key(key) {
            Some(KeyAction::ZoomIn) => Self::redraw_if(viewport.zoom_in()),
            Some(KeyAction::ZoomOut) => Self::redraw_if(viewport.zoom_out()),
            Some(KeyAction::ResetView) => {
                viewport.reset();
                Response::redraw()
            }
            Some(KeyAction::ExitKeypointMode) if self.mode == Mode::Keypoint => {
                self.set_mode(Mode::Navigation)
            }
            _ => Response::none(),
        }
    }

    /// Key released.
    pub fn key_up(&mut self, key: &Key) -> Response {
        if *key == Key::Control {
            self.modifier_cursor(Cursor::Crosshair)
        } else {
            Response::none()
        }
    }

    fn modifier_cursor(&self, cursor: Cursor) -> Response {
        if self.mode == Mode::Keypoint && self.state == InteractionState::Idle {
            Response::none().with_cursor(cursor)
        } else {
            Response::none()
        }
    }

    fn redraw_if(changed: bool) -> Response {
        if changed {
            Response::redraw()
        } else {
            Response::none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{CoordinateMapper, DisplaySize, ImageSize};
    use crate::input::{ClientRect, Modifiers};
    use approx::assert_abs_diff_eq;

    struct Fixture {
        controller: InteractionController,
        viewport: Viewport,
        store: KeypointStore,
    }

    impl Fixture {
        fn new(mode: Mode) -> Self {
            let display = DisplaySize::new(400.0, 300.0);
            let mut viewport = Viewport::new(display);
            viewport.resize(display);
            let mut controller = InteractionController::default();
            controller.set_mode(mode);
            Self {
                controller,
                viewport,
                store: KeypointStore::new(CoordinateMapper::new(
                    ImageSize::new(800, 600),
                    display,
                )),
            }
        }

        fn down(&mut self, x: f64, y: f64, button: MouseButton, modifiers: Modifiers) -> Response {
            let input = pointer(x, y, button).with_modifiers(modifiers);
            self.controller
                .pointer_down(&input, &self.viewport, &mut self.store)
                .unwrap()
        }

        fn click(&mut self, x: f64, y: f64) -> Response {
            let response = self.down(x, y, MouseButton::Primary, Modifiers::default());
            self.controller.pointer_up();
            response
        }

        fn moved(&mut self, x: f64, y: f64) -> Response {
            self.controller
                .pointer_move(
                    &pointer(x, y, MouseButton::Primary),
                    &mut self.viewport,
                    &mut self.store,
                )
                .unwrap()
        }

        fn right_click(&mut self, x: f64, y: f64) -> Response {
            self.controller
                .context_menu(
                    &pointer(x, y, MouseButton::Secondary),
                    &self.viewport,
                    &mut self.store,
                )
                .unwrap()
        }
    }

    // Client rect matches the display, so client == canvas pixels
    fn pointer(x: f64, y: f64, button: MouseButton) -> PointerInput {
        PointerInput::new(
            Point::new(x, y),
            ClientRect::new(0.0, 0.0, 400.0, 300.0),
            button,
        )
    }

    #[test]
    fn test_click_in_keypoint_mode_adds_point() {
        let mut f = Fixture::new(Mode::Keypoint);
        let response = f.click(200.0, 150.0);
        assert!(response.keypoints_changed);

        let kp = f.store.get(0).unwrap();
        assert_eq!(kp.id(), 1);
        assert_eq!(kp.name(), "Point 1");
        assert_abs_diff_eq!(kp.original().x, 400.0);
        assert_abs_diff_eq!(kp.original().y, 300.0);
        assert_eq!(f.controller.state(), InteractionState::Idle);
    }

    #[test]
    fn test_click_outside_image_adds_nothing() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(-5.0, 10.0);
        assert!(f.store.is_empty());
    }

    #[test]
    fn test_primary_in_navigation_pans_by_raw_delta() {
        let mut f = Fixture::new(Mode::Navigation);
        f.viewport.zoom_step(2.0);
        let response = f.down(100.0, 100.0, MouseButton::Primary, Modifiers::default());
        assert_eq!(f.controller.state(), InteractionState::Panning);
        assert_eq!(response.cursor, Some(Cursor::Grabbing));

        f.moved(110.0, 95.0);
        f.moved(120.0, 90.0);
        assert_eq!(f.viewport.pan(), (20.0, -10.0));
        assert!(f.store.is_empty());

        let response = f.controller.pointer_up();
        assert_eq!(f.controller.state(), InteractionState::Idle);
        assert_eq!(response.cursor, Some(Cursor::Grab));
    }

    #[test]
    fn test_ctrl_click_in_keypoint_mode_pans_even_over_point() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(50.0, 50.0);

        f.down(50.0, 50.0, MouseButton::Primary, Modifiers::ctrl());
        assert_eq!(f.controller.state(), InteractionState::CtrlPanning);
        assert_eq!(f.store.selected(), None);

        f.moved(60.0, 70.0);
        assert_eq!(f.viewport.pan(), (10.0, 20.0));
        assert_eq!(f.store.len(), 1);
        assert_eq!(f.store.get(0).unwrap().display(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_ctrl_in_navigation_mode_is_plain_pan() {
        let mut f = Fixture::new(Mode::Navigation);
        f.down(10.0, 10.0, MouseButton::Primary, Modifiers::ctrl());
        assert_eq!(f.controller.state(), InteractionState::Panning);
    }

    #[test]
    fn test_hit_selects_and_drags_in_either_mode() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(100.0, 100.0);
        f.controller.toggle_mode();

        let response = f.down(104.0, 103.0, MouseButton::Primary, Modifiers::default());
        assert!(response.keypoints_changed);
        assert_eq!(f.controller.state(), InteractionState::Dragging(0));
        assert_eq!(f.store.selected(), Some(0));

        f.moved(200.0, 150.0);
        let kp = f.store.get(0).unwrap();
        assert_eq!(kp.display(), Point::new(200.0, 150.0));
        assert_abs_diff_eq!(kp.original().x, 400.0);
        assert_eq!(f.viewport.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_secondary_press_on_point_also_drags() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(100.0, 100.0);
        f.down(100.0, 100.0, MouseButton::Secondary, Modifiers::default());
        assert_eq!(f.controller.state(), InteractionState::Dragging(0));
    }

    #[test]
    fn test_secondary_miss_does_nothing() {
        let mut f = Fixture::new(Mode::Navigation);
        let response = f.down(100.0, 100.0, MouseButton::Secondary, Modifiers::default());
        assert_eq!(response, Response::none());
        assert_eq!(f.controller.state(), InteractionState::Idle);
    }

    #[test]
    fn test_drag_outside_image_is_ignored() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(100.0, 100.0);
        f.down(100.0, 100.0, MouseButton::Primary, Modifiers::default());

        let response = f.moved(450.0, 100.0);
        assert!(!response.keypoints_changed);
        assert_eq!(response.pointer_original, None);
        assert_eq!(f.store.get(0).unwrap().display(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_miss_clears_selection_before_adding() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(100.0, 100.0);
        f.click(100.0, 100.0);
        assert_eq!(f.store.selected(), Some(0));

        f.click(300.0, 200.0);
        assert_eq!(f.store.selected(), None);
        assert_eq!(f.store.len(), 2);
    }

    #[test]
    fn test_clicking_selected_point_toggles_it_off() {
        let mut f = Fixture::new(Mode::Navigation);
        f.store.add(Point::new(100.0, 100.0)).unwrap();
        f.click(100.0, 100.0);
        assert_eq!(f.store.selected(), Some(0));
        f.click(100.0, 100.0);
        assert_eq!(f.store.selected(), None);
    }

    #[test]
    fn test_hit_prefers_topmost_point() {
        let mut f = Fixture::new(Mode::Navigation);
        f.store.add(Point::new(100.0, 100.0)).unwrap();
        f.store.add(Point::new(102.0, 100.0)).unwrap();
        f.down(101.0, 100.0, MouseButton::Primary, Modifiers::default());
        assert_eq!(f.controller.state(), InteractionState::Dragging(1));
    }

    #[test]
    fn test_hit_radius_shrinks_when_zoomed() {
        let mut f = Fixture::new(Mode::Navigation);
        f.store.add(Point::new(100.0, 100.0)).unwrap();
        f.viewport.zoom_step(2.0);

        // canvas 216 -> display 108, 8 px from the point, threshold 5
        f.down(216.0, 200.0, MouseButton::Primary, Modifiers::default());
        assert_eq!(f.controller.state(), InteractionState::Panning);
        f.controller.pointer_up();

        // canvas 208 -> display 104, within threshold
        f.down(208.0, 200.0, MouseButton::Primary, Modifiers::default());
        assert_eq!(f.controller.state(), InteractionState::Dragging(0));
    }

    #[test]
    fn test_right_click_deletes_hit_point() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(100.0, 100.0);
        let response = f.right_click(102.0, 102.0);
        assert!(response.keypoints_changed);
        assert!(f.store.is_empty());

        assert_eq!(f.right_click(10.0, 10.0), Response::none());
    }

    #[test]
    fn test_right_click_during_drag_shifts_drag_index() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.click(50.0, 50.0);
        f.click(150.0, 150.0);
        f.down(150.0, 150.0, MouseButton::Primary, Modifiers::default());
        assert_eq!(f.controller.state(), InteractionState::Dragging(1));

        f.right_click(50.0, 50.0);
        assert_eq!(f.controller.state(), InteractionState::Dragging(0));
        f.moved(160.0, 160.0);
        assert_eq!(f.store.get(0).unwrap().display(), Point::new(160.0, 160.0));

        f.right_click(160.0, 160.0);
        assert_eq!(f.controller.state(), InteractionState::Idle);
    }

    #[test]
    fn test_wheel_zooms_toward_pointer() {
        let mut f = Fixture::new(Mode::Navigation);
        let input = WheelInput {
            client: Point::new(100.0, 50.0),
            rect: ClientRect::new(0.0, 0.0, 400.0, 300.0),
            delta_y: -120.0,
        };
        assert!(f.controller.wheel(&input, &mut f.viewport).redraw);
        assert_abs_diff_eq!(f.viewport.scale(), 1.105_170_918, epsilon = 1e-9);
        let (pan_x, pan_y) = f.viewport.pan();
        assert_abs_diff_eq!(pan_x, -10.517_091_8, epsilon = 1e-6);
        assert_abs_diff_eq!(pan_y, -5.258_545_9, epsilon = 1e-6);
    }

    #[test]
    fn test_keyboard_zoom_and_reset() {
        let mut f = Fixture::new(Mode::Navigation);
        f.controller.key_down(&Key::Char('+'), &mut f.viewport);
        assert_abs_diff_eq!(f.viewport.scale(), 1.2);
        f.controller.key_down(&Key::Char('='), &mut f.viewport);
        assert_abs_diff_eq!(f.viewport.scale(), 1.44, epsilon = 1e-12);
        f.controller.key_down(&Key::Char('-'), &mut f.viewport);
        assert_abs_diff_eq!(f.viewport.scale(), 1.2, epsilon = 1e-12);
        f.viewport.pan_by(5.0, 5.0);
        f.controller.key_down(&Key::Char('0'), &mut f.viewport);
        assert_eq!(f.viewport.scale(), 1.0);
        assert_eq!(f.viewport.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_escape_leaves_keypoint_mode_only() {
        let mut f = Fixture::new(Mode::Keypoint);
        let response = f.controller.key_down(&Key::Escape, &mut f.viewport);
        assert!(response.mode_changed);
        assert_eq!(f.controller.mode(), Mode::Navigation);

        let response = f.controller.key_down(&Key::Escape, &mut f.viewport);
        assert!(!response.mode_changed);
        assert_eq!(f.controller.mode(), Mode::Navigation);
    }

    #[test]
    fn test_mode_toggle_finishes_gesture() {
        let mut f = Fixture::new(Mode::Navigation);
        f.store.add(Point::new(100.0, 100.0)).unwrap();
        f.down(100.0, 100.0, MouseButton::Primary, Modifiers::default());
        assert_eq!(f.controller.state(), InteractionState::Dragging(0));

        let response = f.controller.toggle_mode();
        assert_eq!(response.cursor, Some(Cursor::Crosshair));
        assert_eq!(f.controller.state(), InteractionState::Idle);

        f.moved(200.0, 200.0);
        assert_eq!(f.store.get(0).unwrap().display(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_control_key_cursor_feedback() {
        let mut f = Fixture::new(Mode::Keypoint);
        let down = f.controller.key_down(&Key::Control, &mut f.viewport);
        assert_eq!(down.cursor, Some(Cursor::Grab));
        let up = f.controller.key_up(&Key::Control);
        assert_eq!(up.cursor, Some(Cursor::Crosshair));

        f.controller.toggle_mode();
        assert_eq!(
            f.controller.key_down(&Key::Control, &mut f.viewport).cursor,
            None
        );
    }

    #[test]
    fn test_idle_hover_cursor_and_readout() {
        let mut f = Fixture::new(Mode::Keypoint);
        f.store.add(Point::new(100.0, 100.0)).unwrap();

        let over_point = f.moved(101.0, 101.0);
        assert_eq!(over_point.cursor, Some(Cursor::Grab));

        let on_image = f.moved(200.0, 150.0);
        assert_eq!(on_image.cursor, Some(Cursor::Crosshair));
        let readout = on_image.pointer_original.unwrap();
        assert_abs_diff_eq!(readout.x, 400.0);
        assert_abs_diff_eq!(readout.y, 300.0);

        let off_image = f.moved(-20.0, 150.0);
        assert_eq!(off_image.cursor, None);
        assert_eq!(off_image.pointer_original, None);
    }
}
