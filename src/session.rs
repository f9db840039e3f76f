//! The editor session: one image, its keypoints, and the view onto it.
//!
//! A session owns everything the event handlers touch. Host glue (the
//! browser entry point, or tests) holds one session and feeds it events;
//! nothing is kept in globals.
//!
//! Image loading is two-phase. [`EditorSession::begin_image_load`] hands out a
//! [`LoadTicket`]; the decode result is applied with
//! [`EditorSession::finish_image_load`] only if no newer load was started in
//! between.

use chrono::{DateTime, Utc};

use crate::config::LaunchParams;
use crate::coords::{CoordinateMapper, DisplaySize, ImageSize};
use crate::error::EditorError;
use crate::format::{ExportTarget, LabelCodec, LabelDocument};
use crate::input::{Key, PointerInput, WheelInput};
use crate::interaction::{Cursor, InteractionController, InteractionState, Response};
use crate::keybindings::KeyBindings;
use crate::model::{Keypoint, Mode};
use crate::remote::{SaveRequest, save_endpoint};
use crate::render::{DrawTarget, Renderer};
use crate::store::KeypointStore;
use crate::viewport::Viewport;

/// Handle for one requested image load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    filename: Option<String>,
}

impl LoadTicket {
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

/// Result of applying a decode completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The image replaced the previous one
    Applied,
    /// A newer load was requested; this completion was dropped
    Stale,
}

/// Recorded vs. current image dimensions, shown before a mismatched import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub recorded: ImageSize,
    pub current: ImageSize,
}

impl DimensionMismatch {
    /// Confirmation prompt for the user.
    pub fn prompt(&self) -> String {
        format!(
            "Label file image dimensions ({}×{}) don't match current image ({}×{}). Load labels anyway?",
            self.recorded.width, self.recorded.height, self.current.width, self.current.height
        )
    }
}

/// Result of a label import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// This many keypoints replaced the store contents
    Loaded(usize),
    /// The user declined a dimension mismatch; nothing changed
    Declined,
}

#[derive(Debug, Clone)]
struct Workspace {
    filename: Option<String>,
    viewport: Viewport,
    store: KeypointStore,
}

impl Workspace {
    fn image(&self) -> ImageSize {
        self.store.mapper().image()
    }
}

/// Single-user editing session.
#[derive(Debug, Clone)]
pub struct EditorSession {
    workspace: Option<Workspace>,
    controller: InteractionController,
    container: (f64, f64),
    load_generation: u64,
    launch: LaunchParams,
}

impl EditorSession {
    /// Create a session with no image, sized to a container of `width` x `height`.
    pub fn new(keybindings: KeyBindings, container_width: f64, container_height: f64) -> Self {
        Self {
            workspace: None,
            controller: InteractionController::new(keybindings),
            container: (container_width, container_height),
            load_generation: 0,
            launch: LaunchParams::default(),
        }
    }

    pub fn with_launch_params(mut self, launch: LaunchParams) -> Self {
        self.launch = launch;
        self
    }

    pub fn launch_params(&self) -> &LaunchParams {
        &self.launch
    }

    pub fn has_image(&self) -> bool {
        self.workspace.is_some()
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.workspace.as_ref().map(Workspace::image)
    }

    pub fn filename(&self) -> Option<&str> {
        self.workspace.as_ref()?.filename.as_deref()
    }

    pub fn keypoints(&self) -> Option<&KeypointStore> {
        self.workspace.as_ref().map(|ws| &ws.store)
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.workspace.as_ref().map(|ws| &ws.viewport)
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn keybindings(&self) -> &KeyBindings {
        self.controller.keybindings()
    }

    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.controller.set_keybindings(keybindings);
    }

    /// Resting cursor for the current mode.
    pub fn cursor(&self) -> Cursor {
        self.controller.mode_cursor()
    }

    /// Zoom percentage for status display (100 with no image).
    pub fn zoom_percent(&self) -> u32 {
        self.viewport().map_or(100, Viewport::zoom_percent)
    }

    // ---- Image lifecycle ----

    /// Start loading an image. Any earlier pending load becomes stale.
    pub fn begin_image_load(&mut self, filename: Option<String>) -> LoadTicket {
        self.load_generation += 1;
        log::info!(
            "Loading image {} (load #{})",
            filename.as_deref().unwrap_or("<unnamed>"),
            self.load_generation
        );
        LoadTicket {
            generation: self.load_generation,
            filename,
        }
    }

    /// Apply a decode result.
    ///
    /// On success the image, view and keypoints are all replaced at once and
    /// the pointer gesture is reset; the mode is kept. On failure the
    /// previous image and keypoints stay untouched.
    pub fn finish_image_load(
        &mut self,
        ticket: LoadTicket,
        decoded: Result<ImageSize, String>,
    ) -> Result<LoadStatus, EditorError> {
        if ticket.generation != self.load_generation {
            log::warn!(
                "Dropping stale image load #{} (current #{})",
                ticket.generation,
                self.load_generation
            );
            return Ok(LoadStatus::Stale);
        }

        let filename = ticket.filename.unwrap_or_default();
        let image = decoded.map_err(|reason| EditorError::decode(filename.clone(), reason))?;
        if image.width == 0 || image.height == 0 {
            return Err(EditorError::decode(filename, "image has no pixels"));
        }

        let display = DisplaySize::fit(image, self.container.0, self.container.1);
        let mut viewport = Viewport::new(display);
        viewport.resize(display);

        self.workspace = Some(Workspace {
            filename: (!filename.is_empty()).then_some(filename),
            viewport,
            store: KeypointStore::new(CoordinateMapper::new(image, display)),
        });
        self.controller.finish_gesture();

        log::info!(
            "Image loaded: {}x{} shown at {:.0}x{:.0}",
            image.width,
            image.height,
            display.width,
            display.height
        );
        Ok(LoadStatus::Applied)
    }

    /// The image container changed size. Keypoints are reprojected; the
    /// view's zoom and pan are kept.
    pub fn resize_container(&mut self, width: f64, height: f64) -> Response {
        self.container = (width, height);
        let Some(ws) = self.workspace.as_mut() else {
            return Response::none();
        };

        let display = DisplaySize::fit(ws.image(), width, height);
        ws.viewport.resize(display);
        ws.store.reproject_all(display);
        log::debug!(
            "Container resized to {:.0}x{:.0}, display {:.0}x{:.0}",
            width,
            height,
            display.width,
            display.height
        );
        Response::changed()
    }

    // ---- Input events ----

    pub fn pointer_down(&mut self, input: &PointerInput) -> Result<Response, EditorError> {
        match self.workspace.as_mut() {
            Some(ws) => self
                .controller
                .pointer_down(input, &ws.viewport, &mut ws.store),
            None => Ok(Response::none()),
        }
    }

    pub fn pointer_move(&mut self, input: &PointerInput) -> Result<Response, EditorError> {
        match self.workspace.as_mut() {
            Some(ws) => self
                .controller
                .pointer_move(input, &mut ws.viewport, &mut ws.store),
            None => Ok(Response::none()),
        }
    }

    pub fn pointer_up(&mut self) -> Response {
        self.controller.pointer_up()
    }

    pub fn context_menu(&mut self, input: &PointerInput) -> Result<Response, EditorError> {
        match self.workspace.as_mut() {
            Some(ws) => self
                .controller
                .context_menu(input, &ws.viewport, &mut ws.store),
            None => Ok(Response::none()),
        }
    }

    pub fn wheel(&mut self, input: &WheelInput) -> Response {
        match self.workspace.as_mut() {
            Some(ws) => self.controller.wheel(input, &mut ws.viewport),
            None => Response::none(),
        }
    }

    pub fn key_down(&mut self, key: &Key) -> Response {
        match self.workspace.as_mut() {
            Some(ws) => self.controller.key_down(key, &mut ws.viewport),
            None => Response::none(),
        }
    }

    pub fn key_up(&mut self, key: &Key) -> Response {
        if self.workspace.is_none() {
            return Response::none();
        }
        self.controller.key_up(key)
    }

    // ---- Toolbar and list actions ----

    pub fn toggle_mode(&mut self) -> Response {
        self.controller.toggle_mode()
    }

    pub fn zoom_in(&mut self) -> Response {
        self.with_viewport(Viewport::zoom_in)
    }

    pub fn zoom_out(&mut self) -> Response {
        self.with_viewport(Viewport::zoom_out)
    }

    pub fn reset_view(&mut self) -> Response {
        self.with_viewport(|viewport| {
            viewport.reset();
            true
        })
    }

    fn with_viewport(&mut self, action: impl FnOnce(&mut Viewport) -> bool) -> Response {
        let Some(ws) = self.workspace.as_mut() else {
            return Response::none();
        };
        if action(&mut ws.viewport) {
            Response::redraw()
        } else {
            Response::none()
        }
    }

    fn store_mut(&mut self) -> Result<&mut KeypointStore, EditorError> {
        self.workspace
            .as_mut()
            .map(|ws| &mut ws.store)
            .ok_or(EditorError::NoImage)
    }

    /// Toggle selection of a keypoint from the list.
    pub fn select(&mut self, index: usize) -> Result<Option<usize>, EditorError> {
        self.store_mut()?.select(index)
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), EditorError> {
        self.store_mut()?.rename(index, name)
    }

    /// Delete a keypoint from the list.
    pub fn remove(&mut self, index: usize) -> Result<Keypoint, EditorError> {
        let removed = self.store_mut()?.remove(index)?;
        self.controller.keypoint_removed(index);
        Ok(removed)
    }

    /// Delete every keypoint and restart ids at 1.
    pub fn clear_all(&mut self) -> Result<(), EditorError> {
        self.store_mut()?.clear();
        self.controller.finish_gesture();
        log::info!("Cleared all keypoints");
        Ok(())
    }

    // ---- Labels ----

    /// Replace the keypoints with those from a label document.
    ///
    /// If the document records different image dimensions, `confirm` decides
    /// whether to go ahead. Invalid documents and declined imports leave the
    /// store untouched.
    pub fn import_labels(
        &mut self,
        text: &str,
        confirm: impl FnOnce(&DimensionMismatch) -> bool,
    ) -> Result<ImportOutcome, EditorError> {
        let ws = self.workspace.as_mut().ok_or(EditorError::NoImage)?;
        let parsed = LabelCodec::decode(text)?;

        if let Some(recorded) = parsed.image {
            let mismatch = DimensionMismatch {
                recorded,
                current: ws.image(),
            };
            if recorded != mismatch.current && !confirm(&mismatch) {
                log::info!("Label import declined after dimension mismatch");
                return Ok(ImportOutcome::Declined);
            }
        }

        let count = parsed.keypoints.len();
        ws.store.bulk_load(parsed.keypoints)?;
        self.controller.finish_gesture();
        Ok(ImportOutcome::Loaded(count))
    }

    /// Build a label document for the current keypoints.
    ///
    /// A download of an empty store is refused; the remote payload may be empty.
    pub fn export_document(
        &self,
        created_at: DateTime<Utc>,
        target: ExportTarget,
    ) -> Result<LabelDocument, EditorError> {
        let ws = self.workspace.as_ref().ok_or(EditorError::NoImage)?;
        if target == ExportTarget::Download && ws.store.is_empty() {
            return Err(EditorError::NothingToExport);
        }
        Ok(LabelCodec::document(
            &ws.store,
            ws.filename.as_deref(),
            created_at,
            target,
        ))
    }

    /// Pretty-printed download document.
    pub fn export_json(&self, created_at: DateTime<Utc>) -> Result<String, EditorError> {
        let document = self.export_document(created_at, ExportTarget::Download)?;
        Ok(LabelCodec::encode(&document)?)
    }

    /// Suggested download filename.
    pub fn export_filename(&self, now: DateTime<Utc>) -> String {
        LabelCodec::export_filename(self.filename(), now)
    }

    /// Remote save endpoint, if the session was launched with an image URL.
    pub fn save_endpoint(&self) -> Option<String> {
        self.launch.image_url.as_deref().and_then(save_endpoint)
    }

    /// Body for the remote save call.
    pub fn save_request(&self, created_at: DateTime<Utc>) -> Result<SaveRequest, EditorError> {
        Ok(SaveRequest {
            labels: self.export_document(created_at, ExportTarget::RemoteSave)?,
            image_path: self.launch.image_path.clone(),
        })
    }

    // ---- Rendering ----

    /// Redraw onto `target`. Draws nothing before an image is loaded.
    pub fn render(&self, target: &mut impl DrawTarget) {
        if let Some(ws) = &self.workspace {
            Renderer::draw(target, &ws.viewport, &ws.store);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Point;
    use crate::format::FormatError;
    use crate::input::{ClientRect, Modifiers, MouseButton};
    use approx::assert_abs_diff_eq;

    /// Session over an 800x600 image in a 440x340 container (display 400x300).
    fn loaded(mode: Mode) -> EditorSession {
        let mut session = EditorSession::new(KeyBindings::default(), 440.0, 340.0);
        let ticket = session.begin_image_load(Some("cat.jpg".to_string()));
        let status = session
            .finish_image_load(ticket, Ok(ImageSize::new(800, 600)))
            .unwrap();
        assert_eq!(status, LoadStatus::Applied);
        if session.mode() != mode {
            session.toggle_mode();
        }
        session
    }

    fn rect() -> ClientRect {
        ClientRect::new(0.0, 0.0, 400.0, 300.0)
    }

    fn click(session: &mut EditorSession, x: f64, y: f64) {
        let input = PointerInput::new(Point::new(x, y), rect(), MouseButton::Primary);
        session.pointer_down(&input).unwrap();
        session.pointer_up();
    }

    fn at(iso: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(iso).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_load_fits_display() {
        let session = loaded(Mode::Navigation);
        let viewport = session.viewport().unwrap();
        assert_eq!(viewport.display(), DisplaySize::new(400.0, 300.0));
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(session.filename(), Some("cat.jpg"));
        assert_eq!(session.zoom_percent(), 100);
    }

    #[test]
    fn test_events_without_image_are_ignored() {
        let mut session = EditorSession::new(KeyBindings::default(), 440.0, 340.0);
        let input = PointerInput::new(Point::new(10.0, 10.0), rect(), MouseButton::Primary);
        assert_eq!(session.pointer_down(&input).unwrap(), Response::none());
        assert_eq!(session.key_down(&Key::Char('+')), Response::none());
        assert_eq!(session.zoom_in(), Response::none());
        assert!(matches!(session.select(0), Err(EditorError::NoImage)));
    }

    #[test]
    fn test_click_creates_keypoint_in_original_space() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 200.0, 150.0);

        let kp = session.keypoints().unwrap().get(0).unwrap();
        assert_eq!(kp.id(), 1);
        assert_eq!(kp.name(), "Point 1");
        assert_abs_diff_eq!(kp.original().x, 400.0);
        assert_abs_diff_eq!(kp.original().y, 300.0);
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 100.0, 100.0);

        let first = session.begin_image_load(Some("a.png".to_string()));
        let second = session.begin_image_load(Some("b.png".to_string()));

        let status = session
            .finish_image_load(second, Ok(ImageSize::new(1000, 500)))
            .unwrap();
        assert_eq!(status, LoadStatus::Applied);

        let status = session
            .finish_image_load(first, Ok(ImageSize::new(10, 10)))
            .unwrap();
        assert_eq!(status, LoadStatus::Stale);
        assert_eq!(session.image_size(), Some(ImageSize::new(1000, 500)));
        assert_eq!(session.filename(), Some("b.png"));
        assert!(session.keypoints().unwrap().is_empty());
        assert_eq!(session.mode(), Mode::Keypoint);
    }

    #[test]
    fn test_failed_load_keeps_previous_image() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 100.0, 100.0);

        let ticket = session.begin_image_load(Some("broken.png".to_string()));
        let result = session.finish_image_load(ticket, Err("corrupt header".to_string()));
        assert!(matches!(result, Err(EditorError::Decode { .. })));
        assert_eq!(session.image_size(), Some(ImageSize::new(800, 600)));
        assert_eq!(session.keypoints().unwrap().len(), 1);
    }

    #[test]
    fn test_new_image_resets_view_and_gesture() {
        let mut session = loaded(Mode::Navigation);
        session.zoom_in();
        let input = PointerInput::new(Point::new(50.0, 50.0), rect(), MouseButton::Primary);
        session.pointer_down(&input).unwrap();
        assert_eq!(session.interaction_state(), InteractionState::Panning);

        let ticket = session.begin_image_load(None);
        session
            .finish_image_load(ticket, Ok(ImageSize::new(640, 480)))
            .unwrap();
        assert_eq!(session.interaction_state(), InteractionState::Idle);
        assert_eq!(session.viewport().unwrap().scale(), 1.0);
        assert_eq!(session.filename(), None);
    }

    #[test]
    fn test_resize_reprojects_and_keeps_view() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 100.0, 75.0);
        session.zoom_in();

        session.resize_container(840.0, 640.0);
        let viewport = session.viewport().unwrap();
        assert_eq!(viewport.display(), DisplaySize::new(800.0, 600.0));
        assert_abs_diff_eq!(viewport.scale(), 1.2);

        let kp = session.keypoints().unwrap().get(0).unwrap();
        assert_abs_diff_eq!(kp.display().x, 200.0);
        assert_abs_diff_eq!(kp.display().y, 150.0);
        assert_abs_diff_eq!(kp.original().x, 200.0);
    }

    #[test]
    fn test_import_sets_next_id() {
        let mut session = loaded(Mode::Keypoint);
        let outcome = session
            .import_labels(
                r#"{"keypoints":[{"id":5,"name":"Nose","x":10,"y":20}]}"#,
                |_| panic!("no dimensions recorded"),
            )
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Loaded(1));

        let store = session.keypoints().unwrap();
        assert_eq!(store.next_id(), 6);
        assert_abs_diff_eq!(store.get(0).unwrap().display().x, 5.0);

        click(&mut session, 300.0, 200.0);
        assert_eq!(session.keypoints().unwrap().get(1).unwrap().id(), 6);
    }

    #[test]
    fn test_import_invalid_leaves_store() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 100.0, 100.0);

        let result = session.import_labels("not json", |_| true);
        assert!(matches!(
            result,
            Err(EditorError::Format(FormatError::Parse(_)))
        ));
        let result = session.import_labels(r#"{"points":[]}"#, |_| true);
        assert!(matches!(
            result,
            Err(EditorError::Format(FormatError::Validation { .. }))
        ));
        assert_eq!(session.keypoints().unwrap().len(), 1);
    }

    #[test]
    fn test_import_with_exhausted_ids_is_rejected() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 100.0, 100.0);

        let result =
            session.import_labels(r#"{"keypoints":[{"id":4294967295,"x":1,"y":1}]}"#, |_| true);
        assert!(matches!(
            result,
            Err(EditorError::Format(FormatError::Validation { .. }))
        ));

        let result = session.import_labels(
            r#"{"keypoints":[{"id":4294967294,"x":1,"y":1},{"x":2,"y":2}]}"#,
            |_| true,
        );
        assert!(matches!(result, Err(EditorError::IdsExhausted)));
        assert_eq!(session.keypoints().unwrap().len(), 1);
    }

    #[test]
    fn test_import_dimension_mismatch_gate() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 100.0, 100.0);
        let text = r#"{"image":{"width":640,"height":480},"keypoints":[{"x":1,"y":1}]}"#;

        let mut prompt = String::new();
        let outcome = session
            .import_labels(text, |mismatch| {
                prompt = mismatch.prompt();
                false
            })
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Declined);
        assert!(prompt.contains("(640×480)"));
        assert!(prompt.contains("(800×600)"));
        assert_eq!(session.keypoints().unwrap().get(0).unwrap().id(), 1);
        assert_eq!(session.keypoints().unwrap().next_id(), 2);

        let outcome = session.import_labels(text, |_| true).unwrap();
        assert_eq!(outcome, ImportOutcome::Loaded(1));
    }

    #[test]
    fn test_import_without_image() {
        let mut session = EditorSession::new(KeyBindings::default(), 440.0, 340.0);
        let result = session.import_labels(r#"{"keypoints":[]}"#, |_| true);
        assert!(matches!(result, Err(EditorError::NoImage)));
    }

    #[test]
    fn test_export_empty_download_refused() {
        let session = loaded(Mode::Keypoint);
        let now = at("2024-03-01T10:00:00Z");
        assert!(matches!(
            session.export_json(now),
            Err(EditorError::NothingToExport)
        ));
        // The remote payload may be empty
        let request = session.save_request(now).unwrap();
        assert!(request.labels.keypoints.is_empty());
    }

    #[test]
    fn test_export_json_and_filename() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 200.0, 150.0);
        let now = at("2024-03-01T10:00:00Z");

        let json = session.export_json(now).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["image"]["filename"], "cat.jpg");
        assert_eq!(value["keypoints"][0]["x"], 400.0);
        assert_eq!(value["metadata"]["created_at"], "2024-03-01T10:00:00.000Z");
        assert_eq!(session.export_filename(now), "cat.json");
    }

    #[test]
    fn test_save_request_echoes_image_path() {
        let launch = LaunchParams::from_pairs([
            ("imageUrl", "http://localhost:5000/img/cat.jpg"),
            ("imagePath", "/srv/images/cat.jpg"),
        ]);
        let mut session = loaded(Mode::Keypoint).with_launch_params(launch);
        click(&mut session, 10.0, 10.0);

        let request = session.save_request(Utc::now()).unwrap();
        assert_eq!(request.image_path.as_deref(), Some("/srv/images/cat.jpg"));
        assert!(
            request
                .labels
                .metadata
                .features
                .contains(&"server_save".to_string())
        );
        assert_eq!(
            session.save_endpoint().as_deref(),
            Some("http://localhost:5000/save_labels")
        );
    }

    #[test]
    fn test_list_remove_keeps_drag_consistent() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 50.0, 50.0);
        click(&mut session, 150.0, 150.0);

        let input = PointerInput::new(Point::new(150.0, 150.0), rect(), MouseButton::Primary);
        session.pointer_down(&input).unwrap();
        session.remove(0).unwrap();
        assert_eq!(session.interaction_state(), InteractionState::Dragging(0));
        assert!(matches!(session.remove(4), Err(EditorError::Index { .. })));
    }

    #[test]
    fn test_clear_all_restarts_ids() {
        let mut session = loaded(Mode::Keypoint);
        click(&mut session, 50.0, 50.0);
        click(&mut session, 60.0, 90.0);
        session.clear_all().unwrap();
        click(&mut session, 70.0, 70.0);
        assert_eq!(session.keypoints().unwrap().get(0).unwrap().id(), 1);
    }

    #[test]
    fn test_ctrl_pan_through_session() {
        let mut session = loaded(Mode::Keypoint);
        let down = PointerInput::new(Point::new(10.0, 10.0), rect(), MouseButton::Primary)
            .with_modifiers(Modifiers::ctrl());
        session.pointer_down(&down).unwrap();
        let drag = PointerInput::new(Point::new(30.0, 25.0), rect(), MouseButton::Primary);
        session.pointer_move(&drag).unwrap();
        session.pointer_up();

        assert_eq!(session.viewport().unwrap().pan(), (20.0, 15.0));
        assert!(session.keypoints().unwrap().is_empty());
    }
}
