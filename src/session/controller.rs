//! Grading session state machine.
//!
//! Holds everything that belongs to the answer sheet being worked on: the
//! annotation buffer, the marks engine, and the page/scale being shown. All
//! methods are synchronous; the systems in [`super::systems`] run the
//! blocking store calls on the IO pool and feed results back in.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::annotation::{flush_surface, Annotation, AnnotationBuffer};
use crate::constants::{MAX_SCALE, MIN_SCALE};
use crate::marks::{Assignment, MarksEngine, QuestionMark};
use crate::render::{PageRenderer, RenderPageRequest};
use crate::store::{AnswerSheet, GradingStore, StoreError};
use crate::surface::{PageSurface, SurfaceMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Unselected,
    Loaded,
    Dirty,
    Saving,
    /// Transient; the session resets to `Unselected` right after
    Saved,
    Failed,
}

/// Why submit is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocked {
    NoSheet,
    ReadOnly,
    NoAssignedQuestions,
    SaveInFlight,
}

impl SubmitBlocked {
    pub fn reason(&self) -> &'static str {
        match self {
            SubmitBlocked::NoSheet => "No answer sheet selected",
            SubmitBlocked::ReadOnly => "Graded sheets are read-only",
            SubmitBlocked::NoAssignedQuestions => "No questions are assigned to you for this exam",
            SubmitBlocked::SaveInFlight => "A save for this sheet is already in progress",
        }
    }
}

/// Everything fetched when an answer sheet is opened.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub sheet: AnswerSheet,
    pub page_count: u32,
    pub assignment: Assignment,
    pub annotations: Vec<Annotation>,
    /// Saved per-question breakdown (only fetched for the student viewer)
    pub question_marks: Vec<QuestionMark>,
}

/// Snapshot of what a submit writes.
#[derive(Debug, Clone)]
pub struct SavePlan {
    pub sheet_id: String,
    pub total_marks: f32,
    pub question_marks: Vec<QuestionMark>,
    pub annotations: Vec<Annotation>,
}

/// Result of a save task.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub sheet_id: String,
    pub error: Option<String>,
}

/// What a finished save meant for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveResolution {
    /// The open sheet was saved and the session cleared
    Completed { sheet_id: String, total_marks: f32 },
    /// The open sheet failed to save; everything entered is kept
    Failed { sheet_id: String, error: String },
    /// A save for a sheet the grader already left finished
    Background { sheet_id: String, error: Option<String> },
}

/// Fetch what is needed to open a sheet. Blocking.
pub fn fetch_sheet(
    store: &dyn GradingStore,
    renderer: &dyn PageRenderer,
    sheet: AnswerSheet,
    user_id: &str,
    read_only: bool,
) -> Result<SheetData, String> {
    let page_count = renderer
        .page_count(&sheet.file_ref)
        .map_err(|e| format!("Could not open {}: {}", sheet.file_ref, e))?;

    let assignment = if read_only {
        Assignment::default()
    } else {
        store
            .get_assignment(&sheet.exam_id, user_id)
            .map_err(|e| format!("Could not load question assignment: {}", e))?
    };

    let annotations = store
        .list_annotations(&sheet.id)
        .map_err(|e| format!("Could not load annotations: {}", e))?;

    let question_marks = if read_only {
        store
            .list_question_marks(&sheet.id)
            .map_err(|e| format!("Could not load marks: {}", e))?
    } else {
        Vec::new()
    };

    Ok(SheetData {
        sheet,
        page_count,
        assignment,
        annotations,
        question_marks,
    })
}

/// Write a save plan: question rows, status and total first, then the
/// full-replace of the annotation set. Blocking.
pub fn execute_save(store: &dyn GradingStore, plan: &SavePlan) -> Result<(), StoreError> {
    store.save_grading(&plan.sheet_id, plan.total_marks, &plan.question_marks)?;
    store.replace_annotations(&plan.sheet_id, &plan.annotations)
}

#[derive(Resource, Debug)]
pub struct GradingSession {
    phase: SessionPhase,
    sheet: Option<AnswerSheet>,
    page_count: u32,
    current_page: u32,
    scale: f32,
    marks: MarksEngine,
    buffer: AnnotationBuffer,
    saved_marks: Vec<QuestionMark>,
    /// Sheets with a save task still running
    in_flight: HashSet<String>,
    pending_load: Option<String>,
    last_error: Option<String>,
    author_id: String,
    read_only: bool,
}

impl Default for GradingSession {
    fn default() -> Self {
        Self::new("", 1.0, false)
    }
}

impl GradingSession {
    pub fn new(author_id: &str, scale: f32, read_only: bool) -> Self {
        Self {
            phase: SessionPhase::Unselected,
            sheet: None,
            page_count: 0,
            current_page: 1,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            marks: MarksEngine::default(),
            buffer: AnnotationBuffer::default(),
            saved_marks: Vec::new(),
            in_flight: HashSet::new(),
            pending_load: None,
            last_error: None,
            author_id: author_id.to_string(),
            read_only,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn sheet(&self) -> Option<&AnswerSheet> {
        self.sheet.as_ref()
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn marks(&self) -> &MarksEngine {
        &self.marks
    }

    pub fn buffer(&self) -> &AnnotationBuffer {
        &self.buffer
    }

    /// Saved breakdown shown to students.
    pub fn saved_marks(&self) -> &[QuestionMark] {
        &self.saved_marks
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn surface_mode(&self) -> SurfaceMode {
        if self.read_only {
            SurfaceMode::ReadOnly
        } else {
            SurfaceMode::Grading
        }
    }

    pub fn pending_load(&self) -> Option<&str> {
        self.pending_load.as_deref()
    }

    pub fn is_saving(&self, sheet_id: &str) -> bool {
        self.in_flight.contains(sheet_id)
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.phase, SessionPhase::Dirty | SessionPhase::Failed)
    }

    /// Drop everything tied to the open sheet. Running saves keep going.
    fn clear(&mut self) {
        self.phase = SessionPhase::Unselected;
        self.sheet = None;
        self.page_count = 0;
        self.current_page = 1;
        self.marks = MarksEngine::default();
        self.buffer.clear();
        self.saved_marks.clear();
        self.pending_load = None;
        self.last_error = None;
    }

    /// Start opening a sheet. The previous sheet's unsaved work is discarded.
    ///
    /// Returns `false` when the same sheet is already being opened.
    pub fn begin_load(&mut self, sheet_id: &str) -> bool {
        if self.pending_load.as_deref() == Some(sheet_id) {
            return false;
        }
        if self.is_dirty() {
            if let Some(sheet) = &self.sheet {
                warn!("Discarding unsaved grading of {}", sheet.id);
            }
        }
        self.clear();
        self.pending_load = Some(sheet_id.to_string());
        true
    }

    /// Install fetched sheet data and request the first page.
    ///
    /// Data for a sheet other than the one being opened is ignored.
    pub fn load(&mut self, data: SheetData) -> Option<RenderPageRequest> {
        if self.pending_load.as_deref() != Some(data.sheet.id.as_str()) {
            debug!("Ignoring stale load of {}", data.sheet.id);
            return None;
        }
        self.pending_load = None;

        info!(
            "Opened answer sheet {} ({} pages, {} annotations, {} assigned questions)",
            data.sheet.id,
            data.page_count,
            data.annotations.len(),
            data.assignment.question_numbers.len()
        );

        self.page_count = data.page_count;
        self.current_page = 1;
        self.marks = MarksEngine::new(data.assignment);
        self.buffer = AnnotationBuffer::from_records(data.annotations);
        self.saved_marks = data.question_marks;
        self.sheet = Some(data.sheet);
        self.phase = SessionPhase::Loaded;
        self.last_error = None;
        self.render_request()
    }

    pub fn load_failed(&mut self, sheet_id: &str, error: String) {
        if self.pending_load.as_deref() != Some(sheet_id) {
            return;
        }
        error!("{}", error);
        self.pending_load = None;
        self.last_error = Some(error);
    }

    /// Whether marks, comments and annotations may change right now.
    pub fn accepts_edits(&self) -> bool {
        !self.read_only
            && matches!(
                self.phase,
                SessionPhase::Loaded | SessionPhase::Dirty | SessionPhase::Failed
            )
    }

    /// Whether tools may change `surface`: the session takes edits and the
    /// surface is the grading surface of the page being shown.
    pub fn takes_surface_edits(&self, surface: Option<&PageSurface>) -> bool {
        self.accepts_edits()
            && surface.is_some_and(|s| {
                s.mode() == SurfaceMode::Grading && s.page_number() == self.current_page
            })
    }

    /// Record an edit. Ignored outside an editable session.
    pub fn mark_dirty(&mut self) {
        if self.accepts_edits() {
            self.phase = SessionPhase::Dirty;
        }
    }

    /// Clamp and store a mark; `None` when the session takes no edits now.
    pub fn set_question_mark(&mut self, question_number: u32, raw: f32) -> Option<f32> {
        if !self.accepts_edits() {
            return None;
        }
        let stored = self.marks.set_question_mark(question_number, raw);
        self.phase = SessionPhase::Dirty;
        Some(stored)
    }

    pub fn set_comment(&mut self, question_number: u32, comment: &str) -> bool {
        if !self.accepts_edits() {
            return false;
        }
        if self.marks.comment(question_number).unwrap_or("") == comment {
            return false;
        }
        self.marks.set_comment(question_number, comment);
        self.phase = SessionPhase::Dirty;
        true
    }

    /// Flush the live surface into the buffer if it shows the current page.
    pub fn snapshot(&mut self, surface: &PageSurface) {
        if self.sheet.is_none()
            || surface.mode() != SurfaceMode::Grading
            || surface.page_number() != self.current_page
        {
            return;
        }
        flush_surface(surface, &mut self.buffer, &self.author_id);
    }

    pub fn render_request(&self) -> Option<RenderPageRequest> {
        let sheet = self.sheet.as_ref()?;
        Some(RenderPageRequest {
            file_ref: sheet.file_ref.clone(),
            page_number: self.current_page,
            scale: self.scale,
        })
    }

    /// Move to another page, snapshotting the current one first.
    pub fn change_page(
        &mut self,
        page_number: u32,
        surface: Option<&PageSurface>,
    ) -> Option<RenderPageRequest> {
        if self.sheet.is_none() || self.page_count == 0 {
            return None;
        }
        let target = page_number.clamp(1, self.page_count);
        if target == self.current_page {
            return None;
        }
        if let Some(surface) = surface {
            self.snapshot(surface);
        }
        self.current_page = target;
        self.render_request()
    }

    /// Re-render at another scale, snapshotting the current page first.
    pub fn change_scale(
        &mut self,
        scale: f32,
        surface: Option<&PageSurface>,
    ) -> Option<RenderPageRequest> {
        if !scale.is_finite() {
            return None;
        }
        let target = scale.clamp(MIN_SCALE, MAX_SCALE);
        if (target - self.scale).abs() < f32::EPSILON {
            return None;
        }
        if let Some(surface) = surface {
            self.snapshot(surface);
        }
        self.scale = target;
        self.render_request()
    }

    pub fn can_submit(&self) -> Result<(), SubmitBlocked> {
        let Some(sheet) = &self.sheet else {
            return Err(SubmitBlocked::NoSheet);
        };
        if self.read_only {
            return Err(SubmitBlocked::ReadOnly);
        }
        if self.marks.assignment().is_empty() {
            return Err(SubmitBlocked::NoAssignedQuestions);
        }
        if self.phase == SessionPhase::Saving || self.in_flight.contains(&sheet.id) {
            return Err(SubmitBlocked::SaveInFlight);
        }
        Ok(())
    }

    /// Enter `Saving` and return what must be written.
    pub fn begin_save(&mut self, surface: Option<&PageSurface>) -> Result<SavePlan, SubmitBlocked> {
        self.can_submit()?;
        if let Some(surface) = surface {
            self.snapshot(surface);
        }
        let sheet_id = self
            .sheet
            .as_ref()
            .map(|s| s.id.clone())
            .ok_or(SubmitBlocked::NoSheet)?;

        let plan = SavePlan {
            sheet_id: sheet_id.clone(),
            total_marks: self.marks.total_obtained_marks(),
            question_marks: self.marks.question_rows(),
            annotations: self.buffer.to_records(),
        };

        info!(
            "Saving {}: total {}, {} question rows, {} annotations",
            plan.sheet_id,
            plan.total_marks,
            plan.question_marks.len(),
            plan.annotations.len()
        );

        self.phase = SessionPhase::Saving;
        self.last_error = None;
        self.in_flight.insert(sheet_id);
        Ok(plan)
    }

    pub fn finish_save(&mut self, outcome: SaveOutcome) -> SaveResolution {
        self.in_flight.remove(&outcome.sheet_id);

        let is_current = self.phase == SessionPhase::Saving
            && self.sheet.as_ref().map(|s| s.id.as_str()) == Some(outcome.sheet_id.as_str());

        if !is_current {
            match &outcome.error {
                Some(error) => error!("Background save of {} failed: {}", outcome.sheet_id, error),
                None => info!("Background save of {} finished", outcome.sheet_id),
            }
            return SaveResolution::Background {
                sheet_id: outcome.sheet_id,
                error: outcome.error,
            };
        }

        match outcome.error {
            None => {
                let total_marks = self.marks.total_obtained_marks();
                self.phase = SessionPhase::Saved;
                info!("Saved {} with total {}", outcome.sheet_id, total_marks);
                self.clear();
                SaveResolution::Completed {
                    sheet_id: outcome.sheet_id,
                    total_marks,
                }
            }
            Some(error) => {
                error!("Saving {} failed: {}", outcome.sheet_id, error);
                self.phase = SessionPhase::Failed;
                self.last_error = Some(error.clone());
                SaveResolution::Failed {
                    sheet_id: outcome.sheet_id,
                    error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderError, RenderedPage};
    use crate::store::{GradingStatus, MemoryStore};
    use crate::surface::PageViewport;
    use crate::theme;
    use crate::tools::{build_stamp, GradingTool};

    struct FixedPages(u32);

    impl PageRenderer for FixedPages {
        fn page_count(&self, file_ref: &str) -> Result<u32, RenderError> {
            if self.0 == 0 {
                return Err(RenderError::NoPages(file_ref.to_string()));
            }
            Ok(self.0)
        }

        fn render_page(
            &self,
            _file_ref: &str,
            page_number: u32,
            scale: f32,
        ) -> Result<RenderedPage, RenderError> {
            Ok(RenderedPage {
                page_number,
                width_px: 600.0 * scale,
                height_px: 800.0 * scale,
                scale,
                image_path: std::path::PathBuf::new(),
            })
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_sheet(AnswerSheet::new("s1", "exam-1", "stu-1", "doc-1"))
            .with_sheet(AnswerSheet::new("s2", "exam-1", "stu-2", "doc-2"))
            .with_assignment("exam-1", "g1", Assignment::from_pairs(&[(3, 10.0), (4, 10.0)]))
    }

    fn open(session: &mut GradingSession, store: &MemoryStore, sheet_id: &str) {
        let sheet = store.sheet(sheet_id).unwrap();
        assert!(session.begin_load(sheet_id));
        let data = fetch_sheet(store, &FixedPages(3), sheet, "g1", session.is_read_only()).unwrap();
        assert!(session.load(data).is_some());
    }

    fn surface_with_tick(page: u32) -> PageSurface {
        let mut surface = PageSurface::new(
            PageViewport::new(page, 600.0, 800.0, 1.0),
            SurfaceMode::Grading,
        );
        let tick = build_stamp(GradingTool::Tick, Vec2::new(100.0, 200.0), 1.0, theme::EMPHASIS)
            .unwrap();
        surface.add(tick).unwrap();
        surface
    }

    #[test]
    fn test_load_resets_and_requests_first_page() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");

        assert_eq!(session.phase(), SessionPhase::Loaded);
        assert_eq!(session.current_page(), 1);
        assert_eq!(session.page_count(), 3);
        assert_eq!(session.marks().total_obtained_marks(), 0.0);
        let request = session.render_request().unwrap();
        assert_eq!(request.file_ref, "doc-1");
        assert_eq!(request.page_number, 1);
    }

    #[test]
    fn test_save_covers_every_assigned_question() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");

        assert_eq!(session.set_question_mark(3, 7.0), Some(7.0));
        assert_eq!(session.phase(), SessionPhase::Dirty);

        let plan = session.begin_save(None).unwrap();
        assert_eq!(session.phase(), SessionPhase::Saving);
        execute_save(&store, &plan).unwrap();
        let resolution = session.finish_save(SaveOutcome {
            sheet_id: plan.sheet_id.clone(),
            error: None,
        });

        assert_eq!(
            resolution,
            SaveResolution::Completed {
                sheet_id: "s1".to_string(),
                total_marks: 7.0
            }
        );
        assert_eq!(session.phase(), SessionPhase::Unselected);
        assert!(session.sheet().is_none());

        let rows = store.list_question_marks("s1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].question_number, rows[0].obtained_marks), (3, 7.0));
        assert_eq!((rows[1].question_number, rows[1].obtained_marks), (4, 0.0));
        assert_eq!(rows[1].max_marks, Some(10.0));

        let sheet = store.sheet("s1").unwrap();
        assert_eq!(sheet.status, GradingStatus::Completed);
        assert_eq!(sheet.total_marks, Some(7.0));
    }

    #[test]
    fn test_failed_save_keeps_state_and_retry_succeeds() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        session.set_question_mark(3, 9.0);
        let surface = surface_with_tick(1);

        store.fail_next_delete();
        let plan = session.begin_save(Some(&surface)).unwrap();
        let error = execute_save(&store, &plan).unwrap_err().to_string();
        let resolution = session.finish_save(SaveOutcome {
            sheet_id: plan.sheet_id,
            error: Some(error),
        });

        assert!(matches!(resolution, SaveResolution::Failed { .. }));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.last_error().is_some());
        assert_eq!(session.marks().mark(3), Some(9.0));
        assert_eq!(session.buffer().len(), 1);
        assert!(store.list_annotations("s1").unwrap().is_empty());

        let plan = session.begin_save(Some(&surface)).unwrap();
        execute_save(&store, &plan).unwrap();
        session.finish_save(SaveOutcome {
            sheet_id: plan.sheet_id,
            error: None,
        });
        assert_eq!(session.phase(), SessionPhase::Unselected);
        assert_eq!(store.list_annotations("s1").unwrap().len(), 1);
    }

    #[test]
    fn test_failed_grading_write_skips_annotation_replace() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        let surface = surface_with_tick(1);

        store.fail_next_grading_save();
        let plan = session.begin_save(Some(&surface)).unwrap();
        assert!(execute_save(&store, &plan).is_err());

        assert!(store.list_annotations("s1").unwrap().is_empty());
        assert_eq!(store.sheet("s1").unwrap().status, GradingStatus::Pending);
    }

    #[test]
    fn test_submit_blocked_without_assigned_questions() {
        let store = store();
        let mut session = GradingSession::new("unassigned", 1.0, false);
        let sheet = store.sheet("s1").unwrap();
        session.begin_load("s1");
        let data = fetch_sheet(&store, &FixedPages(1), sheet, "unassigned", false).unwrap();
        session.load(data);

        assert_eq!(
            session.can_submit(),
            Err(SubmitBlocked::NoAssignedQuestions)
        );
        assert!(session.begin_save(None).is_err());
        assert_eq!(session.phase(), SessionPhase::Loaded);
    }

    #[test]
    fn test_second_save_while_in_flight_is_refused() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");

        session.begin_save(None).unwrap();
        assert_eq!(session.begin_save(None).unwrap_err(), SubmitBlocked::SaveInFlight);
        // Marks are frozen while saving
        assert_eq!(session.set_question_mark(3, 1.0), None);
    }

    #[test]
    fn test_switching_sheet_mid_save_leaves_save_in_background() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        session.set_question_mark(4, 5.0);
        let plan = session.begin_save(None).unwrap();

        open(&mut session, &store, "s2");
        assert_eq!(session.phase(), SessionPhase::Loaded);

        let resolution = session.finish_save(SaveOutcome {
            sheet_id: plan.sheet_id,
            error: Some("offline".to_string()),
        });
        assert_eq!(
            resolution,
            SaveResolution::Background {
                sheet_id: "s1".to_string(),
                error: Some("offline".to_string())
            }
        );
        // The new sheet is untouched by the old result
        assert_eq!(session.phase(), SessionPhase::Loaded);
        assert_eq!(session.sheet().unwrap().id, "s2");
        assert!(!session.is_saving("s1"));
    }

    #[test]
    fn test_reopening_sheet_while_its_save_runs_blocks_submit() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        session.begin_save(None).unwrap();

        open(&mut session, &store, "s1");
        assert_eq!(session.can_submit(), Err(SubmitBlocked::SaveInFlight));
    }

    #[test]
    fn test_page_change_snapshots_surface() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        let surface = surface_with_tick(1);

        let request = session.change_page(2, Some(&surface)).unwrap();
        assert_eq!(request.page_number, 2);
        assert_eq!(session.buffer().page(1).len(), 1);

        // Clamped to the last page; same page is not re-rendered
        assert_eq!(session.change_page(9, None).unwrap().page_number, 3);
        assert!(session.change_page(3, None).is_none());
    }

    #[test]
    fn test_surface_of_page_left_behind_takes_no_edits() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        let surface = surface_with_tick(1);
        assert!(session.takes_surface_edits(Some(&surface)));

        // Page 2 never finished rendering; page 1's surface must stay inert
        session.change_page(2, Some(&surface)).unwrap();
        assert!(!session.takes_surface_edits(Some(&surface)));
        assert!(!session.takes_surface_edits(None));
        assert!(session.takes_surface_edits(Some(&surface_with_tick(2))));
    }

    #[test]
    fn test_surface_takes_no_edits_while_saving() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        let surface = surface_with_tick(1);

        let plan = session.begin_save(Some(&surface)).unwrap();
        assert!(!session.takes_surface_edits(Some(&surface)));

        session.finish_save(SaveOutcome {
            sheet_id: plan.sheet_id,
            error: Some("offline".to_string()),
        });
        assert!(session.takes_surface_edits(Some(&surface)));
    }

    #[test]
    fn test_read_only_surface_takes_no_edits() {
        let store = store();
        let mut session = GradingSession::new("stu-1", 1.0, true);
        open(&mut session, &store, "s1");
        let surface = PageSurface::new(
            PageViewport::new(1, 600.0, 800.0, 1.0),
            SurfaceMode::ReadOnly,
        );
        assert!(!session.takes_surface_edits(Some(&surface)));
    }

    #[test]
    fn test_snapshot_ignores_surface_of_other_page() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");
        session.snapshot(&surface_with_tick(2));
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn test_scale_change_is_clamped() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        open(&mut session, &store, "s1");

        let request = session.change_scale(10.0, None).unwrap();
        assert_eq!(request.scale, MAX_SCALE);
        assert!(session.change_scale(MAX_SCALE, None).is_none());
        assert!(session.change_scale(f32::NAN, None).is_none());
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let store = store();
        let mut session = GradingSession::new("g1", 1.0, false);
        session.begin_load("s2");
        let sheet = store.sheet("s1").unwrap();
        let data = fetch_sheet(&store, &FixedPages(1), sheet, "g1", false).unwrap();
        assert!(session.load(data).is_none());
        assert!(session.sheet().is_none());
        assert_eq!(session.pending_load(), Some("s2"));
    }

    #[test]
    fn test_read_only_session_loads_breakdown_and_refuses_edits() {
        let store = store();
        store
            .save_grading(
                "s1",
                6.0,
                &[QuestionMark {
                    question_number: 3,
                    obtained_marks: 6.0,
                    max_marks: Some(10.0),
                    comment: None,
                }],
            )
            .unwrap();

        let mut session = GradingSession::new("stu-1", 1.0, true);
        open(&mut session, &store, "s1");

        assert_eq!(session.surface_mode(), SurfaceMode::ReadOnly);
        assert_eq!(session.saved_marks().len(), 1);
        assert_eq!(session.set_question_mark(3, 1.0), None);
        assert_eq!(session.can_submit(), Err(SubmitBlocked::ReadOnly));
    }

    #[test]
    fn test_fetch_fails_for_document_without_pages() {
        let store = store();
        let sheet = store.sheet("s1").unwrap();
        let err = fetch_sheet(&store, &FixedPages(0), sheet, "g1", false).unwrap_err();
        assert!(err.contains("doc-1"));
    }
}
