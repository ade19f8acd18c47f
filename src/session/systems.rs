//! Session systems: request handling, IO tasks and their polling.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use bevy_egui::EguiContexts;
use futures_lite::future;

use crate::config::{AppConfig, Role, StoreConfig, UpdateLastSheetRequest};
use crate::constants::SCALE_STEP;
use crate::render::{
    PageRendererHandle, PageSprite, RasterPageRenderer, RenderComplete, RenderFailed,
    RenderPageRequest,
};
use crate::store::{AnswerSheet, FileStore, GradingStatus, HttpStore, StoreHandle};
use crate::surface::{PageSurface, SurfaceTable};
use crate::tools::{SurfaceEdited, ToolState};

use super::controller::{
    execute_save, fetch_sheet, GradingSession, SaveOutcome, SaveResolution, SheetData,
};
use super::messages::{
    ChangePageRequest, ChangeScaleRequest, RefreshSheetsRequest, SelectSheetRequest,
    SubmitGradingRequest,
};

/// Answer sheets available to the current user.
#[derive(Resource, Default)]
pub struct SheetDirectory {
    pub sheets: Vec<AnswerSheet>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Latest message for the notification bar.
#[derive(Resource, Default)]
pub struct SessionNotice {
    pub message: Option<String>,
    pub is_error: bool,
}

impl SessionNotice {
    pub fn info(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.is_error = false;
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.is_error = true;
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.is_error = false;
    }
}

pub struct ListSheetsResult {
    pub sheets: Result<Vec<AnswerSheet>, String>,
}

pub struct LoadSheetResult {
    pub sheet_id: String,
    pub data: Result<SheetData, String>,
}

#[derive(Component)]
pub struct ListSheetsTask(pub Task<ListSheetsResult>);

#[derive(Component)]
pub struct LoadSheetTask(pub Task<LoadSheetResult>);

#[derive(Component)]
pub struct SaveSheetTask(pub Task<SaveOutcome>);

/// Students only see their own sheets, and only once graded.
pub fn visible_sheets(
    sheets: Vec<AnswerSheet>,
    role: Role,
    user_id: &str,
) -> Vec<AnswerSheet> {
    match role {
        Role::Grader => sheets,
        Role::Student => sheets
            .into_iter()
            .filter(|s| s.student_id == user_id && s.status == GradingStatus::Completed)
            .collect(),
    }
}

/// Build the store, renderer and session from the loaded config.
pub fn setup_backends(
    mut commands: Commands,
    config: Res<AppConfig>,
    mut table: ResMut<SurfaceTable>,
    mut refresh: MessageWriter<RefreshSheetsRequest>,
) {
    let data = &config.data;

    let store = match &data.store {
        StoreConfig::File { root } => {
            info!("Using file store at {:?}", root);
            StoreHandle::new(FileStore::new(root.clone()))
        }
        StoreConfig::Http { base_url } => {
            info!("Using HTTP store at {}", base_url);
            StoreHandle::new(HttpStore::new(base_url))
        }
    };
    commands.insert_resource(store);
    commands.insert_resource(PageRendererHandle::new(RasterPageRenderer::new(
        data.pages_dir.clone(),
    )));

    if data.user_id().is_empty() {
        warn!("No user id configured for role {:?}", data.role);
    }

    let session = GradingSession::new(
        data.user_id(),
        data.start_scale(),
        data.role == Role::Student,
    );
    table.set_mode(session.surface_mode());
    commands.insert_resource(session);

    refresh.write(RefreshSheetsRequest);
}

pub fn refresh_sheets_system(
    mut commands: Commands,
    mut events: MessageReader<RefreshSheetsRequest>,
    store: Option<Res<StoreHandle>>,
    config: Res<AppConfig>,
    mut directory: ResMut<SheetDirectory>,
) {
    if events.read().count() == 0 {
        return;
    }
    if directory.loading {
        return;
    }
    let Some(store) = store else {
        return;
    };

    let store = store.0.clone();
    let exam_id = config.data.exam_id.clone();
    let role = config.data.role;
    let user_id = config.data.user_id().to_string();

    directory.loading = true;
    let task = IoTaskPool::get().spawn(async move {
        let sheets = store
            .list_answer_sheets(&exam_id)
            .map(|sheets| visible_sheets(sheets, role, &user_id))
            .map_err(|e| format!("Could not list answer sheets: {}", e));
        ListSheetsResult { sheets }
    });
    commands.spawn(ListSheetsTask(task));
}

pub fn poll_list_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ListSheetsTask)>,
    mut directory: ResMut<SheetDirectory>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            directory.loading = false;
            match result.sheets {
                Ok(sheets) => {
                    debug!("Listed {} answer sheets", sheets.len());
                    directory.sheets = sheets;
                    directory.error = None;
                }
                Err(error) => {
                    error!("{}", error);
                    directory.error = Some(error);
                }
            }
            commands.entity(entity).despawn();
        }
    }
}

/// Despawn the page image so nothing of the previous sheet stays on screen.
fn clear_page(
    commands: &mut Commands,
    table: &mut SurfaceTable,
    tools: &mut ToolState,
    sprites: &Query<Entity, With<PageSprite>>,
) {
    tools.reset();
    table.dispose();
    for entity in sprites.iter() {
        commands.entity(entity).despawn();
    }
}

#[allow(clippy::too_many_arguments)]
pub fn select_sheet_system(
    mut commands: Commands,
    mut events: MessageReader<SelectSheetRequest>,
    mut session: ResMut<GradingSession>,
    mut table: ResMut<SurfaceTable>,
    mut tools: ResMut<ToolState>,
    sprites: Query<Entity, With<PageSprite>>,
    directory: Res<SheetDirectory>,
    store: Option<Res<StoreHandle>>,
    renderer: Option<Res<PageRendererHandle>>,
    config: Res<AppConfig>,
    mut notice: ResMut<SessionNotice>,
    mut last_sheet: MessageWriter<UpdateLastSheetRequest>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    let (Some(store), Some(renderer)) = (store, renderer) else {
        return;
    };
    let Some(sheet) = directory
        .sheets
        .iter()
        .find(|s| s.id == event.sheet_id)
        .cloned()
    else {
        notice.error(format!("Answer sheet {} is not in the list", event.sheet_id));
        return;
    };

    if !session.begin_load(&sheet.id) {
        return;
    }
    clear_page(&mut commands, &mut table, &mut tools, &sprites);
    notice.clear();

    info!("Opening answer sheet {} of student {}", sheet.id, sheet.student_id);
    last_sheet.write(UpdateLastSheetRequest {
        sheet_id: sheet.id.clone(),
    });

    let store = store.0.clone();
    let renderer = renderer.0.clone();
    let user_id = config.data.user_id().to_string();
    let read_only = session.is_read_only();
    let task = IoTaskPool::get().spawn(async move {
        let sheet_id = sheet.id.clone();
        let data = fetch_sheet(store.as_ref(), renderer.as_ref(), sheet, &user_id, read_only);
        LoadSheetResult { sheet_id, data }
    });
    commands.spawn(LoadSheetTask(task));
}

pub fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadSheetTask)>,
    mut session: ResMut<GradingSession>,
    mut notice: ResMut<SessionNotice>,
    mut render: MessageWriter<RenderPageRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            match result.data {
                Ok(data) => {
                    if let Some(request) = session.load(data) {
                        render.write(request);
                    }
                }
                Err(error) => {
                    if session.pending_load() == Some(result.sheet_id.as_str()) {
                        notice.error(error.clone());
                    }
                    session.load_failed(&result.sheet_id, error);
                }
            }
            commands.entity(entity).despawn();
        }
    }
}

/// Recreate the live surface for the page that just finished rendering.
pub fn sync_surface_on_render(
    mut events: MessageReader<RenderComplete>,
    session: Res<GradingSession>,
    mut table: ResMut<SurfaceTable>,
    mut notice: ResMut<SessionNotice>,
) {
    for event in events.read() {
        if session.sheet().is_none() || event.page_number != session.current_page() {
            debug!("Ignoring render of page {} for no open sheet", event.page_number);
            continue;
        }
        let report = table.on_render_complete(event, session.buffer().page(event.page_number));
        if report.skipped > 0 {
            notice.error(format!(
                "{} annotation(s) on page {} could not be restored",
                report.skipped, event.page_number
            ));
        }
    }
}

pub fn report_render_failures(
    mut events: MessageReader<RenderFailed>,
    mut notice: ResMut<SessionNotice>,
) {
    for event in events.read() {
        notice.error(format!(
            "Page {} could not be displayed: {}",
            event.page_number, event.reason
        ));
    }
}

pub fn track_surface_edits(
    mut events: MessageReader<SurfaceEdited>,
    mut session: ResMut<GradingSession>,
) {
    if events.read().count() > 0 {
        session.mark_dirty();
    }
}

pub fn navigation_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    session: Res<GradingSession>,
    mut contexts: EguiContexts,
    mut pages: MessageWriter<ChangePageRequest>,
    mut scales: MessageWriter<ChangeScaleRequest>,
) {
    if session.sheet().is_none() {
        return;
    }
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let page = session.current_page();
    if keyboard.just_pressed(KeyCode::PageDown) {
        pages.write(ChangePageRequest {
            page_number: page.saturating_add(1),
        });
    } else if keyboard.just_pressed(KeyCode::PageUp) && page > 1 {
        pages.write(ChangePageRequest {
            page_number: page - 1,
        });
    }

    if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        scales.write(ChangeScaleRequest {
            scale: session.scale() + SCALE_STEP,
        });
    } else if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        scales.write(ChangeScaleRequest {
            scale: session.scale() - SCALE_STEP,
        });
    }
}

/// Finish any gesture on the live surface so it is part of the next snapshot.
fn settle_gesture(tools: &mut ToolState, table: &mut SurfaceTable, session: &mut GradingSession) {
    if let Some(surface) = table.active_mut()
        && tools.finish_gesture(surface)
    {
        session.mark_dirty();
    }
}

/// Run a page or scale transition. When it asks for a new render, the old
/// surface is snapshotted by the transition and then dropped, so nothing can
/// be drawn until the new page reports its size.
fn leave_page(
    tools: &mut ToolState,
    table: &mut SurfaceTable,
    session: &mut GradingSession,
    transition: impl FnOnce(&mut GradingSession, Option<&PageSurface>) -> Option<RenderPageRequest>,
) -> Option<RenderPageRequest> {
    settle_gesture(tools, table, session);
    let page = session.current_page();
    let request = transition(session, table.surface_for(page))?;
    tools.reset();
    table.dispose();
    Some(request)
}

pub fn change_page_system(
    mut events: MessageReader<ChangePageRequest>,
    mut session: ResMut<GradingSession>,
    mut table: ResMut<SurfaceTable>,
    mut tools: ResMut<ToolState>,
    mut render: MessageWriter<RenderPageRequest>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    let page_number = event.page_number;
    if let Some(request) = leave_page(&mut tools, &mut table, &mut session, |s, surface| {
        s.change_page(page_number, surface)
    }) {
        debug!("Moving to page {}", request.page_number);
        render.write(request);
    }
}

pub fn change_scale_system(
    mut events: MessageReader<ChangeScaleRequest>,
    mut session: ResMut<GradingSession>,
    mut table: ResMut<SurfaceTable>,
    mut tools: ResMut<ToolState>,
    mut render: MessageWriter<RenderPageRequest>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    let scale = event.scale;
    if let Some(request) = leave_page(&mut tools, &mut table, &mut session, |s, surface| {
        s.change_scale(scale, surface)
    }) {
        debug!("Re-rendering at scale {}", request.scale);
        render.write(request);
    }
}

pub fn submit_grading_system(
    mut commands: Commands,
    mut events: MessageReader<SubmitGradingRequest>,
    mut session: ResMut<GradingSession>,
    mut table: ResMut<SurfaceTable>,
    mut tools: ResMut<ToolState>,
    store: Option<Res<StoreHandle>>,
    mut notice: ResMut<SessionNotice>,
) {
    if events.read().count() == 0 {
        return;
    }
    let Some(store) = store else {
        return;
    };

    settle_gesture(&mut tools, &mut table, &mut session);
    let page = session.current_page();
    let plan = match session.begin_save(table.surface_for(page)) {
        Ok(plan) => plan,
        Err(blocked) => {
            warn!("Submit refused: {:?}", blocked);
            notice.error(blocked.reason());
            return;
        }
    };
    notice.info(format!("Saving {}...", plan.sheet_id));

    let store = store.0.clone();
    let task = IoTaskPool::get().spawn(async move {
        let error = execute_save(store.as_ref(), &plan).err().map(|e| e.to_string());
        SaveOutcome {
            sheet_id: plan.sheet_id,
            error,
        }
    });
    commands.spawn(SaveSheetTask(task));
}

#[allow(clippy::too_many_arguments)]
pub fn poll_save_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SaveSheetTask)>,
    mut session: ResMut<GradingSession>,
    mut table: ResMut<SurfaceTable>,
    mut tools: ResMut<ToolState>,
    sprites: Query<Entity, With<PageSprite>>,
    mut notice: ResMut<SessionNotice>,
    mut refresh: MessageWriter<RefreshSheetsRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) {
            match session.finish_save(outcome) {
                SaveResolution::Completed {
                    sheet_id,
                    total_marks,
                } => {
                    clear_page(&mut commands, &mut table, &mut tools, &sprites);
                    notice.info(format!("Saved {} with {} marks", sheet_id, total_marks));
                    refresh.write(RefreshSheetsRequest);
                }
                SaveResolution::Failed { error, .. } => {
                    notice.error(format!(
                        "Save failed: {}. Your marks and annotations are kept; submit again to retry.",
                        error
                    ));
                }
                SaveResolution::Background { sheet_id, error } => {
                    match error {
                        Some(error) => notice.error(format!(
                            "Earlier save of {} failed: {}",
                            sheet_id, error
                        )),
                        None => notice.info(format!("Earlier save of {} finished", sheet_id)),
                    }
                    refresh.write(RefreshSheetsRequest);
                }
            }
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::Assignment;
    use crate::tools::GradingTool;

    fn sheet(id: &str, student: &str, status: GradingStatus) -> AnswerSheet {
        AnswerSheet {
            status,
            ..AnswerSheet::new(id, "exam-1", student, "doc")
        }
    }

    #[test]
    fn test_graders_see_every_sheet() {
        let sheets = vec![
            sheet("a", "stu-1", GradingStatus::Pending),
            sheet("b", "stu-2", GradingStatus::Completed),
        ];
        assert_eq!(visible_sheets(sheets, Role::Grader, "g1").len(), 2);
    }

    #[test]
    fn test_students_see_only_their_completed_sheets() {
        let sheets = vec![
            sheet("a", "stu-1", GradingStatus::Pending),
            sheet("b", "stu-1", GradingStatus::Completed),
            sheet("c", "stu-2", GradingStatus::Completed),
        ];
        let visible = visible_sheets(sheets, Role::Student, "stu-1");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "b");
    }

    fn opened_session() -> GradingSession {
        let mut session = GradingSession::new("g1", 1.0, false);
        assert!(session.begin_load("s1"));
        session.load(SheetData {
            sheet: AnswerSheet::new("s1", "exam-1", "stu-1", "doc-1"),
            page_count: 3,
            assignment: Assignment::from_pairs(&[(1, 10.0)]),
            annotations: Vec::new(),
            question_marks: Vec::new(),
        });
        session
    }

    fn rendered(page_number: u32, scale: f32) -> RenderComplete {
        RenderComplete {
            page_number,
            width_px: 600.0 * scale,
            height_px: 800.0 * scale,
            scale,
        }
    }

    #[test]
    fn test_stamp_after_failed_page_render_is_a_no_op() {
        let mut session = opened_session();
        let mut table = SurfaceTable::default();
        let mut tools = ToolState::default();
        table.on_render_complete(&rendered(1, 1.0), &[]);

        tools.select(GradingTool::Tick, table.active_mut());
        assert!(tools.pointer_down(table.active_mut().unwrap(), Vec2::new(100.0, 200.0)));

        let request = leave_page(&mut tools, &mut table, &mut session, |s, surface| {
            s.change_page(2, surface)
        })
        .unwrap();
        assert_eq!(request.page_number, 2);
        assert_eq!(session.buffer().page(1).len(), 1);

        // The render of page 2 failed: no surface exists to stamp on
        assert!(table.active().is_none());
        assert!(!session.takes_surface_edits(table.active()));

        table.on_render_complete(&rendered(2, 1.0), session.buffer().page(2));
        assert!(session.takes_surface_edits(table.active()));
        assert!(table.active().unwrap().is_empty());
    }

    #[test]
    fn test_scale_change_rebuilds_from_snapshot() {
        let mut session = opened_session();
        let mut table = SurfaceTable::default();
        let mut tools = ToolState::default();
        table.on_render_complete(&rendered(1, 1.0), &[]);
        tools.select(GradingTool::Cross, table.active_mut());
        tools.pointer_down(table.active_mut().unwrap(), Vec2::new(50.0, 60.0));

        let request = leave_page(&mut tools, &mut table, &mut session, |s, surface| {
            s.change_scale(2.0, surface)
        })
        .unwrap();
        assert!(table.active().is_none());

        table.on_render_complete(&rendered(1, request.scale), session.buffer().page(1));
        assert_eq!(table.active().unwrap().len(), 1);
    }

    #[test]
    fn test_transition_without_render_keeps_surface() {
        let mut session = opened_session();
        let mut table = SurfaceTable::default();
        let mut tools = ToolState::default();
        table.on_render_complete(&rendered(1, 1.0), &[]);

        let request = leave_page(&mut tools, &mut table, &mut session, |s, surface| {
            s.change_page(1, surface)
        });
        assert!(request.is_none());
        assert!(table.active().is_some());
    }

    #[test]
    fn test_notice_levels() {
        let mut notice = SessionNotice::default();
        notice.error("boom");
        assert!(notice.is_error);
        notice.info("ok");
        assert!(!notice.is_error);
        assert_eq!(notice.message.as_deref(), Some("ok"));
        notice.clear();
        assert!(notice.message.is_none());
    }
}
