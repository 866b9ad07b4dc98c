// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring editing state, messages, and commands.

use std::collections::HashSet;
use std::path::PathBuf;

use uuid::Uuid;

use crate::logic::crop::{EMPTY_SELECTION, render_crop};
use crate::logic::generation::{GenerationRequest, ImageGenerator};
use crate::logic::prompts::EditKind;
use crate::logic::references::{self, AddOutcome, ReferenceList};
use crate::models::artifact::Artifact;
use crate::models::credential::Credential;
use crate::models::crop::DisplayRect;
use crate::models::history::History;
use crate::models::hotspot::{DisplayGeometry, Hotspot};
use crate::ui::components::credential::{self, CredentialModel, CredentialMsg, CredentialOutcome};
use crate::ui::components::crop::{self, CropModel, CropMsg};
use crate::ui::components::previews::{self, PreviewsCommand, PreviewsModel, PreviewsMsg};
use crate::ui::components::references::ReferencesMsg;
use crate::ui::components::tools::{self, Tool, ToolAction, ToolsModel, ToolsMsg};

/// Top-level application state.
#[derive(Default)]
pub struct AppModel {
    /// Undo/redo stack of image versions.
    pub history: History,
    /// Session API key; never persisted.
    pub credential: Option<Credential>,
    /// API key prompt.
    pub credential_modal: CredentialModel,
    /// Tool tabs and text inputs.
    pub tools: ToolsModel,
    /// Native pixel selected for a retouch.
    pub hotspot: Option<Hotspot>,
    /// Crop selection state.
    pub crop: CropModel,
    /// Showing the original instead of the current version.
    pub comparing: bool,
    /// Stored reference faces.
    pub references: ReferenceList,
    /// Where references are persisted; `None` disables persistence.
    pub reference_store: Option<PathBuf>,
    /// A store write is running; further writes wait for it.
    pub persist_in_flight: bool,
    /// The list changed while a write was running.
    pub persist_dirty: bool,
    /// Edit waiting for the user to supply a credential.
    pub deferred: Option<EditKind>,
    /// A generation or crop is in flight.
    pub busy: bool,
    /// Texture cache for displayed artifacts.
    pub previews: PreviewsModel,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

/// Application messages routed through the update function.
pub enum Msg {
    RequestOpenImage,
    ImagePicked(Option<PathBuf>),
    ImageLoaded(Result<Artifact, String>),
    StartOver,
    DownloadRequested(PathBuf),
    DownloadCancelled,
    DownloadCompleted(Result<PathBuf, String>),
    Undo,
    Redo,
    Reset,
    SetComparing(bool),
    ImageClicked {
        point: [f32; 2],
        geometry: DisplayGeometry,
    },
    ApplyCrop {
        geometry: DisplayGeometry,
        pixel_ratio: f32,
    },
    /// `source` is the id of the version the crop was taken from.
    CropCompleted {
        source: Uuid,
        result: Result<Artifact, String>,
    },
    /// `source` is the id of the version the edit was generated from.
    GenerationCompleted {
        source: Uuid,
        label: &'static str,
        result: Result<Artifact, String>,
    },
    ReferencesPicked(Vec<PathBuf>),
    ReferenceLoaded(Result<Artifact, String>),
    ReferencesLoaded(Result<ReferenceList, String>),
    ReferencesPersisted(Result<(), String>),
    DismissError,
    Tools(ToolsMsg),
    Crop(CropMsg),
    Credential(CredentialMsg),
    References(ReferencesMsg),
    Previews(PreviewsMsg),
}

/// Commands represent side-effects executed between frames.
pub enum Command {
    PickImage,
    LoadImage(PathBuf),
    SaveArtifact {
        artifact: Artifact,
        path: PathBuf,
    },
    Generate {
        credential: Credential,
        request: GenerationRequest,
    },
    RenderCrop {
        source: Artifact,
        selection: DisplayRect,
        geometry: DisplayGeometry,
        pixel_ratio: f32,
    },
    DecodePreview(Artifact),
    PickReferences,
    LoadReference(PathBuf),
    LoadReferenceStore(PathBuf),
    PersistReferences {
        path: PathBuf,
        references: ReferenceList,
    },
}

impl AppModel {
    /// Fresh model with an optional pre-supplied credential and reference store.
    ///
    /// Without a credential the API key modal opens immediately.
    pub fn new(
        credential: Option<Credential>,
        reference_store: Option<PathBuf>,
        cmds: &mut Vec<Command>,
    ) -> Self {
        let mut model = AppModel {
            credential,
            reference_store,
            ..Default::default()
        };
        if model.credential.is_none() {
            model.credential_modal.open();
        }
        if let Some(path) = &model.reference_store {
            cmds.push(Command::LoadReferenceStore(path.clone()));
        }
        model
    }

    /// The artifact currently on screen, honouring the comparison toggle.
    pub fn displayed(&self) -> Option<&Artifact> {
        if self.comparing {
            self.history.original()
        } else {
            self.history.current()
        }
    }

    /// Artifacts whose textures must stay alive.
    pub fn live_artifacts(&self) -> HashSet<Uuid> {
        self.history
            .current()
            .into_iter()
            .chain(self.history.original())
            .chain(self.references.items().iter().map(|r| &r.artifact))
            .map(Artifact::id)
            .collect()
    }
}

/// Update the application model and enqueue commands.
///
/// This is the only place state changes. It:
/// - gates generations, crops and history navigation on `busy`, so at most one
///   edit is in flight;
/// - parks an edit in `deferred` and opens the key modal when no credential is set;
/// - appends successful results to the history, dropping results computed for
///   a version that has since been replaced;
/// - keeps reference store writes sequential;
/// - releases preview textures no longer reachable from the history or the
///   reference list.
///
/// Side effects are never run here; they are pushed to `cmds` for the shell to
/// hand to its workers.
///
/// # Examples
///
/// ```ignore
/// let mut cmds = Vec::new();
/// let mut model = AppModel::new(None, None, &mut cmds);
/// update(&mut model, Msg::ImageLoaded(Ok(artifact)), &mut cmds);
/// update(&mut model, Msg::Tools(ToolsMsg::Filter("noir".into())), &mut cmds);
/// // No key yet: nothing is dispatched and the modal asks for one.
/// assert!(cmds.is_empty());
/// assert!(model.deferred.is_some());
/// ```
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::RequestOpenImage => {
            if !model.busy {
                cmds.push(Command::PickImage);
            }
        }
        Msg::ImagePicked(Some(path)) => cmds.push(Command::LoadImage(path)),
        Msg::ImagePicked(None) => surface_event(model, "Open cancelled.".into(), false),
        Msg::ImageLoaded(Ok(artifact)) => {
            let name = artifact.name().to_string();
            model.history.replace_with(artifact);
            clear_edit_state(model);
            surface_event(model, format!("Loaded {name}"), false);
        }
        Msg::ImageLoaded(Err(err)) => {
            surface_event(model, format!("Failed to open image:\n\n{err}"), true)
        }
        Msg::StartOver => {
            if !model.busy {
                model.history.clear();
                clear_edit_state(model);
                surface_event(model, "Ready for a new image.".into(), false);
            }
        }
        Msg::DownloadRequested(path) => match model.history.current() {
            Some(artifact) => cmds.push(Command::SaveArtifact {
                artifact: artifact.clone(),
                path,
            }),
            None => surface_event(model, "There is no image to download.".into(), true),
        },
        Msg::DownloadCancelled => surface_event(model, "Download cancelled.".into(), false),
        Msg::DownloadCompleted(Ok(path)) => {
            surface_event(model, format!("Image saved: {}", path.display()), false)
        }
        Msg::DownloadCompleted(Err(err)) => {
            surface_event(model, format!("Failed to save image:\n\n{err}"), true)
        }
        Msg::Undo => navigate(model, History::undo),
        Msg::Redo => navigate(model, History::redo),
        Msg::Reset => navigate(model, History::reset),
        Msg::SetComparing(on) => model.comparing = on && model.history.len() > 1,
        Msg::ImageClicked { point, geometry } => {
            if !model.busy && model.tools.tool() == Tool::Retouch && model.history.current().is_some()
            {
                if let Some(hotspot) = geometry.to_native(point) {
                    model.hotspot = Some(hotspot);
                }
            }
        }
        Msg::ApplyCrop {
            geometry,
            pixel_ratio,
        } => request_crop(model, geometry, pixel_ratio, cmds),
        Msg::CropCompleted { source, result } => {
            model.busy = false;
            if is_stale(model, source) {
                return finish(model);
            }
            match result {
                Ok(artifact) => {
                    model.history.append(artifact);
                    model.crop.clear();
                    model.hotspot = None;
                    surface_event(model, "Crop applied.".into(), false);
                }
                Err(err) => surface_event(model, format!("Failed to crop image:\n\n{err}"), true),
            }
        }
        Msg::GenerationCompleted {
            source,
            label,
            result,
        } => {
            model.busy = false;
            if is_stale(model, source) {
                return finish(model);
            }
            match result {
                Ok(artifact) => {
                    model.history.append(artifact);
                    model.hotspot = None;
                    model.crop.clear();
                    surface_event(model, format!("{} applied.", capitalize(label)), false);
                }
                Err(err) => surface_event(
                    model,
                    format!("Failed to generate the {label}.\n\n{err}"),
                    true,
                ),
            }
        }
        Msg::ReferencesPicked(paths) => {
            for path in paths {
                cmds.push(Command::LoadReference(path));
            }
        }
        Msg::ReferenceLoaded(Ok(artifact)) => {
            let now = time::OffsetDateTime::now_utc();
            match model.references.add(artifact, now) {
                AddOutcome::Added { evicted } => {
                    let message = match evicted {
                        Some(old) => format!(
                            "Reference face added; removed oldest ({}).",
                            old.artifact.name()
                        ),
                        None => "Reference face added.".to_string(),
                    };
                    surface_event(model, message, false);
                    persist_references(model, cmds);
                }
                AddOutcome::Duplicate => {
                    surface_event(model, "That face is already stored.".into(), false)
                }
            }
        }
        Msg::ReferenceLoaded(Err(err)) => {
            surface_event(model, format!("Failed to add reference face:\n\n{err}"), true)
        }
        Msg::ReferencesLoaded(Ok(list)) => {
            let added_meanwhile = !model.references.is_empty();
            let dropped = model.references.merge(list);
            if dropped > 0 {
                log::info!("dropped {dropped} stored reference(s) over the limit");
            }
            if added_meanwhile {
                persist_references(model, cmds);
            }
        }
        Msg::ReferencesLoaded(Err(err)) => {
            surface_event(model, format!("Failed to load reference faces:\n\n{err}"), true)
        }
        Msg::ReferencesPersisted(result) => {
            model.persist_in_flight = false;
            if let Err(err) = result {
                surface_event(model, format!("Failed to save reference faces:\n\n{err}"), true);
            }
            if std::mem::take(&mut model.persist_dirty) {
                persist_references(model, cmds);
            }
        }
        Msg::DismissError => model.error = None,
        Msg::Tools(m) => {
            if let Some(action) = tools::update(&mut model.tools, m) {
                handle_tool_action(model, action, cmds);
            }
        }
        Msg::Crop(m) => {
            if !model.busy {
                crop::update(&mut model.crop, m);
            }
        }
        Msg::Credential(m) => match credential::update(&mut model.credential_modal, m) {
            Some(CredentialOutcome::Submitted(key)) => {
                model.credential = Some(key);
                surface_event(model, "API key saved for this session.".into(), false);
                if let Some(kind) = model.deferred.take() {
                    request_generation(model, kind, cmds);
                }
            }
            Some(CredentialOutcome::Forgotten) => {
                model.credential = None;
                model.deferred = None;
                surface_event(model, "API key cleared for this session.".into(), false);
            }
            Some(CredentialOutcome::Dismissed) => {
                if model.deferred.take().is_some() {
                    surface_event(model, "Edit cancelled: no API key.".into(), false);
                }
            }
            None => {}
        },
        Msg::References(m) => match m {
            ReferencesMsg::RequestAdd => cmds.push(Command::PickReferences),
            ReferencesMsg::Remove(index) => {
                if model.references.remove(index).is_some() {
                    surface_event(model, "Reference face removed.".into(), false);
                    persist_references(model, cmds);
                }
            }
            ReferencesMsg::Toggle(index) => {
                if model.references.toggle(index).is_some() {
                    persist_references(model, cmds);
                }
            }
            ReferencesMsg::LoadPreview(artifact) => {
                forward_previews(model, PreviewsMsg::Request(artifact), cmds)
            }
        },
        Msg::Previews(m) => forward_previews(model, m, cmds),
    }

    finish(model);
}

/// Bookkeeping run after every message.
fn finish(model: &mut AppModel) {
    let live = model.live_artifacts();
    previews::retain(&mut model.previews, &live);
}

/// Whether a finished edit was started from a version that is no longer current.
fn is_stale(model: &mut AppModel, source: Uuid) -> bool {
    if model.history.current().map(Artifact::id) == Some(source) {
        return false;
    }
    log::info!("discarding result computed for a replaced image");
    surface_event(
        model,
        "The image changed while the edit was running; its result was discarded.".into(),
        false,
    );
    true
}

/// Execute a command (on a worker thread) and return a resulting message.
///
/// Blocking work lives here: native file dialogs, disk I/O, image decoding,
/// crop rendering and the HTTP call made through `generator`. Every failure is
/// turned into the `Err` side of the returned message so `update` can surface
/// it once.
///
/// # Examples
///
/// ```ignore
/// // Worker loop as spawned by the shell.
/// for cmd in cmd_rx.iter() {
///     let msg = run_command(cmd, generator.as_ref());
///     let _ = msg_tx.send(msg);
/// }
/// ```
pub fn run_command(cmd: Command, generator: &dyn ImageGenerator) -> Msg {
    match cmd {
        Command::PickImage => {
            let file = rfd::FileDialog::new()
                .set_title("Open image")
                .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tif", "tiff"])
                .pick_file();
            Msg::ImagePicked(file)
        }
        Command::LoadImage(path) => {
            Msg::ImageLoaded(Artifact::from_path(&path).map_err(|e| format!("{e:#}")))
        }
        Command::SaveArtifact { artifact, path } => {
            let res = std::fs::write(&path, artifact.bytes())
                .map(|_| path.clone())
                .map_err(|e| format!("{}: {e}", path.display()));
            Msg::DownloadCompleted(res)
        }
        Command::Generate {
            credential,
            request,
        } => {
            let label = request.kind.label();
            let source = request.source.id();
            let result = generator
                .generate(&credential, &request)
                .map_err(|e| e.to_string());
            if let Err(err) = &result {
                log::warn!("{label} failed: {err}");
            }
            Msg::GenerationCompleted {
                source,
                label,
                result,
            }
        }
        Command::RenderCrop {
            source,
            selection,
            geometry,
            pixel_ratio,
        } => Msg::CropCompleted {
            source: source.id(),
            result: render_crop(&source, Some(selection), &geometry, pixel_ratio)
                .map_err(|e| format!("{e:#}")),
        },
        Command::DecodePreview(artifact) => match previews::decode_preview(&artifact) {
            Ok((natural, image)) => Msg::Previews(PreviewsMsg::Decoded {
                id: artifact.id(),
                natural,
                image,
            }),
            Err(error) => Msg::Previews(PreviewsMsg::Failed {
                id: artifact.id(),
                error,
            }),
        },
        Command::PickReferences => {
            let files = rfd::FileDialog::new()
                .set_title("Add reference faces")
                .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
                .pick_files()
                .unwrap_or_default();
            Msg::ReferencesPicked(files)
        }
        Command::LoadReference(path) => {
            Msg::ReferenceLoaded(Artifact::from_path(&path).map_err(|e| format!("{e:#}")))
        }
        Command::LoadReferenceStore(path) => {
            Msg::ReferencesLoaded(references::load(&path).map_err(|e| format!("{e:#}")))
        }
        Command::PersistReferences { path, references } => Msg::ReferencesPersisted(
            references::save(&path, &references).map_err(|e| format!("{e:#}")),
        ),
    }
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        log::warn!("{message}");
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}

/// Forget per-image editing state after the image changes wholesale.
fn clear_edit_state(model: &mut AppModel) {
    model.hotspot = None;
    model.crop.clear();
    model.comparing = false;
}

fn navigate(model: &mut AppModel, step: fn(&mut History) -> bool) {
    if model.busy {
        return;
    }
    if step(&mut model.history) {
        model.hotspot = None;
        model.crop.clear();
        model.comparing = false;
    }
}

fn handle_tool_action(model: &mut AppModel, action: ToolAction, cmds: &mut Vec<Command>) {
    match action {
        ToolAction::Switched { from } => {
            if from == Tool::Crop {
                model.crop.clear();
            }
            if from == Tool::Retouch {
                model.hotspot = None;
            }
        }
        ToolAction::Retouch { instruction } => {
            if instruction.is_empty() {
                surface_event(model, "Please enter a description for your edit.".into(), true);
                return;
            }
            let Some(hotspot) = model.hotspot else {
                surface_event(
                    model,
                    "Please click on the image to select an area to edit.".into(),
                    true,
                );
                return;
            };
            request_generation(
                model,
                EditKind::Retouch {
                    instruction,
                    hotspot,
                },
                cmds,
            );
        }
        ToolAction::Filter { instruction } => {
            if !instruction.is_empty() {
                request_generation(model, EditKind::Filter { instruction }, cmds);
            }
        }
        ToolAction::Adjust { instruction } => {
            if !instruction.is_empty() {
                request_generation(model, EditKind::Adjust { instruction }, cmds);
            }
        }
    }
}

/// Dispatch a generation, or park it behind the credential modal.
fn request_generation(model: &mut AppModel, kind: EditKind, cmds: &mut Vec<Command>) {
    if model.busy {
        return;
    }
    let Some(source) = model.history.current().cloned() else {
        surface_event(model, "No image loaded to edit.".into(), true);
        return;
    };
    let Some(credential) = model.credential.clone() else {
        model.deferred = Some(kind);
        model.credential_modal.open();
        surface_event(model, "An API key is required for AI edits.".into(), false);
        return;
    };

    model.busy = true;
    model.comparing = false;
    surface_event(model, format!("Generating {}…", kind.label()), false);
    cmds.push(Command::Generate {
        credential,
        request: GenerationRequest {
            source,
            kind,
            references: model.references.in_use(),
        },
    });
}

fn request_crop(
    model: &mut AppModel,
    geometry: DisplayGeometry,
    pixel_ratio: f32,
    cmds: &mut Vec<Command>,
) {
    if model.busy {
        return;
    }
    let Some(source) = model.history.current().cloned() else {
        return;
    };
    let Some(selection) = model.crop.selection() else {
        surface_event(model, EMPTY_SELECTION.into(), true);
        return;
    };
    model.busy = true;
    cmds.push(Command::RenderCrop {
        source,
        selection,
        geometry,
        pixel_ratio,
    });
}

/// Write the reference list, one write at a time.
///
/// While a write runs the list is only marked dirty; the completion message
/// then sends the latest list, so the file always ends up matching memory.
fn persist_references(model: &mut AppModel, cmds: &mut Vec<Command>) {
    let Some(path) = &model.reference_store else {
        return;
    };
    if model.persist_in_flight {
        model.persist_dirty = true;
        return;
    }
    model.persist_in_flight = true;
    cmds.push(Command::PersistReferences {
        path: path.clone(),
        references: model.references.clone(),
    });
}

fn forward_previews(model: &mut AppModel, msg: PreviewsMsg, cmds: &mut Vec<Command>) {
    let mut preview_cmds = Vec::new();
    if let Some(err) = previews::update(&mut model.previews, msg, &mut preview_cmds) {
        surface_event(model, err, true);
    }
    for c in preview_cmds {
        match c {
            PreviewsCommand::Decode(artifact) => cmds.push(Command::DecodePreview(artifact)),
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
