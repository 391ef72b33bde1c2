//! Subcommand implementations.
//!
//! Every command loads the session file into a [`Studio`], works on it and
//! writes it back when something changed.

use crate::error::{CliError, Result};
use lyricstudio_core::{
    format_lrc_timestamp, AutoSaver, CoreError, LineId, LinePatch, LyricLine, Orientation,
    PlaybackObserver, ProjectDraft, ProjectStore, SessionFile, Studio, StudioConfig,
};
use lyricstudio_core::lrc::LEGACY_FILE_NAME;
use std::fmt::Write as _;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Loaded config plus the session file the command works on
pub struct Context {
    pub config: StudioConfig,
    pub session_path: PathBuf,
}

impl Context {
    pub const fn new(config: StudioConfig, session_path: PathBuf) -> Self {
        Self {
            config,
            session_path,
        }
    }

    fn load_studio(&self) -> Result<Studio> {
        Ok(SessionFile::load(&self.session_path)?.into_studio(&self.config))
    }

    fn save_studio(&self, studio: &Studio) -> Result<()> {
        SessionFile::from_studio(studio).save(&self.session_path)?;
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn import(ctx: &Context, file: &Path) -> Result<()> {
    let text = read_input(file)?;
    let mut studio = ctx.load_studio()?;
    let count = studio.import_lrc(&text)?;
    ctx.save_studio(&studio)?;
    println!("Imported {count} lines from {}", file.display());
    Ok(())
}

pub fn paste(ctx: &Context, file: &Path) -> Result<()> {
    let text = read_input(file)?;
    let mut studio = ctx.load_studio()?;
    let count = studio.paste_plain_text(&text);
    if count == 0 {
        return Err(CliError::EmptyPaste);
    }
    ctx.save_studio(&studio)?;
    println!("Pasted {count} untimed lines");
    Ok(())
}

/// One row per line: id, timestamp (or dashes) and text
#[must_use]
pub fn format_line_list(lines: &[LyricLine]) -> String {
    let mut output = String::new();
    for line in lines {
        let timestamp = line
            .timestamp
            .map_or_else(|| "--:--.--".to_string(), format_lrc_timestamp);
        let _ = writeln!(output, "{:>4}  {timestamp}  {}", line.id, line.text);
    }
    output
}

pub fn list(ctx: &Context) -> Result<()> {
    let studio = ctx.load_studio()?;
    if studio.lines().is_empty() {
        println!("No lines in {}", ctx.session_path.display());
        return Ok(());
    }
    print!("{}", format_line_list(studio.lines()));
    Ok(())
}

pub fn add_line(ctx: &Context, text: &str, at: f64, after: Option<u32>) -> Result<LineId> {
    let mut studio = ctx.load_studio()?;
    studio.on_time_update(at);
    let id = studio
        .add_line(after.map(LineId))
        .ok_or(CliError::LineNotFound {
            id: after.unwrap_or_default(),
        })?;
    studio.update_line(id, LinePatch::text(text));
    ctx.save_studio(&studio)?;

    let timestamp = studio
        .store()
        .get(id)
        .and_then(|l| l.timestamp)
        .unwrap_or_default();
    println!("Added line {id} at {}", format_lrc_timestamp(timestamp));
    Ok(id)
}

pub fn edit_line(ctx: &Context, id: u32, text: Option<String>, at: Option<f64>, clear: bool) -> Result<()> {
    let patch = LinePatch {
        text,
        timestamp: if clear { Some(None) } else { at.map(Some) },
    };

    let mut studio = ctx.load_studio()?;
    if !studio.update_line(LineId(id), patch) {
        return Err(CliError::LineNotFound { id });
    }
    ctx.save_studio(&studio)?;
    println!("Updated line {id}");
    Ok(())
}

pub fn delete_line(ctx: &Context, id: u32) -> Result<()> {
    let mut studio = ctx.load_studio()?;
    if !studio.delete_line(LineId(id)) {
        return Err(CliError::LineNotFound { id });
    }
    ctx.save_studio(&studio)?;
    println!("Deleted line {id}");
    Ok(())
}

pub fn move_line(ctx: &Context, id: u32, index: usize) -> Result<()> {
    let mut studio = ctx.load_studio()?;
    if !studio.move_line(LineId(id), index) {
        return Err(CliError::LineNotFound { id });
    }
    ctx.save_studio(&studio)?;
    println!("Moved line {id} to position {index}");
    Ok(())
}

/// Make an export name safe to use as a file name on common filesystems.
///
/// Path separators, reserved characters and control characters become `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();
    if cleaned.is_empty() {
        LEGACY_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Write the LRC export into `out` (or the current directory) and return
/// the path written.
pub fn export(ctx: &Context, out: Option<&Path>, legacy_name: bool, stdout: bool) -> Result<Option<PathBuf>> {
    let studio = ctx.load_studio()?;
    if !studio.can_preview() {
        warn!("No line has both text and a timestamp; the export will only contain the header");
    }

    let export = if legacy_name {
        studio.export_lrc_legacy()
    } else {
        studio.export_lrc()
    };

    if stdout {
        print!("{}", export.content);
        return Ok(None);
    }

    let dir = out.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let path = dir.join(sanitize_file_name(&export.file_name));
    fs::write(&path, export.content)?;
    println!("Wrote {}", path.display());
    Ok(Some(path))
}

pub fn cues(ctx: &Context, duration: Option<f64>, vertical: bool) -> Result<String> {
    let mut studio = ctx.load_studio()?;
    if let Some(duration) = duration {
        studio.on_loaded_metadata(duration);
    }
    if vertical {
        studio.set_orientation(Orientation::Vertical);
    }

    let input = studio.render_input();
    if input.is_empty() {
        info!("No line has both text and a timestamp, nothing to render");
    }
    let json = serde_json::to_string_pretty(&input)?;
    println!("{json}");
    Ok(json)
}

pub fn active(ctx: &Context, at: f64) -> Result<Option<LineId>> {
    let mut studio = ctx.load_studio()?;
    studio.on_time_update(at);

    let line = studio
        .active_line()
        .and_then(|id| studio.store().get(id));
    match line {
        Some(line) => println!(
            "{}  [{}] {}",
            line.id,
            format_lrc_timestamp(line.timestamp.unwrap_or_default()),
            line.text
        ),
        None => println!("No line is active at {at}s"),
    }
    Ok(studio.active_line())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn check(ctx: &Context) -> Result<()> {
    let studio = ctx.load_studio()?;
    let store = studio.store();

    println!("Lines:             {}", store.len());
    println!("Valid lines:       {}", store.valid_lines().count());
    println!("All times zero:    {}", yes_no(store.are_all_timestamps_zero()));
    println!("Strictly ordered:  {}", yes_no(store.is_strictly_ascending()));
    println!("Jump to line:      {}", yes_no(studio.can_jump()));
    println!("Preview/save:      {}", yes_no(studio.can_preview()));
    if let Some(project_id) = studio.project_id() {
        println!("Project:           {project_id}");
    }

    studio.validate_for_save()?;
    Ok(())
}

pub async fn create_project(ctx: &Context, store: &dyn ProjectStore, name: &str) -> Result<()> {
    let project = store.create_project(&ProjectDraft::new(name)).await?;

    let mut studio = ctx.load_studio()?;
    studio.set_project_id(Some(project.id.clone()));
    ctx.save_studio(&studio)?;
    println!("Created project {} ({})", project.id, project.name);
    Ok(())
}

pub async fn show_project(store: &dyn ProjectStore, id: &str) -> Result<()> {
    let project = store.get_project(id).await?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

pub async fn rename_project(store: &dyn ProjectStore, id: &str, name: &str) -> Result<()> {
    let project = store.update_project(id, &ProjectDraft::new(name)).await?;
    println!("Renamed project {} to {}", project.id, project.name);
    Ok(())
}

pub async fn delete_project(ctx: &Context, store: &dyn ProjectStore, id: &str) -> Result<()> {
    store.delete_project(id).await?;

    let mut studio = ctx.load_studio()?;
    if studio.project_id() == Some(id) {
        studio.set_project_id(None);
        ctx.save_studio(&studio)?;
    }
    println!("Deleted project {id}");
    Ok(())
}

pub async fn pull(ctx: &Context, store: &dyn ProjectStore, project_id: &str) -> Result<()> {
    let lines = store.load_lyrics(project_id).await?;

    let mut studio = ctx.load_studio()?;
    match store.audio_metadata(project_id).await {
        Ok(metadata) => studio.set_metadata(metadata),
        Err(e) => warn!("Could not load audio metadata for project {project_id}: {e}"),
    }
    studio.replace_all(lines);
    studio.set_project_id(Some(project_id.to_string()));
    ctx.save_studio(&studio)?;

    println!("Pulled {} lines from project {project_id}", studio.lines().len());
    Ok(())
}

fn resolve_project(studio: &Studio, project: Option<&str>) -> Result<String> {
    project
        .or_else(|| studio.project_id())
        .map(str::to_string)
        .ok_or(CliError::Core(CoreError::NoProject))
}

pub async fn push(ctx: &Context, store: &dyn ProjectStore, project: Option<&str>) -> Result<()> {
    let mut studio = ctx.load_studio()?;
    let project_id = resolve_project(&studio, project)?;
    studio.validate_for_save()?;

    store.save_lyrics(&project_id, studio.lines()).await?;
    studio.set_project_id(Some(project_id.clone()));
    ctx.save_studio(&studio)?;

    println!("Pushed {} lines to project {project_id}", studio.lines().len());
    Ok(())
}

/// Pick up edits other invocations made to the session file
async fn reload_session(ctx: &Context, studio: &RwLock<Studio>) -> Result<()> {
    let session = SessionFile::load(&ctx.session_path)?;
    let mut studio = studio.write().await;
    if session.lines != studio.lines() {
        debug!("Session file changed, reloading {} lines", session.lines.len());
        studio.replace_all(session.lines);
    }
    if &session.metadata != studio.metadata() {
        studio.set_metadata(session.metadata);
    }
    Ok(())
}

/// Save the session to the project on the auto-save interval until
/// `cancel_token` fires, then save one last time.
pub async fn watch(
    ctx: &Context,
    store: Arc<dyn ProjectStore>,
    project: Option<&str>,
    cancel_token: CancellationToken,
) -> Result<()> {
    if !ctx.config.autosave.enabled {
        return Err(CliError::AutosaveDisabled);
    }

    let mut studio = ctx.load_studio()?;
    let project_id = resolve_project(&studio, project)?;
    studio.set_project_id(Some(project_id.clone()));
    ctx.save_studio(&studio)?;

    let studio = Arc::new(RwLock::new(studio));
    let interval = ctx.config.autosave.interval();
    let saver = Arc::new(AutoSaver::new(
        studio.clone(),
        store,
        interval,
        Some(cancel_token.clone()),
    ));
    let saver_handle = saver.clone().start();

    info!("Watching {} for project {project_id}", ctx.session_path.display());

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = reload_session(ctx, &studio).await {
                    warn!("Failed to reload session file: {e}");
                }
            }
        }
    }

    if let Err(e) = saver_handle.await {
        warn!("Auto-save task failed: {e}");
    }

    // Final save so nothing edited since the last tick is lost
    if let Err(e) = reload_session(ctx, &studio).await {
        warn!("Failed to reload session file: {e}");
    }
    let outcome = saver.save_now().await;
    info!("Final save: {outcome:?}");
    Ok(())
}
