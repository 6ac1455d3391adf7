use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use log::{debug, info, warn};
use strum_macros::{Display, EnumIter};
use tempfile::TempDir;
use umya_spreadsheet::{writer, Spreadsheet};

use crate::error::{FillError, RenderError};

/// Converts a filled workbook into a PDF at `target`.
pub trait Renderer {
    fn render(&mut self, source: &Path, target: &Path) -> Result<(), RenderError>;
}

/// The shared scratch workbook for the row being rendered. Dropping the
/// guard removes the file.
pub struct TemporaryInvoice<'a> {
    path: &'a Path,
}

impl<'a> TemporaryInvoice<'a> {
    pub fn write(book: &Spreadsheet, path: &'a Path) -> Result<Self, FillError> {
        let guard = Self { path };
        writer::xlsx::write(book, path).map_err(|source| FillError::Save {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        self.path
    }
}

impl Drop for TemporaryInvoice<'_> {
    fn drop(&mut self) {
        match fs::remove_file(self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {:?}: {}", self.path, e),
        }
    }
}

/// Quiet-running options requested from the office program.
#[derive(Display, EnumIter, Debug, PartialEq, Clone, Copy)]
pub enum Setting {
    #[strum(serialize = "hidden window")]
    Hidden,
    #[strum(serialize = "no recovery alerts")]
    NoAlerts,
    #[strum(serialize = "no splash screen")]
    NoSplash,
}

impl Setting {
    pub fn flag(&self) -> &'static str {
        match self {
            Setting::Hidden => "--headless",
            Setting::NoAlerts => "--norestore",
            Setting::NoSplash => "--nologo",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SettingStatus {
    Applied,
    Unsupported,
}

/// Checks each setting against the program's `--help` listing.
pub fn check_settings(help: &str) -> Vec<(Setting, SettingStatus)> {
    use strum::IntoEnumIterator;

    Setting::iter()
        .map(|setting| {
            let listed = help
                .split_whitespace()
                .any(|word| word.trim_end_matches(',') == setting.flag());
            let status = if listed {
                SettingStatus::Applied
            } else {
                SettingStatus::Unsupported
            };
            (setting, status)
        })
        .collect()
}

/// `-env:UserInstallation` wants a file URL.
fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

/// One office instance held for the whole run. A headless listener is
/// started on a private user profile; each conversion is launched against
/// the same profile and handed over to that running instance, so the office
/// only starts once. Converted files land in a staging folder before being
/// moved to their target. Closing or dropping the session stops the
/// listener and removes both folders.
pub struct OfficeSession {
    program: PathBuf,
    listener: Option<Child>,
    profile: TempDir,
    staging: TempDir,
    settings: Vec<(Setting, SettingStatus)>,
}

impl OfficeSession {
    pub fn start(program: &Path) -> Result<Self, RenderError> {
        let unavailable = |source| RenderError::Unavailable {
            program: program.to_path_buf(),
            source,
        };

        let version = Command::new(program)
            .arg("--version")
            .output()
            .map_err(unavailable)?;
        info!(
            "Using {}",
            String::from_utf8_lossy(&version.stdout).trim()
        );

        let help = Command::new(program)
            .arg("--help")
            .output()
            .map_err(unavailable)?;
        let listing = format!(
            "{}{}",
            String::from_utf8_lossy(&help.stdout),
            String::from_utf8_lossy(&help.stderr)
        );
        let settings = check_settings(&listing);
        for (setting, status) in settings.iter() {
            match status {
                SettingStatus::Applied => info!("{}: applied", setting),
                SettingStatus::Unsupported => {
                    warn!("{}: not supported by {:?}", setting, program)
                }
            }
        }

        let mut session = Self {
            program: program.to_path_buf(),
            listener: None,
            profile: tempfile::Builder::new().prefix("invoicer-profile").tempdir()?,
            staging: tempfile::Builder::new().prefix("invoicer-pdf").tempdir()?,
            settings,
        };

        let listener = session
            .command()
            .arg(format!(
                "--accept=pipe,name=invoicer-{};urp;",
                std::process::id()
            ))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(unavailable)?;
        debug!("Office listener started as pid {}", listener.id());
        session.listener = Some(listener);

        Ok(session)
    }

    /// The program with the applied settings and the shared profile.
    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(
                self.settings
                    .iter()
                    .filter(|(_, status)| *status == SettingStatus::Applied)
                    .map(|(setting, _)| setting.flag()),
            )
            .arg(format!(
                "-env:UserInstallation={}",
                file_url(self.profile.path())
            ));
        command
    }

    fn convert(&self, source: &Path) -> Result<Output, RenderError> {
        Ok(self
            .command()
            .args(["--convert-to", "pdf", "--outdir"])
            .arg(self.staging.path())
            .arg(source)
            .output()?)
    }

    pub fn listener_alive(&mut self) -> bool {
        match self.listener.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn stop_listener(&mut self) {
        if let Some(mut child) = self.listener.take() {
            if let Err(e) = child.kill() {
                warn!("Could not stop office listener: {}", e);
            }
            if let Err(e) = child.wait() {
                warn!("Could not reap office listener: {}", e);
            }
        }
    }

    /// Ends the session; the profile and staging folders go with it.
    pub fn close(mut self) {
        self.stop_listener();
        info!("Office session closed");
    }
}

impl Drop for OfficeSession {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

impl Renderer for OfficeSession {
    fn render(&mut self, source: &Path, target: &Path) -> Result<(), RenderError> {
        if !self.listener_alive() {
            warn!("Office listener is gone, conversions start their own instance");
        }

        let stem = source.file_stem().unwrap_or_default();
        let converted = self.staging.path().join(stem).with_extension("pdf");
        // a leftover from an earlier row must not pass for this one
        match fs::remove_file(&converted) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let output = self.convert(source)?;
        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !converted.exists() {
            return Err(RenderError::NoOutput(converted));
        }
        move_file(&converted, target)?;
        debug!("Rendered {:?}", target);
        Ok(())
    }
}

impl fmt::Debug for OfficeSession {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OfficeSession")
            .field("program", &self.program)
            .field("listener", &self.listener.as_ref().map(Child::id))
            .field("profile", &self.profile.path())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Rename, falling back to copy when the staging folder is on another
/// filesystem.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}
