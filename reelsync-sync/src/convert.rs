//! Conversion boundary: turns one source video into one derived asset.
//!
//! The production [`CommandConverter`] shells out to the configured program
//! (ffmpeg by default). Output goes to `<stem>.reelsync-tmp.<ext>` next to the
//! final path and is renamed into place only after the program succeeds, so a
//! failed conversion never replaces a good preview.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use reelsync_core::ConverterConfig;

use crate::error::ConvertError;

/// Longest stderr excerpt carried in [`ConvertError::Failed`].
const STDERR_TAIL: usize = 2000;

/// Produces the derived asset at `output` from the video at `source`.
pub trait Converter {
    fn convert(&self, source: &Path, output: &Path) -> Result<(), ConvertError>;
}

/// Runs an external program with `{input}` / `{output}` placeholders.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandConverter {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn expand_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                "{input}" => input.as_os_str().to_owned(),
                "{output}" => output.as_os_str().to_owned(),
                other => OsString::from(
                    other
                        .replace("{input}", &input.to_string_lossy())
                        .replace("{output}", &output.to_string_lossy()),
                ),
            })
            .collect()
    }
}

impl Converter for CommandConverter {
    fn convert(&self, source: &Path, output: &Path) -> Result<(), ConvertError> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConvertError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let tmp = tmp_output_path(output);
        let args = self.expand_args(source, &tmp);
        tracing::debug!("running {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ConvertError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !result.status.success() {
            let _ = std::fs::remove_file(&tmp);
            return Err(ConvertError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        if !tmp.is_file() {
            return Err(ConvertError::MissingOutput { path: tmp });
        }

        if let Err(e) = std::fs::rename(&tmp, output) {
            let _ = std::fs::remove_file(&tmp);
            return Err(ConvertError::Io {
                path: output.to_path_buf(),
                source: e,
            });
        }
        Ok(())
    }
}

/// `gifs/intro.gif` → `gifs/intro.reelsync-tmp.gif`.
///
/// The real extension stays last so format-sniffing tools still pick the
/// right encoder.
pub fn tmp_output_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}.reelsync-tmp.{}", ext.to_string_lossy()),
        None => format!("{stem}.reelsync-tmp"),
    };
    output.with_file_name(name)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let count = text.chars().count();
    if count <= STDERR_TAIL {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - STDERR_TAIL).collect();
    format!("...{tail}")
}
