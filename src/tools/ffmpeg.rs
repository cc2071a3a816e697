//! FFmpeg-backed transcoder.
//!
//! Shells out to the `ffmpeg` command-line tool for trimming songs,
//! generating silence and concatenating the round.
//!
//! Install ffmpeg:
//! - Windows: `winget install Gyan.FFmpeg`
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt install ffmpeg` or equivalent

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::Transcoder;
use super::process::{find_tool, run_tool};
use crate::config::{EncodeConfig, TrimConfig};
use crate::error::{Error, Result};
use crate::plan::write_manifest;
use crate::round::ArtifactDir;

const TOOL: &str = "ffmpeg";
const VERSION_ARG: &str = "-version";

/// Common installation paths for ffmpeg on Windows
#[cfg(windows)]
pub const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    r".\ffmpeg.exe",
    r"C:\ffmpeg\bin\ffmpeg.exe",
    r"C:\Program Files\ffmpeg\bin\ffmpeg.exe",
];

#[cfg(not(windows))]
pub const FFMPEG_PATHS: &[&str] = &[
    "ffmpeg", // In PATH
    "./ffmpeg",
    "/usr/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
];

/// Format seconds as `HH:MM:SS`.
pub fn seconds_to_timestamp(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Transcoder that runs ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    trim: TrimConfig,
    encode: EncodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>, trim: TrimConfig, encode: EncodeConfig) -> Self {
        Self {
            program: program.into(),
            trim,
            encode,
        }
    }

    /// Locate ffmpeg, preferring an explicitly configured path.
    pub fn locate(
        configured: Option<&Path>,
        trim: TrimConfig,
        encode: EncodeConfig,
    ) -> Result<Self> {
        let program = find_tool(configured, FFMPEG_PATHS, VERSION_ARG).ok_or_else(|| {
            Error::ToolNotFound(match configured {
                Some(path) => format!("ffmpeg at {}", path.display()),
                None => "ffmpeg (install it or pass --ffmpeg-path)".to_string(),
            })
        })?;
        tracing::debug!("Using ffmpeg at {:?}", program);
        Ok(Self::new(program, trim, encode))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn base_args() -> Vec<OsString> {
        ["-hide_banner", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    /// Arguments for cutting a song to the trim window with fades.
    pub fn trim_args(&self, source: &Path, dest: &Path) -> Vec<OsString> {
        let fade = self.trim.fade_secs;
        let filter = format!(
            "afade=t=in:st=0:d={fade},afade=t=out:st={}:d={fade}",
            self.trim.fade_out_start()
        );

        let mut args = Self::base_args();
        args.extend([
            "-i".into(),
            source.as_os_str().to_owned(),
            "-ss".into(),
            "00:00:00".into(),
            "-t".into(),
            seconds_to_timestamp(self.trim.window_secs).into(),
            "-af".into(),
            filter.into(),
            "-y".into(),
            dest.as_os_str().to_owned(),
        ]);
        args
    }

    /// Arguments for rendering a silence clip.
    pub fn silence_args(&self, duration: u32, dest: &Path) -> Vec<OsString> {
        let source = format!(
            "anullsrc=channel_layout={}:sample_rate={}",
            self.encode.channel_layout, self.encode.sample_rate
        );

        let mut args = Self::base_args();
        args.extend([
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            source.into(),
            "-t".into(),
            duration.to_string().into(),
            "-acodec".into(),
            "libmp3lame".into(),
            "-b:a".into(),
            self.encode.bitrate.clone().into(),
            "-y".into(),
            dest.as_os_str().to_owned(),
        ]);
        args
    }

    /// Arguments for concatenating the entries of a manifest.
    pub fn concat_args(&self, manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut args = Self::base_args();
        args.extend([
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            manifest.as_os_str().to_owned(),
            // Re-encode instead of stream copy so mixed sources join cleanly
            "-c:a".into(),
            "libmp3lame".into(),
            "-b:a".into(),
            self.encode.bitrate.clone().into(),
            "-y".into(),
            output.as_os_str().to_owned(),
        ]);
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn trim(&self, source: &Path, dest: &Path) -> Result<()> {
        run_tool(TOOL, &self.program, &self.trim_args(source, dest)).await
    }

    async fn render_silence(&self, duration: u32, dest: &Path) -> Result<()> {
        run_tool(TOOL, &self.program, &self.silence_args(duration, dest)).await
    }

    async fn concat(
        &self,
        names: &[String],
        artifacts: &ArtifactDir,
        output: &Path,
    ) -> Result<()> {
        let manifest = write_manifest(names, artifacts)?;
        run_tool(TOOL, &self.program, &self.concat_args(&manifest, output)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcoder() -> FfmpegTranscoder {
        FfmpegTranscoder::new("ffmpeg", TrimConfig::default(), EncodeConfig::default())
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_seconds_to_timestamp() {
        assert_eq!(seconds_to_timestamp(0), "00:00:00");
        assert_eq!(seconds_to_timestamp(90), "00:01:30");
        assert_eq!(seconds_to_timestamp(3725), "01:02:05");
    }

    #[test]
    fn test_trim_args() {
        let args = transcoder().trim_args(Path::new("a/0.mp3"), Path::new("a/0.trimmed.mp3"));
        let args = strings(&args);
        assert_eq!(
            args,
            [
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "a/0.mp3",
                "-ss",
                "00:00:00",
                "-t",
                "00:01:30",
                "-af",
                "afade=t=in:st=0:d=5,afade=t=out:st=85:d=5",
                "-y",
                "a/0.trimmed.mp3"
            ]
        );
    }

    #[test]
    fn test_trim_args_custom_window() {
        let t = FfmpegTranscoder::new(
            "ffmpeg",
            TrimConfig {
                window_secs: 60,
                fade_secs: 3,
            },
            EncodeConfig::default(),
        );
        let args = strings(&t.trim_args(Path::new("in.mp3"), Path::new("out.mp3")));
        assert!(args.contains(&"00:01:00".to_string()));
        assert!(args.contains(&"afade=t=in:st=0:d=3,afade=t=out:st=57:d=3".to_string()));
    }

    #[test]
    fn test_silence_args() {
        let args = strings(&transcoder().silence_args(10, Path::new("a/break_10.mp3")));
        assert!(args.contains(&"anullsrc=channel_layout=stereo:sample_rate=44100".to_string()));
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "10");
        assert_eq!(args.last().unwrap(), "a/break_10.mp3");
    }

    #[test]
    fn test_concat_args() {
        let manifest = Path::new("a/concat_list.txt");
        let args = strings(&transcoder().concat_args(manifest, Path::new("rounds.mp3")));
        let joined = args.join(" ");
        assert!(joined.contains("-f concat -safe 0 -i a/concat_list.txt"));
        assert!(joined.contains("-c:a libmp3lame -b:a 192k"));
        assert_eq!(args.last().unwrap(), "rounds.mp3");
    }

    #[test]
    fn test_locate_with_bad_configured_path() {
        let result = FfmpegTranscoder::locate(
            Some(Path::new("/nonexistent/ffmpeg")),
            TrimConfig::default(),
            EncodeConfig::default(),
        );
        assert!(matches!(result, Err(Error::ToolNotFound(_))));
    }
}
