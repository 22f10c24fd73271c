use crate::encode::ensure_parent_dir;
use crate::encode::sink::{FrameSink, OrderGuard, SinkConfig, check_frame_size};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StarfieldError, StarfieldResult};
use crate::render::frame::Frame;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output video file path; the container follows the extension.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Value passed to `-c:v`.
    pub codec: String,
    /// Value passed to the output `-pix_fmt`, if any.
    pub pix_fmt: Option<String>,
}

impl FfmpegSinkOpts {
    /// H.264 in yuv420p, the most widely playable combination.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            codec: "libx264".to_string(),
            pix_fmt: Some("yuv420p".to_string()),
        }
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    fn needs_even_dimensions(&self) -> bool {
        self.pix_fmt
            .as_deref()
            .is_some_and(|f| f.starts_with("yuv420") || f.starts_with("nv12"))
    }

    /// Full argument list for an `ffmpeg` invocation reading raw gray8 frames from stdin.
    pub fn ffmpeg_args(&self, cfg: &SinkConfig) -> Vec<String> {
        let mut args = vec![
            if self.overwrite { "-y" } else { "-n" }.to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "gray".to_string(),
            "-s".to_string(),
            format!("{}x{}", cfg.width, cfg.height),
        ];
        args.extend(input_fps_args(cfg.fps));
        args.extend(
            ["-i", "pipe:0", "-an", "-c:v", self.codec.as_str()]
                .into_iter()
                .map(str::to_string),
        );
        if let Some(pix_fmt) = &self.pix_fmt {
            args.push("-pix_fmt".to_string());
            args.push(pix_fmt.clone());
        }
        args.push(self.out_path.to_string_lossy().into_owned());
        args
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    order: OrderGuard,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            order: OrderGuard::default(),
        }
    }

    fn validate(&self, cfg: &SinkConfig) -> StarfieldResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(StarfieldError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(StarfieldError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if self.opts.needs_even_dimensions()
            && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
        {
            return Err(StarfieldError::validation(
                "ffmpeg sink width/height must be even for chroma-subsampled output",
            ));
        }
        if self.opts.codec.trim().is_empty() {
            return Err(StarfieldError::validation("ffmpeg codec must not be empty"));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> StarfieldResult<()> {
        self.validate(&cfg)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(StarfieldError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(StarfieldError::encode(
                "ffmpeg is required for video output, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(self.opts.ffmpeg_args(&cfg));

        tracing::debug!(
            out = %self.opts.out_path.display(),
            codec = %self.opts.codec,
            "spawning ffmpeg"
        );
        let mut child = cmd.spawn().map_err(|e| {
            StarfieldError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StarfieldError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| StarfieldError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.order = OrderGuard::default();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> StarfieldResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StarfieldError::encode("ffmpeg sink not started"))?;
        check_frame_size(cfg, frame)?;
        self.order.advance(idx)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StarfieldError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(frame.as_raw()).map_err(|e| {
            StarfieldError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> StarfieldResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| StarfieldError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            StarfieldError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StarfieldError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| StarfieldError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(StarfieldError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Reached with a live child only when a render aborted before `end`.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn input_fps_args(fps: Fps) -> [String; 2] {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    ["-r".to_string(), format!("{}/{}", fps.num, fps.den)]
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
