//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Lines kept per stream for diagnostics. Older lines are dropped.
const MAX_CAPTURED_LINES: usize = 400;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Seek the input to a `HH:MM:SS` position before decoding.
    pub fn seek_to(self, timestamp: impl Into<String>) -> Self {
        self.input_arg("-ss").input_arg(timestamp)
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Copy the audio stream untouched.
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Extract single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-vframes").output_arg("1")
    }

    /// Set still-image quality (`-q:v`, lower is better).
    pub fn quality(self, q: u8) -> Self {
        self.output_arg("-q:v").output_arg(q.to_string())
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Output path this command writes to.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Lines captured from a finished process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl ProcessOutput {
    /// Both streams joined for diagnostics, stdout first.
    pub fn combined(&self) -> String {
        self.stdout
            .iter()
            .chain(self.stderr.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runner for FFmpeg commands.
///
/// Both output streams are read by their own task while the runner waits
/// on the child, so a chatty process never blocks on a full pipe.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Program to execute (name on PATH or explicit path)
    program: PathBuf,
    /// Optional wall-clock limit
    timeout: Option<Duration>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner for `ffmpeg` on PATH with no timeout.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            timeout: None,
        }
    }

    /// Use a different executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolve the configured executable on `PATH`.
    pub fn check(&self) -> MediaResult<PathBuf> {
        which::which(&self.program)
            .map_err(|_| MediaError::FfmpegNotFound(self.program.display().to_string()))
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ProcessOutput> {
        let program = self.check()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", program.display(), args.join(" "));

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::Io(std::io::Error::other("stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::Io(std::io::Error::other("stderr not captured")))?;

        let stdout_task = tokio::spawn(drain_lines(stdout, "stdout"));
        let stderr_task = tokio::spawn(drain_lines(stderr, "stderr"));

        let status = self.wait_for_exit(&mut child).await;

        // Pipes close once the child exits or is killed, so both drains finish.
        let output = ProcessOutput {
            stdout: stdout_task.await.unwrap_or_default(),
            stderr: stderr_task.await.unwrap_or_default(),
        };

        let status = status?;
        if status.success() {
            Ok(output)
        } else {
            Err(MediaError::ffmpeg_failed(
                format!("{} exited with {}", self.program.display(), status),
                Some(output.combined()),
                status.code(),
            ))
        }
    }

    /// Wait for the child, killing it if the timeout elapses.
    async fn wait_for_exit(&self, child: &mut Child) -> MediaResult<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait().await?);
        };

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!(
                    "FFmpeg timed out after {} seconds, killing process",
                    timeout.as_secs()
                );
                let _ = child.kill().await;
                Err(MediaError::Timeout(timeout.as_secs()))
            }
        }
    }
}

/// Read a stream line by line until EOF, logging and keeping the tail.
async fn drain_lines<R>(reader: R, stream: &'static str) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut captured = VecDeque::new();

    while let Ok(Some(line)) = lines.next_line().await {
        debug!(stream, "{}", line);
        if captured.len() == MAX_CAPTURED_LINES {
            captured.pop_front();
        }
        captured.push_back(line);
    }

    captured.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .video_filter("drawtext=text=hi")
            .copy_audio();

        let args = cmd.build_args();
        assert_eq!(
            args,
            vec![
                "-y", "-v", "error", "-i", "input.mp4", "-vf", "drawtext=text=hi", "-c:a",
                "copy", "output.mp4"
            ]
        );
    }

    #[test]
    fn test_seek_goes_before_input() {
        let cmd = FfmpegCommand::new("in.mp4", "out.jpg")
            .seek_to("00:00:01")
            .single_frame()
            .quality(2);

        let args = cmd.build_args();
        let seek = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        let frames = args.iter().position(|a| a == "-vframes").unwrap();
        assert!(seek < input);
        assert!(frames > input);
        assert!(args.contains(&"-q:v".to_string()));
    }

    #[test]
    fn test_combined_output_keeps_both_streams() {
        let output = ProcessOutput {
            stdout: vec!["out line".to_string()],
            stderr: vec!["err line".to_string()],
        };
        assert_eq!(output.combined(), "out line\nerr line");
    }

    #[test]
    fn test_check_resolves_configured_program() {
        let err = FfmpegRunner::new()
            .with_program("/nonexistent/ffmpeg-binary")
            .check()
            .unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound(ref p) if p == "/nonexistent/ffmpeg-binary"));

        #[cfg(unix)]
        {
            let found = FfmpegRunner::new().with_program("sh").check().unwrap();
            assert!(found.is_absolute());
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let runner = FfmpegRunner::new().with_program("/nonexistent/ffmpeg-binary");
        let cmd = FfmpegCommand::new("a.mp4", "b.mp4");
        let err = runner.run(&cmd).await.unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound(_)));
    }
}
