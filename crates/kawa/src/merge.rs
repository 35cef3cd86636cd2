use std::path::Path;

use tokio::process::Command;

use crate::error::KawaResult;

/// Produces the final container at `output`.
///
/// With an audio track present the two streams are multiplexed by the
/// external ffmpeg binary using stream copy, no re-encode. Without one, the
/// video stream is renamed directly and the muxer is never invoked. A
/// non-zero muxer exit is reported but not retried; phase outputs stay on
/// disk either way.
pub async fn combine(video: &Path, audio: Option<&Path>, output: &Path) -> KawaResult<()> {
    let Some(audio) = audio else {
        tracing::info!(
            "No audio stream, renaming {} to {}",
            video.display(),
            output.display()
        );
        tokio::fs::rename(video, output).await?;
        return Ok(());
    };

    let ffmpeg = which::which("ffmpeg")?;
    tracing::info!("Muxing with {}...", ffmpeg.display());

    let status = Command::new(ffmpeg)
        .arg("-i")
        .arg(audio)
        .arg("-i")
        .arg(video)
        .args(["-acodec", "copy", "-vcodec", "copy"])
        .arg(output)
        .spawn()?
        .wait()
        .await?;

    if status.success() {
        tracing::info!("Combined output at {}", output.display());
    } else {
        tracing::error!("ffmpeg exited with {status}");
    }
    Ok(())
}
