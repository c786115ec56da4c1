use anyhow::{Result, anyhow};
use audrey::Reader;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

// ffmpeg -i input.mp4 -ar 16000 -ac 1 output.wav
fn extract_audio<P: AsRef<Path>>(input_path: P) -> Result<NamedTempFile> {
    log::debug!("Extracting audio from {:?}", input_path.as_ref());

    let temp_file = NamedTempFile::with_suffix(".wav")?;
    let temp_path = temp_file.path();

    let mut pid = Command::new("ffmpeg")
        .args([
            "-i",
            input_path
                .as_ref()
                .to_str()
                .ok_or_else(|| anyhow!("invalid path"))?,
            "-ar",
            "16000",
            "-ac",
            "1",
            "-c:a",
            "pcm_s16le",
            temp_path.to_str().unwrap(),
            "-hide_banner",
            "-y",
            "-loglevel",
            "error",
        ])
        .stdin(Stdio::null())
        .spawn()?;

    if pid.wait()?.success() {
        Ok(temp_file)
    } else {
        Err(anyhow!("unable to extract audio from file"))
    }
}

/// Decodes the input's audio track to 16kHz mono f32 samples for whisper.
pub fn read_audio<P: AsRef<Path>>(input_path: P) -> Result<Vec<f32>> {
    let temp_file = extract_audio(&input_path)?;

    let mut reader = Reader::new(temp_file.reopen()?)?;
    let audio_buf: Vec<i16> = reader.samples().collect::<Result<_, _>>()?;
    let mut output = vec![0.0f32; audio_buf.len()];

    whisper_rs::convert_integer_to_float_audio(&audio_buf, &mut output)?;
    Ok(output)
    // temp_file is automatically deleted when it goes out of scope here
}

// ffmpeg -i input.mp4 -ss <start> -t <duration> -c:v libx264 -c:a aac out.mp4
pub fn cut_clip<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    start: f64,
    duration: f64,
    output_path: Q,
) -> Result<()> {
    log::debug!(
        "Cutting {:.3}s clip at {:.3}s into {:?}",
        duration,
        start,
        output_path.as_ref()
    );

    let status = Command::new("ffmpeg")
        .args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            input_path
                .as_ref()
                .to_str()
                .ok_or_else(|| anyhow!("invalid input path"))?,
            "-ss",
            &format!("{:.3}", start),
            "-t",
            &format!("{:.3}", duration),
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            output_path
                .as_ref()
                .to_str()
                .ok_or_else(|| anyhow!("invalid output path"))?,
            "-y",
        ])
        .stdin(Stdio::null())
        .status()?;

    if !status.success() {
        anyhow::bail!("ffmpeg exited with {} while cutting clip", status);
    }

    Ok(())
}
