use std::{
    ffi::{c_int, c_void},
    path::Path,
};

use anyhow::{Result, anyhow};
use whisper_rs::{FullParams, WhisperContext, WhisperContextParameters};

use crate::{
    config::{Language, TranscriptionConfig, WhisperConfig},
    ffmpeg,
    transcribe::TranscriptSegment,
};

unsafe extern "C" fn whisper_progress_callback(
    _ctx: *mut c_void,
    _state: *mut c_void,
    progress: c_int,
    user_data: *mut c_void,
) {
    if !user_data.is_null() {
        unsafe {
            let pb = &*(user_data as *mut indicatif::ProgressBar);
            pb.set_position(progress as u64);
        }
    }
}

pub struct Whisper {
    ctx: WhisperContext,
    lang: Language,
}

const DEFAULT_BEAM_SIZE: u32 = 5;
const DEFAULT_PATIENCE: f32 = 1.0;

impl Whisper {
    pub fn new(conf: &TranscriptionConfig, lang: Language) -> Result<Self> {
        // get model path according to lang
        let model_path = conf
            .models
            .get(&lang)
            .ok_or_else(|| anyhow!("Model not configured for language: {:?}", lang))?;

        // make whisper context
        let param = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(model_path, param)?;

        Ok(Self { ctx, lang })
    }

    pub fn transcribe<P: AsRef<Path>>(
        &mut self,
        audio: P,
        conf: &WhisperConfig,
        pb: &mut indicatif::ProgressBar,
    ) -> Result<Vec<TranscriptSegment>> {
        // make parameters
        let mut params = FullParams::new(whisper_rs::SamplingStrategy::BeamSearch {
            beam_size: conf.beam_size.unwrap_or(DEFAULT_BEAM_SIZE) as c_int,
            patience: conf.patience.unwrap_or(DEFAULT_PATIENCE),
        });

        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(false);

        params.set_temperature(conf.temperature.unwrap_or(0.0));

        params.set_language(Some(self.lang.as_str()));
        match conf.initial_prompt.as_ref() {
            Some(prompt) => params.set_initial_prompt(prompt),
            None => {}
        }

        // Drive the provided ProgressBar from whisper's progress callback
        unsafe {
            params.set_progress_callback(Some(std::mem::transmute(
                whisper_progress_callback as *const (),
            )));
            params.set_progress_callback_user_data(pb as *mut _ as *mut c_void);
        }

        let audio = ffmpeg::read_audio(audio)?;

        let mut state = self.ctx.create_state()?;
        state.full(params, &audio)?;

        let num_segments = state.full_n_segments();
        if num_segments < 1 {
            return Err(anyhow!("no segments found"));
        }

        let mut segments = Vec::with_capacity(num_segments as usize);

        for segment in state.as_iter() {
            let text = segment.to_str_lossy()?.to_string();
            // whisper timestamps are in 10ms units
            let start = segment.start_timestamp() as f64 / 100.0;
            let end = segment.end_timestamp() as f64 / 100.0;

            segments.push(TranscriptSegment { start, end, text });
        }

        Ok(segments)
    }
}
