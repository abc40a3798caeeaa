mod model;

use searchlight::sampler::{BeamSampler, BeamSamplerConfig, DecodeRequest, Sampler};
use searchlight::tensor::{MaskGrid, TokenGrid};
use searchlight::DecodeError;
use tracing_subscriber::EnvFilter;
use crate::model::{spell, Successor, Uniform};

const Z: u32 = 25;

#[tokio::main]
async fn main() -> Result<(), DecodeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // "zzzzz" followed by seven free positions
    let prompt = TokenGrid::filled(1, 12, Z);
    let mask = MaskGrid::from_rows(vec![(0..12).map(|i| i < 5).collect()])?;
    let request = DecodeRequest::new(prompt).starting_at(5).with_mask(mask);

    if let Some(best) = BeamSampler::default().decode(&Uniform, request.clone()).await?.into_best() {
        println!("uniform best: {}", spell(best.row(0)));
    }

    let sampler = BeamSampler::new(BeamSamplerConfig {
        num_beams: 3,
        return_all_beams: true,
        ..Default::default()
    })?;
    if let Some(beams) = sampler.decode(&Successor, request).await?.into_all_beams() {
        if let Some(sequences) = beams.sequences(0) {
            for (row, score) in sequences.iter_rows().zip(beams.scores().row(0)) {
                println!("successor beam: {} ({:.3})", spell(row), score);
            }
        }
    }
    Ok(())
}
