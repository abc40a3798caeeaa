mod model;

use std::error::Error;
use candle_core::Device;
use searchlight::sampler::{BeamSampler, BeamSamplerConfig, DecodeRequest, Sampler};
use searchlight::tensor::{MaskGrid, TokenGrid};
use tracing_subscriber::EnvFilter;
use crate::model::{Model, Uniform};

fn spell(row: &[u32]) -> String {
    row.iter().map(|&id| char::from(b'a' + id as u8)).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = Model::new(Device::Cpu)?;

    // "zzzzz" followed by seven free positions
    let prompt = TokenGrid::filled(1, 12, 25);
    let mask = MaskGrid::from_rows(vec![(0..12).map(|i| i < 5).collect()])?;
    let request = DecodeRequest::new(prompt)
        .starting_at(5)
        .with_mask(mask)
        .with_cache(model.empty_cache(1)?);
    let uniform = Uniform { device: Device::Cpu };
    if let Some(best) = BeamSampler::default().decode(&uniform, request).await?.into_best() {
        println!("uniform best: {}", spell(best.row(0)));
    }

    // Two prompts, "abc" and "mno", each followed by five free positions
    let prompt = TokenGrid::from_rows(vec![
        vec![0, 1, 2, 0, 0, 0, 0, 0],
        vec![12, 13, 14, 0, 0, 0, 0, 0],
    ])?;
    let mask = MaskGrid::from_rows(vec![(0..8).map(|i| i < 3).collect(); 2])?;
    let request = DecodeRequest::new(prompt)
        .starting_at(3)
        .with_mask(mask)
        .with_cache(model.empty_cache(2)?);

    let sampler = BeamSampler::new(BeamSamplerConfig {
        num_beams: 4,
        return_all_beams: true,
        ..Default::default()
    })?;
    if let Some(beams) = sampler.decode(&model, request).await?.into_all_beams() {
        for batch in 0..beams.shape()[0] {
            let Some(sequences) = beams.sequences(batch) else { continue };
            for (row, score) in sequences.iter_rows().zip(beams.scores().row(batch)) {
                println!("prompt {batch}: {} ({:.3})", spell(row), score);
            }
        }
    }
    Ok(())
}
