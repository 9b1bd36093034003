//! Rewrite benchmarks
//!
//! Run with: cargo bench

use colormix::{Behavior, ColorMixPipeline, MixConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A sliced print with `layers` layers of `moves` extrusion moves each.
fn sliced_blocks(layers: usize, moves: usize) -> Vec<String> {
    let mut blocks = vec![";FLAVOR:Marlin\n;Layer height: 0.2\nG28\n".to_string()];
    for layer in 0..layers {
        let mut block = format!(";LAYER:{}\nG0 Z{:.2}\n", layer, 0.2 * (layer + 1) as f64);
        for i in 0..moves {
            block.push_str(&format!(
                "G1 X{:.3} Y{:.3} E{:.5}\n",
                i as f64 * 0.5,
                layer as f64,
                i as f64 * 0.02
            ));
        }
        blocks.push(block);
    }
    blocks
}

fn blend_benchmark(c: &mut Criterion) {
    let blocks = sliced_blocks(500, 200);
    let pipeline = ColorMixPipeline::new(
        MixConfig::new()
            .behavior(Behavior::Blend)
            .start_height(1.0)
            .finish_height(500.0),
    );

    c.bench_function("blend_500_layers", |b| {
        b.iter(|| pipeline.execute(black_box(blocks.clone())))
    });

    let mixed = pipeline.execute(blocks.clone()).unwrap_or_default();
    c.bench_function("reblend_500_layers", |b| {
        b.iter(|| pipeline.execute(black_box(mixed.clone())))
    });
}

criterion_group!(benches, blend_benchmark);
criterion_main!(benches);
