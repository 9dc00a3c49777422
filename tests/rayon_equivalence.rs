#![cfg(feature = "rayon")]

use msld::{Msld, MsldConfig, OwnedImage, Sample};

fn make_image(width: usize, height: usize, seed: usize) -> OwnedImage<f32> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 11 + seed) ^ (y * 3) ^ (x * y)) & 0xFF;
            data.push(value as f32 / 255.0);
        }
    }
    OwnedImage::new(data, width, height).unwrap()
}

fn make_sample(width: usize, height: usize, seed: usize) -> Sample {
    let image = make_image(width, height, seed);
    let label = image.data().iter().map(|&v| v > 0.7).collect();
    let mask = (0..width * height).map(|i| i % 7 != 0).collect();
    Sample::new(
        image,
        OwnedImage::new(label, width, height).unwrap(),
        OwnedImage::new(mask, width, height).unwrap(),
    )
    .unwrap()
}

fn detectors() -> (Msld, Msld) {
    let cfg = MsldConfig::new(9, vec![3, 5, 7], 6);
    let parallel = MsldConfig {
        parallel: true,
        ..cfg.clone()
    };
    (Msld::new(cfg).unwrap(), Msld::new(parallel).unwrap())
}

#[test]
fn parallel_combine_matches_sequential() {
    let (seq, par) = detectors();
    let image = make_image(57, 41, 0);
    let a = seq.combine(image.view()).unwrap();
    let b = par.combine(image.view()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn parallel_evaluation_matches_sequential() {
    let (mut seq, mut par) = detectors();
    let dataset: Vec<Sample> = (0..4).map(|s| make_sample(40, 33, s * 17)).collect();

    let roc_seq = seq.roc(&dataset).unwrap();
    let roc_par = par.roc(&dataset).unwrap();
    assert_eq!(roc_seq.pixels, roc_par.pixels);
    assert_eq!(roc_seq.curve, roc_par.curve);

    let learned_seq = seq.learn_threshold(&dataset).unwrap();
    let learned_par = par.learn_threshold(&dataset).unwrap();
    assert_eq!(learned_seq, learned_par);

    assert_eq!(
        seq.naive_metrics(&dataset).unwrap(),
        par.naive_metrics(&dataset).unwrap()
    );
    assert_eq!(seq.dice(&dataset).unwrap(), par.dice(&dataset).unwrap());

    let report_seq = seq.evaluate(&dataset).unwrap();
    let report_par = par.evaluate(&dataset).unwrap();
    assert_eq!(report_seq.roc.curve, report_par.roc.curve);
    assert_eq!(report_seq.metrics, report_par.metrics);
    for (a, b) in report_seq.samples.iter().zip(&report_par.samples) {
        assert_eq!(a.segmentation, b.segmentation);
        assert_eq!(a.overlap, b.overlap);
    }
}
