use msld::{Border, Msld, MsldConfig, MsldError, OwnedImage, Sample};

const SIZE: usize = 32;
const LINE: usize = 16;

fn horizontal_line_image() -> OwnedImage<f32> {
    let mut data = vec![0.5f32; SIZE * SIZE];
    for x in 0..SIZE {
        data[LINE * SIZE + x] = 1.0;
    }
    OwnedImage::new(data, SIZE, SIZE).unwrap()
}

fn vertical_line_image() -> OwnedImage<f32> {
    let mut data = vec![0.5f32; SIZE * SIZE];
    for y in 0..SIZE {
        data[y * SIZE + LINE] = 1.0;
    }
    OwnedImage::new(data, SIZE, SIZE).unwrap()
}

fn line_label(horizontal: bool) -> OwnedImage<bool> {
    let data = (0..SIZE * SIZE)
        .map(|i| {
            let (x, y) = (i % SIZE, i / SIZE);
            if horizontal {
                y == LINE
            } else {
                x == LINE
            }
        })
        .collect();
    OwnedImage::new(data, SIZE, SIZE).unwrap()
}

/// Region of interest excluding a two-pixel frame.
fn inner_mask() -> OwnedImage<bool> {
    let inside = |v: usize| (2..SIZE - 2).contains(&v);
    let data = (0..SIZE * SIZE)
        .map(|i| inside(i % SIZE) && inside(i / SIZE))
        .collect();
    OwnedImage::new(data, SIZE, SIZE).unwrap()
}

fn line_dataset() -> Vec<Sample> {
    vec![
        Sample::new(horizontal_line_image(), line_label(true), inner_mask())
            .unwrap()
            .with_name("horizontal"),
        Sample::new(vertical_line_image(), line_label(false), inner_mask())
            .unwrap()
            .with_name("vertical"),
    ]
}

fn line_detector() -> Msld {
    Msld::new(MsldConfig::new(31, vec![7, 9], 2)).unwrap()
}

fn row(image: &OwnedImage<f32>, y: usize) -> &[f32] {
    image.row(y).unwrap()
}

#[test]
fn combined_response_peaks_on_the_line() {
    let msld = line_detector();
    let image = horizontal_line_image();
    let combined = msld.combine(image.view()).unwrap();
    assert_eq!(combined.dims(), (SIZE, SIZE));

    let line_min = row(&combined, LINE)
        .iter()
        .copied()
        .fold(f32::INFINITY, f32::min);
    for y in [2usize, 29] {
        let far_max = row(&combined, y)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(
            line_min > far_max,
            "row {LINE} min {line_min} <= row {y} max {far_max}"
        );
    }
}

#[test]
fn segmentation_marks_the_whole_line() {
    let image = horizontal_line_image();
    let probe = line_detector();
    let combined = probe.combine(image.view()).unwrap();
    let line_min = row(&combined, LINE)
        .iter()
        .copied()
        .fold(f32::INFINITY, f32::min);

    let msld = line_detector().with_threshold(line_min);
    let segmented = msld.segment(image.view()).unwrap();
    assert!(segmented.row(LINE).unwrap().iter().all(|&v| v));
    assert!(segmented.row(2).unwrap().iter().all(|&v| !v));
    assert!(segmented.row(29).unwrap().iter().all(|&v| !v));
}

#[test]
fn single_scale_response_is_standardized() {
    let msld = line_detector();
    let image = horizontal_line_image();
    for scale in [7, 9] {
        let response = msld.bld(image.view(), scale).unwrap();
        let n = response.data().len() as f64;
        let mean = response.data().iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let var = response
            .data()
            .iter()
            .map(|&v| (f64::from(v) - mean).powi(2))
            .sum::<f64>()
            / n;
        assert!(mean.abs() < 1e-4, "scale {scale} mean {mean}");
        assert!((var - 1.0).abs() < 1e-3, "scale {scale} variance {var}");
    }
}

#[test]
fn combine_preserves_shape_across_configurations() {
    let configs = [
        MsldConfig::new(15, vec![1, 3, 5], 12),
        MsldConfig::new(7, vec![2, 4], 3),
        MsldConfig {
            border: Border::Replicate,
            ..MsldConfig::new(31, vec![15], 1)
        },
    ];
    let (w, h) = (13, 6);
    let data: Vec<f32> = (0..w * h).map(|i| ((i * 7) % 11) as f32 / 11.0).collect();
    let image = OwnedImage::new(data, w, h).unwrap();
    for cfg in configs {
        let msld = Msld::new(cfg).unwrap();
        let combined = msld.combine(image.view()).unwrap();
        assert_eq!(combined.dims(), (w, h));
        assert!(combined.data().iter().all(|v| v.is_finite()));
    }
}

#[test]
fn learned_threshold_separates_synthetic_lines() {
    let dataset = line_dataset();
    let mut msld = line_detector();

    let (threshold, accuracy) = msld.learn_threshold(&dataset).unwrap();
    assert_eq!(accuracy, 1.0);
    assert_eq!(msld.threshold(), threshold);
    assert!(threshold.is_finite());

    let auc = msld.auc(&dataset).unwrap();
    assert!((auc - 1.0).abs() < 1e-12);

    let metrics = msld.naive_metrics(&dataset).unwrap();
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.normalized, [[1.0, 0.0], [0.0, 1.0]]);
    let roi: usize = dataset.iter().map(Sample::roi_len).sum();
    assert_eq!(metrics.counts.total(), roi as u64);
    assert_eq!(metrics.counts.true_positives, 2 * (SIZE as u64 - 4));

    assert_eq!(msld.dice(&dataset).unwrap(), 1.0);

    for sample in &dataset {
        let segmented = msld.segment(sample.image()).unwrap();
        assert_eq!(segmented.data(), sample.label().data(), "{:?}", sample.name());
    }
}

#[test]
fn learning_is_idempotent() {
    let dataset = line_dataset();
    let mut msld = line_detector();
    let first = msld.learn_threshold(&dataset).unwrap();
    let second = msld.learn_threshold(&dataset).unwrap();
    assert_eq!(first, second);
}

#[test]
fn roc_is_restricted_to_the_region_of_interest() {
    let dataset = line_dataset();
    let msld = line_detector();
    let analysis = msld.roc(&dataset).unwrap();
    let roi: usize = dataset.iter().map(Sample::roi_len).sum();
    assert_eq!(analysis.pixels.len(), roi);
    assert_eq!(analysis.curve.positives, 2 * (SIZE - 4));
    assert_eq!(analysis.curve.fpr.first(), Some(&0.0));
    assert_eq!(analysis.curve.tpr.last(), Some(&1.0));
    assert_eq!(analysis.curve.fpr.last(), Some(&1.0));
}

#[test]
fn degenerate_datasets_are_rejected() {
    let mut msld = line_detector();
    let err = msld.learn_threshold(&[]).unwrap_err();
    assert!(matches!(err, MsldError::DegenerateDataset { .. }));

    let background_only = Sample::new(
        horizontal_line_image(),
        OwnedImage::filled(SIZE, SIZE, false).unwrap(),
        inner_mask(),
    )
    .unwrap();
    let err = msld.learn_threshold(&[background_only]).unwrap_err();
    assert!(matches!(err, MsldError::DegenerateDataset { .. }));
    assert_eq!(msld.threshold(), Msld::DEFAULT_THRESHOLD);

    let empty_roi = Sample::new(
        horizontal_line_image(),
        line_label(true),
        OwnedImage::filled(SIZE, SIZE, false).unwrap(),
    )
    .unwrap();
    let err = msld.auc(&[empty_roi]).unwrap_err();
    assert!(matches!(err, MsldError::DegenerateDataset { .. }));
}

#[test]
fn single_pass_evaluation_matches_individual_metrics() {
    let dataset = line_dataset();
    let mut learned = line_detector();
    learned.learn_threshold(&dataset).unwrap();
    let loose = line_detector().with_threshold(0.3);

    for msld in [learned, loose] {
        let report = msld.evaluate(&dataset).unwrap();
        let roc = msld.roc(&dataset).unwrap();
        assert_eq!(report.roc.curve, roc.curve);
        assert_eq!(report.roc.pixels, roc.pixels);
        assert_eq!(report.metrics, msld.naive_metrics(&dataset).unwrap());
        assert_eq!(report.dice, msld.dice(&dataset).unwrap());

        assert_eq!(report.samples.len(), dataset.len());
        for (sample, evaluation) in dataset.iter().zip(&report.samples) {
            let segmented = msld.segment(sample.image()).unwrap();
            assert_eq!(evaluation.segmentation, segmented);
            let single = msld.dice(std::slice::from_ref(sample)).unwrap();
            assert_eq!(evaluation.dice(), single);
            assert_eq!(evaluation.counts.total(), sample.roi_len() as u64);
        }
    }
}

#[test]
fn single_pass_evaluation_rejects_empty_dataset() {
    let err = line_detector().evaluate(&[]).unwrap_err();
    assert!(matches!(err, MsldError::DegenerateDataset { .. }));
}
