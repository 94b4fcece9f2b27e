use can_plot_core::normalize::{normalize_unit, sort_samples};
use can_plot_core::{
    AnnotationRequest, ChannelAttributes, Extractor, Extrema, MemoryContainer, PlotConfig,
    PlotError, Sample,
};
use pretty_assertions::assert_eq;

fn samples(pairs: &[(f64, f64)]) -> Vec<Sample> {
    pairs.iter().map(|&(ts, value)| Sample::new(ts, value)).collect()
}

/// All orderings of `items` (Heap's algorithm)
fn permutations(items: &[Sample]) -> Vec<Vec<Sample>> {
    fn heap(k: usize, items: &mut Vec<Sample>, out: &mut Vec<Vec<Sample>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        heap(k - 1, items, out);
        for i in 0..k - 1 {
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
            heap(k - 1, items, out);
        }
    }

    let mut items = items.to_vec();
    let mut out = Vec::new();
    heap(items.len(), &mut items, &mut out);
    out
}

#[test]
fn test_sort_is_idempotent() {
    let mut once = samples(&[(4.0, 1.0), (2.0, 7.0), (9.0, 3.0), (2.0, -1.0)]);
    sort_samples(&mut once);
    let mut twice = once.clone();
    sort_samples(&mut twice);

    assert_eq!(once, twice);
    assert_eq!(
        once,
        samples(&[(2.0, -1.0), (2.0, 7.0), (4.0, 1.0), (9.0, 3.0)])
    );
}

#[test]
fn test_sort_independent_of_input_order() {
    let set = samples(&[(3.0, 1.0), (1.0, 5.0), (2.0, 2.0), (1.0, 4.0), (5.0, 0.0)]);
    let orderings = permutations(&set);
    assert_eq!(orderings.len(), 120);

    let mut expected = set.clone();
    sort_samples(&mut expected);

    for mut ordering in orderings {
        sort_samples(&mut ordering);
        assert_eq!(ordering, expected);
    }
}

#[test]
fn test_unit_sentinel_normalization() {
    assert_eq!(normalize_unit(Some("None")), "1");
    assert_eq!(normalize_unit(Some("V")), "V");

    let container = MemoryContainer::new()
        .with_channel("A", ChannelAttributes::new().with_unit("None"), vec![])
        .with_channel("B", ChannelAttributes::new().with_unit("V"), vec![]);
    let bundle = Extractor::default()
        .prepare(&container, &["A", "B"], &AnnotationRequest::None)
        .unwrap();

    assert_eq!(bundle.series[0].unit, "1");
    assert_eq!(bundle.series[1].unit, "V");
    assert_eq!(bundle.unit_label, "1, V");
}

#[test]
fn test_extrema_across_channels() {
    let container = MemoryContainer::new()
        .with_channel(
            "First",
            ChannelAttributes::new(),
            samples(&[(0.0, 1.0), (1.0, 5.0), (2.0, 3.0)]),
        )
        .with_channel(
            "Second",
            ChannelAttributes::new(),
            samples(&[(0.0, -2.0), (1.0, 8.0)]),
        );

    let bundle = Extractor::default()
        .prepare(&container, &["First", "Second"], &AnnotationRequest::None)
        .unwrap();
    assert_eq!(bundle.extrema, Some(Extrema { min: -2.0, max: 8.0 }));

    let (low, high) = bundle.y_range().unwrap();
    assert_eq!(low, -2.0);
    assert!(high > 8.0);
}

#[test]
fn test_scale_is_configurable() {
    let container = MemoryContainer::new().with_channel(
        "Current",
        ChannelAttributes::new().with_unit("A").with_scale(0.1),
        samples(&[(1.0, 50.0), (0.0, 10.0)]),
    );

    let scaled = Extractor::default()
        .prepare(&container, &["Current"], &AnnotationRequest::None)
        .unwrap();
    assert!(scaled.scale_applied);
    let values: Vec<f64> = scaled.series[0].values().collect();
    assert!((values[0] - 1.0).abs() < 1e-9);
    assert!((values[1] - 5.0).abs() < 1e-9);

    let raw = Extractor::new(PlotConfig::new().with_scale(false))
        .prepare(&container, &["Current"], &AnnotationRequest::None)
        .unwrap();
    assert!(!raw.scale_applied);
    assert_eq!(raw.series[0].values().collect::<Vec<_>>(), vec![10.0, 50.0]);
    assert_eq!(raw.extrema, Some(Extrema { min: 10.0, max: 50.0 }));
}

#[test]
fn test_scale_sentinel_defaults_to_one() {
    let container = MemoryContainer::new().with_channel(
        "Raw",
        ChannelAttributes::new().with_scale_text("None"),
        samples(&[(0.0, 7.0)]),
    );

    let bundle = Extractor::default()
        .prepare(&container, &["Raw"], &AnnotationRequest::None)
        .unwrap();
    assert_eq!(bundle.series[0].scale, 1.0);
    assert_eq!(bundle.series[0].values().collect::<Vec<_>>(), vec![7.0]);
}

#[test]
fn test_annotation_indexing() {
    let container = MemoryContainer::new()
        .with_annotation(1, 100.0, "first")
        .with_annotation(2, 200.0, "second");

    let bundle = Extractor::default()
        .prepare(&container, &[] as &[&str], &AnnotationRequest::Indices(vec![1]))
        .unwrap();
    assert_eq!(bundle.annotations[0].label, "first");
    assert_eq!(bundle.annotations[0].position, 100.0);

    let result = Extractor::default().prepare(
        &container,
        &[] as &[&str],
        &AnnotationRequest::Indices(vec![3]),
    );
    assert!(matches!(
        result,
        Err(PlotError::AnnotationIndexOutOfRange { index: 3, available: 2 })
    ));
}

#[test]
fn test_channel_misses_are_lenient_but_annotation_misses_are_fatal() {
    let container = MemoryContainer::new()
        .with_channel("Speed", ChannelAttributes::new(), samples(&[(0.0, 1.0)]))
        .with_annotation(1, 0.5, "only");

    // An unknown channel token only drops that channel
    let bundle = Extractor::default()
        .prepare(&container, &["Speed", "Missing"], &AnnotationRequest::Indices(vec![1]))
        .unwrap();
    assert_eq!(bundle.series.len(), 1);
    assert_eq!(bundle.unresolved, vec!["Missing"]);

    // An unknown annotation index fails the whole request
    let result = Extractor::default().prepare(
        &container,
        &["Speed", "Missing"],
        &AnnotationRequest::Indices(vec![1, 2]),
    );
    assert!(result.is_err());
}
