//! Both detectors behind the same `Detector` interface.

use isoforest_rust::{
    AnomalyError, Dataset, Detector, IsolationForest, IsolationForestParams, RobustZScore, Value,
};

fn single_column(values: &[f64]) -> Dataset {
    Dataset::from_rows(values.iter().map(|&v| vec![v]).collect()).unwrap()
}

fn detectors() -> Vec<(&'static str, Box<dyn Detector>)> {
    let forest = IsolationForest::from_params(IsolationForestParams {
        trees: 100,
        ratio: 1.0,
        threshold: 0.5,
        random_state: Some(21),
        n_jobs: Some(1),
    })
    .unwrap();

    vec![
        ("isolation forest", Box::new(forest) as Box<dyn Detector>),
        ("robust z-score", Box::new(RobustZScore::default()) as Box<dyn Detector>),
    ]
}

#[test]
fn robust_zscore_flags_only_the_spike() {
    let dataset = single_column(&[1.0, 2.0, 2.0, 3.0, 2.0, 2.0, 50.0]);
    let mut detector = RobustZScore::default();
    detector.train(&dataset).unwrap();

    assert_eq!(detector.predict(&dataset).unwrap(), vec![0, 0, 0, 0, 0, 0, 1]);
}

#[test]
fn every_detector_flags_the_spike() {
    let dataset = single_column(&[1.0, 2.0, 2.0, 3.0, 2.0, 2.0, 50.0]);

    for (name, mut detector) in detectors() {
        assert!(!detector.trained(), "{} trained before train()", name);
        detector.train(&dataset).unwrap();
        assert!(detector.trained());

        let labels = detector.predict(&dataset).unwrap();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[6], 1, "{} missed the spike", name);
        for i in [1, 2, 4, 5] {
            assert_eq!(labels[i], 0, "{} flagged the median value at {}", name, i);
        }
    }
}

#[test]
fn every_detector_rejects_categorical_columns() {
    let dataset = Dataset::new(vec![
        vec![Value::from(1.0), Value::from("tcp")],
        vec![Value::from(2.0), Value::from("udp")],
        vec![Value::from(3.0), Value::from("tcp")],
    ])
    .unwrap();

    for (name, mut detector) in detectors() {
        let result = detector.train(&dataset);
        assert!(
            matches!(result, Err(AnomalyError::InvalidArgument(_))),
            "{} accepted categorical input",
            name
        );
        assert!(!detector.trained());
    }
}

#[test]
fn every_detector_requires_training() {
    let dataset = single_column(&[1.0, 2.0]);

    for (name, detector) in detectors() {
        assert!(
            matches!(detector.predict(&dataset), Err(AnomalyError::NotFitted(_))),
            "{} predicted without training",
            name
        );
        assert!(
            matches!(
                detector.predict(&Dataset::default()),
                Err(AnomalyError::NotFitted(_))
            ),
            "{} predicted an empty query without training",
            name
        );
    }
}

#[test]
fn every_detector_accepts_an_empty_query() {
    let dataset = single_column(&[1.0, 2.0, 2.0, 3.0, 2.0, 2.0, 50.0]);

    for (name, mut detector) in detectors() {
        detector.train(&dataset).unwrap();
        assert_eq!(
            detector.predict(&Dataset::default()).unwrap(),
            Vec::<u8>::new(),
            "{}",
            name
        );
    }
}
