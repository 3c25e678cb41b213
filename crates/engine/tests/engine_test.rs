//! End-to-end tests: files on disk → engine → queries.

use data_loader::{DataLoadError, DescriptorField};
use engine::{EngineConfig, EngineError, RecommendationEngine};
use predictor::MfConfig;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const MOVIES_DAT: &str = "\
1::The Matrix (1999)::Action|Sci-Fi|Thriller
2::Toy Story (1995)::Animation|Children's|Comedy
3::Terminator 2 (1991)::Action|Sci-Fi|Thriller
4::Aladdin (1992)::Animation|Children's|Comedy|Musical
5::Heat (1995)::Action|Crime|Thriller
";

const RATINGS_DAT: &str = "\
1::1::5::978300760
1::3::5::978300761
1::2::1::978300762
2::2::5::978300763
2::4::5::978300764
2::1::1::978300765
3::5::4::978300766
";

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn small_config() -> EngineConfig {
    EngineConfig::default().with_model(MfConfig {
        factors: 4,
        epochs: 10,
        validation_fraction: 0.0,
        ..MfConfig::default()
    })
}

#[test]
fn test_content_engine_from_dat() {
    let movies = write_temp(".dat", MOVIES_DAT);
    let engine =
        RecommendationEngine::load_from_files(movies.path(), None, EngineConfig::default())
            .unwrap();

    assert_eq!(engine.catalog().len(), 5);
    assert!(!engine.is_hybrid());

    let recs = engine.recommend("The Matrix (1999)", 2).unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].title, "Terminator 2 (1991)");
    assert!((recs[0].score - 1.0).abs() < 1e-5);
    assert_eq!(recs[1].title, "Heat (1995)");
}

#[test]
fn test_hybrid_engine_from_dat() {
    let movies = write_temp(".dat", MOVIES_DAT);
    let ratings = write_temp(".dat", RATINGS_DAT);
    let engine =
        RecommendationEngine::load_from_files(movies.path(), Some(ratings.path()), small_config())
            .unwrap();

    assert!(engine.is_hybrid());
    let report = engine.training_report().unwrap();
    assert_eq!(report.train_size, 7);
    assert_eq!(report.validation_size, 0);

    let recs = engine.hybrid_recommend("Toy Story (1995)", 1, 3).unwrap();
    assert_eq!(recs.len(), 3);
    assert!(recs.iter().all(|r| r.title != "Toy Story (1995)"));
    for pair in recs.windows(2) {
        assert!(pair[0].predicted_rating >= pair[1].predicted_rating);
    }
}

#[test]
fn test_csv_overview_catalog() {
    let movies = write_temp(
        ".csv",
        "movieId,title,overview\n\
         10,Space Opera,a fleet of starships battles across the galaxy\n\
         11,Galaxy Quest,starships and a galaxy of fans\n\
         12,Cooking Show,a chef bakes bread\n",
    );
    let config = EngineConfig::default().with_descriptor(DescriptorField::Overview);
    let engine = RecommendationEngine::load_from_files(movies.path(), None, config).unwrap();

    let recs = engine.recommend("Space Opera", 1).unwrap();
    assert_eq!(recs[0].item_id, 11);
}

#[test]
fn test_missing_catalog_file() {
    let err = RecommendationEngine::load_from_files(
        Path::new("/nonexistent/movies.dat"),
        None,
        EngineConfig::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        EngineError::Load(DataLoadError::FileNotFound { .. })
    ));
}

#[test]
fn test_out_of_scale_rating_file_rejected() {
    let movies = write_temp(".dat", MOVIES_DAT);
    let ratings = write_temp(".dat", "1::1::9::978300760\n");
    let err = RecommendationEngine::load_from_files(
        movies.path(),
        Some(ratings.path()),
        small_config(),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        EngineError::Load(DataLoadError::InvalidRating { .. })
    ));
}

#[test]
fn test_unknown_title_leaves_engine_usable() {
    let movies = write_temp(".dat", MOVIES_DAT);
    let engine =
        RecommendationEngine::load_from_files(movies.path(), None, EngineConfig::default())
            .unwrap();

    assert!(engine.recommend("Nonexistent Movie Title XYZ", 5).unwrap_err().is_not_found());
    assert_eq!(engine.recommend("Heat (1995)", 5).unwrap().len(), 4);
}

#[tokio::test]
async fn test_concurrent_queries_match_sequential() {
    let movies = write_temp(".dat", MOVIES_DAT);
    let ratings = write_temp(".dat", RATINGS_DAT);
    let engine =
        RecommendationEngine::load_from_files(movies.path(), Some(ratings.path()), small_config())
            .unwrap();

    let titles: Vec<String> = engine.catalog().iter().map(|i| i.title.clone()).collect();
    let expected: Vec<_> = titles
        .iter()
        .map(|t| engine.hybrid_recommend(t, 1, 3).unwrap())
        .collect();

    let mut handles = Vec::new();
    for _ in 0..4 {
        for title in titles.clone() {
            let engine = engine.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                engine.hybrid_recommend(&title, 1, 3).unwrap()
            }));
        }
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let got = handle.await.unwrap();
        assert_eq!(got, expected[i % titles.len()]);
    }
}
