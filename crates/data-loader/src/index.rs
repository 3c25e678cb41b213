//! Catalog and rating loading entry points.
//!
//! Picks the right parser from the file extension, checks rating values
//! against the configured scale and, when both files are requested, parses
//! them in parallel with `rayon::join`.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Dat,
    Csv,
}

fn detect_format(path: &Path) -> Result<Format> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("dat") => Ok(Format::Dat),
        Some("csv") => Ok(Format::Csv),
        _ => Err(DataLoadError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

impl Catalog {
    /// Load a catalog from a `.dat` or `.csv` file
    ///
    /// `field` selects the descriptor column for CSV input; `.dat` files
    /// always use their genres field.
    pub fn load_from_file(path: &Path, field: DescriptorField) -> Result<Self> {
        let items = match detect_format(path)? {
            Format::Dat => parser::parse_movies_dat(path)?,
            Format::Csv => parser::parse_catalog_csv(path, field)?,
        };

        let catalog = Catalog::from_items(items);

        let empty = catalog.iter().filter(|i| i.descriptor.trim().is_empty()).count();
        if empty > 0 {
            warn!("{} of {} items have an empty descriptor", empty, catalog.len());
        }
        info!("Loaded {} items from {:?}", catalog.len(), path);

        Ok(catalog)
    }
}

/// Load rating triples from a `.dat` or `.csv` file and check every value
/// against `scale`
pub fn load_ratings(path: &Path, scale: RatingScale) -> Result<Vec<RatingTriple>> {
    let ratings = match detect_format(path)? {
        Format::Dat => parser::parse_ratings_dat(path)?,
        Format::Csv => parser::parse_ratings_csv(path)?,
    };

    validate_ratings(&ratings, scale)?;
    info!("Loaded {} ratings from {:?}", ratings.len(), path);
    Ok(ratings)
}

/// Fail on the first rating outside `scale`
pub fn validate_ratings(ratings: &[RatingTriple], scale: RatingScale) -> Result<()> {
    match ratings.iter().find(|r| !scale.contains(r.rating)) {
        Some(bad) => Err(DataLoadError::InvalidRating {
            user_id: bad.user_id,
            item_id: bad.item_id,
            rating: bad.rating,
            min: scale.min,
            max: scale.max,
        }),
        None => Ok(()),
    }
}

/// Load a catalog and, optionally, its ratings file
///
/// Both files are parsed in parallel.
pub fn load_dataset(
    catalog_path: &Path,
    ratings_path: Option<&Path>,
    field: DescriptorField,
    scale: RatingScale,
) -> Result<(Catalog, Option<Vec<RatingTriple>>)> {
    let (catalog, ratings) = rayon::join(
        || Catalog::load_from_file(catalog_path, field),
        || ratings_path.map(|p| load_ratings(p, scale)).transpose(),
    );

    Ok((catalog?, ratings?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".json", "[]");
        let err = Catalog::load_from_file(file.path(), DescriptorField::Genres).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_catalog_keeps_row_order() {
        let file = write_temp(".dat", "5::E::Drama\n3::C::Comedy\n9::I::\n");
        let catalog = Catalog::load_from_file(file.path(), DescriptorField::Genres).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(0).unwrap().id, 5);
        assert_eq!(catalog.row_of(3), Some(1));
        assert_eq!(catalog.row_of(9), Some(2));
        assert_eq!(catalog.descriptors(), vec!["Drama", "Comedy", ""]);
    }

    #[test]
    fn test_validate_ratings_rejects_out_of_scale() {
        let ratings = vec![RatingTriple::new(1, 1, 4.0), RatingTriple::new(2, 7, 5.5)];
        let err = validate_ratings(&ratings, RatingScale::default()).unwrap_err();

        match err {
            DataLoadError::InvalidRating { user_id, item_id, rating, .. } => {
                assert_eq!(user_id, 2);
                assert_eq!(item_id, 7);
                assert_eq!(rating, 5.5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_ratings_custom_scale() {
        let ratings = vec![RatingTriple::new(1, 1, 9.0)];
        assert!(validate_ratings(&ratings, RatingScale::new(1.0, 10.0)).is_ok());
        assert!(validate_ratings(&ratings, RatingScale::default()).is_err());
    }

    #[test]
    fn test_load_dataset_with_ratings() {
        let movies = write_temp(".csv", "movieId,title,genres\n1,A,Action\n2,B,Comedy\n");
        let ratings = write_temp(".csv", "userId,movieId,rating\n1,1,4.5\n1,2,2.0\n");

        let (catalog, ratings) = load_dataset(
            movies.path(),
            Some(ratings.path()),
            DescriptorField::Genres,
            RatingScale::default(),
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(ratings.unwrap().len(), 2);
    }

    #[test]
    fn test_load_dataset_without_ratings() {
        let movies = write_temp(".dat", "1::A::Action\n");
        let (_, ratings) =
            load_dataset(movies.path(), None, DescriptorField::Genres, RatingScale::default())
                .unwrap();
        assert!(ratings.is_none());
    }
}
