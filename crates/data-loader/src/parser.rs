//! Parsers for catalog and rating files.
//!
//! Two tabular layouts are understood:
//! - MovieLens `.dat` files (`::`-separated, ISO-8859-1):
//!   - movies.dat: movieId::title::genres
//!   - ratings.dat: userId::movieId::rating::timestamp
//! - `.csv` files with a header row, read with the `csv` crate so quoted
//!   overviews containing commas or newlines survive intact.
//!
//! Missing descriptor values are never an error: they become `""` and the
//! item later vectorizes to the zero vector.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const ID_COLUMNS: &[&str] = &["movieId", "itemId", "id"];

/// Read a file with ISO-8859-1 encoding (Latin-1)
///
/// The MovieLens `.dat` files are Latin-1, not UTF-8. Each byte maps
/// directly to the Unicode code point with the same value.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Pull the next `::`-separated field or report which one is missing
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", name),
    })
}

fn parse_number<T>(value: &str, file: &str, line: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", name, e),
    })
}

// =============================================================================
// MovieLens .dat
// =============================================================================

/// Parse a MovieLens `movies.dat` file
///
/// Format: movieId::title::genres
///
/// The genres string is kept verbatim (`Animation|Children's|Comedy`) as
/// the item descriptor. A line without a genres field gets an empty
/// descriptor.
pub fn parse_movies_dat(path: &Path) -> Result<Vec<Item>> {
    let file = file_name(path);
    let lines = read_lines_latin1(path)?;
    let mut items = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut parts = line_trimmed.split("::");
        let id = next_field(&mut parts, &file, line_no, "movieId")?;
        let title = next_field(&mut parts, &file, line_no, "title")?;
        let genres = parts.next().unwrap_or("");

        items.push(Item {
            id: parse_number(id, &file, line_no, "movieId")?,
            title: title.to_string(),
            descriptor: genres.to_string(),
        });
    }

    Ok(items)
}

/// Parse a MovieLens `ratings.dat` file
///
/// Format: userId::movieId::rating::timestamp
///
/// The timestamp is ignored; it plays no part in the rating model.
pub fn parse_ratings_dat(path: &Path) -> Result<Vec<RatingTriple>> {
    let file = file_name(path);
    let lines = read_lines_latin1(path)?;
    let mut ratings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut parts = line_trimmed.split("::");
        let user_id = next_field(&mut parts, &file, line_no, "userId")?;
        let item_id = next_field(&mut parts, &file, line_no, "movieId")?;
        let rating = next_field(&mut parts, &file, line_no, "rating")?;

        ratings.push(RatingTriple {
            user_id: parse_number(user_id, &file, line_no, "userId")?,
            item_id: parse_number(item_id, &file, line_no, "movieId")?,
            rating: parse_number(rating, &file, line_no, "rating")?,
        });
    }

    Ok(ratings)
}

// =============================================================================
// CSV with header
// =============================================================================

fn csv_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = open(path)?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|name| h.eq_ignore_ascii_case(name)))
}

fn require_column(headers: &StringRecord, names: &[&str], file: &str) -> Result<usize> {
    column(headers, names).ok_or_else(|| DataLoadError::MissingColumn {
        file: file.to_string(),
        column: names.join("|"),
    })
}

fn record_line(record: &StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(fallback)
}

/// Parse a catalog CSV with a header row
///
/// Required column: `title`. Optional: an id column (`movieId`, `itemId`
/// or `id`; row number + 1 when absent) and the descriptor column chosen by
/// `field`. A missing descriptor column or an empty cell yields an empty
/// descriptor.
pub fn parse_catalog_csv(path: &Path, field: DescriptorField) -> Result<Vec<Item>> {
    let file = file_name(path);
    let mut reader = csv_reader(path)?;
    let headers = reader.headers()?.clone();

    let title_col = require_column(&headers, &["title"], &file)?;
    let id_col = column(&headers, ID_COLUMNS);
    let descriptor_col = column(&headers, &[field.column()]);

    let mut items = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line_no = record_line(&record, row + 2);

        let title = record.get(title_col).ok_or_else(|| DataLoadError::ParseError {
            file: file.clone(),
            line: line_no,
            reason: "Missing title".to_string(),
        })?;

        let id = match id_col.and_then(|c| record.get(c)) {
            Some(raw) if !raw.is_empty() => parse_number(raw, &file, line_no, "id")?,
            _ => (row + 1) as ItemId,
        };

        let descriptor = descriptor_col
            .and_then(|c| record.get(c))
            .unwrap_or("");

        items.push(Item::new(id, title, descriptor));
    }

    Ok(items)
}

/// Parse a ratings CSV with a header row
///
/// Required columns: `userId`, `movieId` (or `itemId`), `rating`. Any other
/// column (timestamps, tags) is ignored.
pub fn parse_ratings_csv(path: &Path) -> Result<Vec<RatingTriple>> {
    let file = file_name(path);
    let mut reader = csv_reader(path)?;
    let headers = reader.headers()?.clone();

    let user_col = require_column(&headers, &["userId"], &file)?;
    let item_col = require_column(&headers, &["movieId", "itemId"], &file)?;
    let rating_col = require_column(&headers, &["rating"], &file)?;

    let mut ratings = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line_no = record_line(&record, row + 2);

        let cell = |col: usize, name: &str| {
            record.get(col).ok_or_else(|| DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("Missing {}", name),
            })
        };

        ratings.push(RatingTriple {
            user_id: parse_number(cell(user_col, "userId")?, &file, line_no, "userId")?,
            item_id: parse_number(cell(item_col, "movieId")?, &file, line_no, "movieId")?,
            rating: parse_number(cell(rating_col, "rating")?, &file, line_no, "rating")?,
        });
    }

    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, content: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_parse_movies_dat() {
        let file = write_temp(
            ".dat",
            b"1::Toy Story (1995)::Animation|Children's|Comedy\n\n2::Jumanji (1995)::Adventure|Fantasy\n",
        );
        let items = parse_movies_dat(file.path()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].title, "Toy Story (1995)");
        assert_eq!(items[0].descriptor, "Animation|Children's|Comedy");
        assert_eq!(items[1].descriptor, "Adventure|Fantasy");
    }

    #[test]
    fn test_movies_dat_latin1_title() {
        // 0xE9 is 'é' in ISO-8859-1
        let file = write_temp(".dat", b"7::Am\xe9lie (2001)::Comedy|Romance\n");
        let items = parse_movies_dat(file.path()).unwrap();
        assert_eq!(items[0].title, "Amélie (2001)");
    }

    #[test]
    fn test_movies_dat_missing_genres_is_empty_descriptor() {
        let file = write_temp(".dat", b"3::No Genres (2000)\n");
        let items = parse_movies_dat(file.path()).unwrap();
        assert_eq!(items[0].descriptor, "");
    }

    #[test]
    fn test_movies_dat_bad_id() {
        let file = write_temp(".dat", b"abc::Broken::Drama\n");
        let err = parse_movies_dat(file.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_parse_ratings_dat() {
        let file = write_temp(".dat", b"1::1193::5::978300760\n1::661::3::978302109\n");
        let ratings = parse_ratings_dat(file.path()).unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0], RatingTriple::new(1, 1193, 5.0));
        assert_eq!(ratings[1].rating, 3.0);
    }

    #[test]
    fn test_parse_catalog_csv_overview_with_quotes() {
        let file = write_temp(
            ".csv",
            b"id,title,overview\n10,Heat,\"A thief, a cop, and a city.\"\n11,Quiet Film,\n",
        );
        let items = parse_catalog_csv(file.path(), DescriptorField::Overview).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 10);
        assert_eq!(items[0].descriptor, "A thief, a cop, and a city.");
        assert_eq!(items[1].descriptor, "");
    }

    #[test]
    fn test_parse_catalog_csv_without_descriptor_column() {
        let file = write_temp(".csv", b"title\nAlpha\nBeta\n");
        let items = parse_catalog_csv(file.path(), DescriptorField::Genres).unwrap();

        assert_eq!(items.len(), 2);
        // Row numbers stand in for missing ids
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 2);
        assert!(items.iter().all(|i| i.descriptor.is_empty()));
    }

    #[test]
    fn test_parse_catalog_csv_requires_title() {
        let file = write_temp(".csv", b"movieId,genres\n1,Drama\n");
        let err = parse_catalog_csv(file.path(), DescriptorField::Genres).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { .. }));
    }

    #[test]
    fn test_parse_ratings_csv() {
        let file = write_temp(
            ".csv",
            b"userId,movieId,rating,timestamp\n1,31,2.5,1260759144\n1,1029,3.0,1260759179\n",
        );
        let ratings = parse_ratings_csv(file.path()).unwrap();
        assert_eq!(ratings, vec![
            RatingTriple::new(1, 31, 2.5),
            RatingTriple::new(1, 1029, 3.0),
        ]);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_movies_dat(Path::new("/definitely/not/here.dat")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
