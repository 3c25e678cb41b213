use data_loader::{load_dataset, DescriptorField, RatingScale};
use std::path::Path;
use std::time::Instant;

fn main() {
    let movies = Path::new("data/ml-1m/movies.dat");
    let ratings = Path::new("data/ml-1m/ratings.dat");

    println!("Loading MovieLens 1M catalog and ratings...\n");

    let start = Instant::now();
    let (catalog, ratings) = load_dataset(
        movies,
        Some(ratings),
        DescriptorField::Genres,
        RatingScale::new(1.0, 5.0),
    )
    .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let ratings = ratings.unwrap_or_default();
    let empty = catalog.iter().filter(|i| i.descriptor.is_empty()).count();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Items: {} ({} without descriptor)", catalog.len(), empty);
    println!("Ratings: {}", ratings.len());
    println!("\nPerformance: {:.0} ratings/second",
             ratings.len() as f64 / elapsed.as_secs_f64());
}
