use data_loader::MatrixBuilder;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Building rating matrix from data/raw...\n");

    let start = Instant::now();
    let matrix = MatrixBuilder::new("data/raw")
        .build()
        .expect("Failed to build rating matrix");
    let elapsed = start.elapsed();

    let (users, items) = matrix.shape();

    println!("\n=== Build Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Titles: {}", items);
    println!("Rated cells: {}", matrix.rated_count());
    println!(
        "Density: {:.2}%",
        100.0 * matrix.rated_count() as f64 / (users * items).max(1) as f64
    );
}
