use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

const CITIES: &[&str] = &["Lisbon", "London", "Paris", "Berlin", "Madrid"];

pub fn generate_profiles_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["name", "handle", "location", "rating", "available"])?;

    let mut rng = rand::thread_rng();
    for i in 1..=rows {
        let city = CITIES[rng.gen_range(0..CITIES.len())];
        let rating = format!("{:.1}", rng.gen_range(1.0..=5.0));
        wtr.write_record([
            &format!("Pro {i}"),
            &format!("pro-{i}"),
            city,
            &rating,
            "true",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn generate_large_csv(path: &Path, size_mb: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["name", "handle", "location", "rating", "available"])?;

    let target_size = (size_mb * 1024 * 1024) as u64;
    let mut rng = rand::thread_rng();
    let mut row = 1u64;

    // Check size every 5000 rows to avoid syscall overhead
    loop {
        for _ in 0..5000 {
            let city = CITIES[rng.gen_range(0..CITIES.len())];
            let rating = format!("{:.1}", rng.gen_range(1.0..=5.0));
            wtr.write_record([
                &format!("Pro {row}"),
                &format!("pro-{row}"),
                city,
                &rating,
                "true",
            ])?;
            row += 1;
        }
        wtr.flush()?; // Flush to ensure file size is updated
        if std::fs::metadata(path)?.len() >= target_size {
            break;
        }
    }
    Ok(())
}
