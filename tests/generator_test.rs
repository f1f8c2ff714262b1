mod common;

#[test]
fn test_generate_simple_csv() {
    let output_path = std::path::PathBuf::from("test_generated.csv");
    common::generate_profiles_csv(&output_path, 5).expect("Failed to generate CSV");

    let content = std::fs::read_to_string(&output_path).expect("Failed to read file");
    // Header + 5 rows = 6 lines
    assert_eq!(content.lines().count(), 6);

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_generated_rows_stay_in_range() {
    let output_path = std::path::PathBuf::from("test_range_generated.csv");
    common::generate_profiles_csv(&output_path, 200).expect("Failed to generate CSV");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&output_path)
        .expect("Failed to open CSV");

    let mut cities = std::collections::HashSet::new();
    for result in reader.records() {
        let record = result.expect("Failed to read record");
        let rating: f64 = record[3].parse().expect("Failed to parse rating");
        assert!((1.0..=5.0).contains(&rating));
        cities.insert(record[2].to_string());
    }

    // 200 random draws over five cities should hit more than one of them.
    assert!(cities.len() > 1, "Should have seen more than one city");

    std::fs::remove_file(output_path).ok();
}
