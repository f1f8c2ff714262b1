use crate::domain::profile::{ProfessionalProfile, UserRecord};
use crate::error::{MarketError, Result};
use serde::Deserialize;
use std::io::Read;
use uuid::Uuid;

/// One row of the profile seed file.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    name: String,
    handle: String,
    location: String,
    rating: f64,
    available: bool,
}

/// Reads profile seeds from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<(UserRecord, ProfessionalProfile)>`. It handles whitespace
/// trimming and flexible record lengths automatically; a malformed row yields
/// an error item without ending the stream.
pub struct ProfileReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ProfileReader<R> {
    /// Creates a new `ProfileReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes profile seeds.
    ///
    /// This allows processing large seed files in a streaming fashion without
    /// loading the entire dataset into memory.
    pub fn profiles(self) -> impl Iterator<Item = Result<(UserRecord, ProfessionalProfile)>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map_err(MarketError::from)
                .map(|row: ProfileRow| row.into_records())
        })
    }
}

impl ProfileRow {
    fn into_records(self) -> (UserRecord, ProfessionalProfile) {
        let user = UserRecord {
            id: Uuid::new_v4(),
            display_name: self.name,
            handle: self.handle,
        };
        let mut profile = ProfessionalProfile::new(user.id, self.location);
        profile.rating = self.rating;
        profile.available = self.available;
        (user, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "name, handle, location, rating, available\n\
                    Ada Lovelace, ada, London, 4.8, true\n\
                    Grace Hopper, grace, New York, 4.5, false";
        let reader = ProfileReader::new(data.as_bytes());
        let results: Vec<_> = reader.profiles().collect();

        assert_eq!(results.len(), 2);
        let (user, profile) = results[0].as_ref().unwrap();
        assert_eq!(user.display_name, "Ada Lovelace");
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.location, "London");
        assert_eq!(profile.rating, 4.8);

        let (_, second) = results[1].as_ref().unwrap();
        assert!(!second.available);
    }

    #[test]
    fn test_reader_malformed_row_does_not_end_the_stream() {
        let data = "name, handle, location, rating, available\n\
                    Ada Lovelace, ada, London, not_a_number, true\n\
                    Grace Hopper, grace, New York, 4.5, true";
        let reader = ProfileReader::new(data.as_bytes());
        let results: Vec<_> = reader.profiles().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }
}
