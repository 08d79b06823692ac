//! CSV-based price table loader
//!
//! Lets a snapshot's price map be overridden from a local `symbol,price` file,
//! e.g. exported from a price feed.

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// Load asset prices from a CSV file with `symbol,price` rows.
/// Returns a symbol -> price map; later rows win on duplicate symbols.
pub fn load_prices_csv(path: &Path) -> Result<HashMap<String, f64>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let mut prices = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let symbol = record[0].trim().to_string();
        let price: f64 = record[1].trim().parse()?;
        prices.insert(symbol, price);
    }

    Ok(prices)
}

/// Load prices from any reader (for testing without files)
pub fn load_prices_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<HashMap<String, f64>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_reader(reader);

    let mut prices = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let symbol = record[0].trim().to_string();
        let price: f64 = record[1].trim().parse()?;
        prices.insert(symbol, price);
    }

    Ok(prices)
}
